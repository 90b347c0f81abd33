use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::logger::Reporter;
use crate::model::error::ProcessorError;
use crate::model::status::StatusRecord;

/// Anything that can look up the status of one account.
///
/// `Ok(None)` means the status is unavailable for this account; `Err` is a
/// failure below the HTTP response layer and should stop the run.
pub trait StatusSource {
    fn fetch(&self, account_id: &str) -> Result<Option<StatusRecord>, ProcessorError>;
}

/// Fetches account status from `<base_url>` joined with the account ID.
///
/// Each call is a single blocking GET with the client's default settings:
/// no timeout override, no retries and the default redirect policy. That is
/// a simplification, not a robustness guarantee. Connection-level failures
/// are returned as errors rather than absorbed.
pub struct StatusFetcher {
    client: Client,
    base_url: Url,
    reporter: Arc<dyn Reporter>,
}

impl StatusFetcher {
    pub fn new(base_url: &str, reporter: Arc<dyn Reporter>) -> Result<Self, ProcessorError> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder().build()?;

        Ok(StatusFetcher {
            client,
            base_url,
            reporter,
        })
    }

    /// Resolves `account_id` against the base URL as a relative reference,
    /// so a base without a trailing slash loses its last path segment.
    pub fn status_url(&self, account_id: &str) -> Result<Url, ProcessorError> {
        Ok(self.base_url.join(account_id)?)
    }
}

impl StatusSource for StatusFetcher {
    fn fetch(&self, account_id: &str) -> Result<Option<StatusRecord>, ProcessorError> {
        let url = self.status_url(account_id)?;
        debug!(%url, account = account_id, "fetching status");

        let response = self.client.get(url).send()?;
        if !accept_status(account_id, response.status(), self.reporter.as_ref()) {
            return Ok(None);
        }

        let body = response.text()?;
        Ok(decode_body(account_id, &body, self.reporter.as_ref()))
    }
}

/// Returns false (after logging why) for 4xx and 5xx responses only. Every
/// other status, including a 3xx the client did not follow, goes on to body
/// decoding; a strict 2xx check would turn those into fetch errors.
fn accept_status(account_id: &str, status: StatusCode, reporter: &dyn Reporter) -> bool {
    if status == StatusCode::NOT_FOUND {
        reporter.error(&format!("no status found for account {}", account_id));
        return false;
    }

    if status.is_client_error() || status.is_server_error() {
        reporter.error(&format!("error fetching account {} status", account_id));
        return false;
    }

    true
}

fn decode_body(account_id: &str, body: &str, reporter: &dyn Reporter) -> Option<StatusRecord> {
    let record = StatusRecord::from_json(body);
    if record.is_none() {
        reporter.error(&format!("unable to parse status for account {}", account_id));
    }
    record
}
