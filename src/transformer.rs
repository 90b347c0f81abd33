use std::sync::Arc;

use chrono::NaiveDate;

use crate::fetcher::StatusSource;
use crate::logger::Reporter;
use crate::model::error::ProcessorError;
use crate::model::row::{InputRow, OutputRow, ACCOUNT_ID, CREATED_ON, FIRST_NAME};
use crate::model::status::{ReconciledStatus, StatusRecord};

const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds one output row per input row.
///
/// `Ok(None)` is returned only when the row has no usable account ID; every
/// other irregularity degrades to a null field and a warning.
pub struct RowTransformer<S> {
    source: S,
    reporter: Arc<dyn Reporter>,
}

impl<S: StatusSource> RowTransformer<S> {
    pub fn new(source: S, reporter: Arc<dyn Reporter>) -> Self {
        RowTransformer { source, reporter }
    }

    pub fn transform(&self, row: &InputRow) -> Result<Option<OutputRow>, ProcessorError> {
        let Some(account_id) = self.account_id(row) else {
            return Ok(None);
        };

        let fetched = self.source.fetch(account_id)?;
        let status = self.reconcile(account_id, fetched.as_ref());
        let raw_created_on = row.value(CREATED_ON).unwrap_or("");
        let created_on = self.normalize_created_on(account_id, raw_created_on);

        Ok(Some(OutputRow {
            account_id: account_id.to_string(),
            first_name: row.value(FIRST_NAME).map(str::to_string),
            created_on,
            status: status.status,
            status_set_on: status.status_set_on,
        }))
    }

    fn account_id<'r>(&self, row: &'r InputRow) -> Option<&'r str> {
        if !row.has_column(ACCOUNT_ID) {
            self.reporter.error("input CSV has invalid header");
            return None;
        }

        match row.value(ACCOUNT_ID) {
            Some(id) if !id.is_empty() => Some(id),
            _ => {
                self.reporter.error("Input rows must have account number values");
                None
            }
        }
    }

    /// An unavailable status is treated like a record with neither key.
    fn reconcile(&self, account_id: &str, fetched: Option<&StatusRecord>) -> ReconciledStatus {
        let default_status = StatusRecord::default();
        let record = fetched.unwrap_or(&default_status);

        ReconciledStatus {
            status: self.require("status", account_id, record.status.as_deref()),
            status_set_on: self.require("created_on", account_id, record.created_on.as_deref()),
        }
    }

    fn require(&self, key: &str, account_id: &str, value: Option<&str>) -> Option<String> {
        if value.is_none() {
            self.reporter
                .warn(&format!("no value for {} in account {}", key, account_id));
        }
        value.map(str::to_string)
    }

    fn normalize_created_on(&self, account_id: &str, raw: &str) -> Option<String> {
        match parse_input_date(raw) {
            Some(date) => Some(date.format(OUTPUT_DATE_FORMAT).to_string()),
            None => {
                self.reporter
                    .warn(&format!("invalid 'Created On' for account {}", account_id));
                None
            }
        }
    }
}

/// Strict `M/D/YY` parse. Month and day take one or two digits, the year
/// exactly two; 69-99 land in the 1900s and 00-68 in the 2000s.
fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    let mut fields = raw.split('/');
    let (month, day, year) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() || year.len() != 2 {
        return None;
    }

    let month = digits(month)?;
    let day = digits(day)?;
    let year = match digits(year)? {
        yy @ 69..=99 => 1900 + yy,
        yy => 2000 + yy,
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// One or two ASCII digits, nothing else.
fn digits(field: &str) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
