use std::collections::HashMap;

use csv::StringRecord;
use serde::Serialize;

pub const ACCOUNT_ID: &str = "Account ID";
pub const FIRST_NAME: &str = "First Name";
pub const CREATED_ON: &str = "Created On";

pub const OUTPUT_HEADERS: [&str; 5] = [
    ACCOUNT_ID,
    FIRST_NAME,
    CREATED_ON,
    "Status",
    "Status Set On",
];

/// One input CSV record keyed by header name.
///
/// A column named in the header but cut off in a short record is kept with
/// no value, so "missing column" and "missing value" stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputRow {
    fields: HashMap<String, Option<String>>,
}

impl InputRow {
    pub fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), record.get(i).map(str::to_string)))
            .collect();

        InputRow { fields }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Returns the value of `column`, or `None` if the column is missing or
    /// has no value in this record.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|v| v.as_deref())
    }
}

impl<K, V> FromIterator<(K, V)> for InputRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        InputRow {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Account ID")]
    pub account_id: String,
    #[serde(rename = "First Name")]
    pub first_name: Option<String>,
    #[serde(rename = "Created On")]
    pub created_on: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Status Set On")]
    pub status_set_on: Option<String>,
}
