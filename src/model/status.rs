use serde::Deserialize;
use serde_json::Value;

/// Status body returned by the account API. Unknown keys are ignored.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct StatusRecord {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub created_on: Option<String>,
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextField {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Option::<TextField>::deserialize(deserializer)? {
        Some(TextField::Text(s)) => Some(s),
        Some(TextField::Number(n)) => Some(n.to_string()),
        Some(TextField::Flag(b)) => Some(b.to_string()),
        None => None,
    })
}

impl StatusRecord {
    /// Decodes a response body. Anything other than a JSON object whose
    /// `status`/`created_on` are scalars or null is rejected.
    pub fn from_json(body: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }
}

/// Status fields after per-key defaulting, built fresh from a fetched record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciledStatus {
    pub status: Option<String>,
    pub status_set_on: Option<String>,
}
