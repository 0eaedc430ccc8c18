use serde::Deserialize;
use serde_json::Value;

use crate::StreamError;

/// Processing status reported by the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Initializing,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// One decoded live-channel message. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StatusEvent {
    #[serde(deserialize_with = "lenient_status")]
    pub status: ProcessingStatus,
    #[serde(deserialize_with = "lenient_count")]
    pub processed_count: u64,
    #[serde(deserialize_with = "lenient_ids")]
    pub completed_campaigns: Vec<String>,
    pub results: Option<Value>,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_final: bool,
    #[serde(deserialize_with = "lenient_message")]
    pub message: Option<String>,
}

impl StatusEvent {
    pub fn is_end_of_stream(&self) -> bool {
        self.is_final
            || matches!(
                self.status,
                ProcessingStatus::Completed | ProcessingStatus::Error
            )
    }

    /// Raw result records, when the message carries a list of them.
    pub fn result_items(&self) -> Option<&[Value]> {
        match &self.results {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }
    }
}

pub fn parse_status_event(data: &str) -> Result<StatusEvent, StreamError> {
    serde_json::from_str(data).map_err(|err| StreamError::Parse(err.to_string()))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().unwrap_or(0))
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let ids = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(ids)
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

fn lenient_status<'de, D>(deserializer: D) -> Result<ProcessingStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(_) => {
            ProcessingStatus::deserialize(value).unwrap_or(ProcessingStatus::Unknown)
        }
        _ => ProcessingStatus::Unknown,
    })
}

fn lenient_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(text),
        _ => None,
    })
}
