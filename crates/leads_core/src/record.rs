use serde::Serialize;
use serde_json::Value;

use crate::StreamError;

/// One matched lead, with every field normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResultRecord {
    pub name: String,
    pub profile_url: String,
    pub input_field: String,
}

impl ResultRecord {
    pub fn new(
        name: impl Into<String>,
        profile_url: impl Into<String>,
        input_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            profile_url: profile_url.into(),
            input_field: input_field.into(),
        }
    }
}

const NAME_KEYS: [&str; 2] = ["Name", "name"];
const PROFILE_KEYS: [&str; 2] = ["LinkedIn", "profile_url"];
const INPUT_KEYS: [&str; 2] = ["InputField", "input_field"];

/// Normalize one raw record as delivered by the matching service.
///
/// Records that are not JSON objects normalize to an all-empty record.
pub fn normalize_record(raw: &Value) -> ResultRecord {
    let name = lookup(raw, &NAME_KEYS).map(text_of).unwrap_or_default();
    // Profile links are only taken when they already are strings.
    let profile_url = lookup(raw, &PROFILE_KEYS)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let input_field = lookup(raw, &INPUT_KEYS)
        .map(text_of)
        .map(|text| strip_paired_quotes(&text).to_string())
        .unwrap_or_default();

    ResultRecord {
        name,
        profile_url,
        input_field,
    }
}

pub fn normalize_records(raw: &[Value]) -> Vec<ResultRecord> {
    raw.iter().map(normalize_record).collect()
}

/// Strip exactly one leading and one trailing `"` when both are present.
///
/// A lone `"` is left alone: it cannot be both the opening and the closing quote.
pub fn strip_paired_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Validate and normalize a one-shot fetch body, which must be a JSON list.
pub fn parse_fetch_body(body: &Value) -> Result<Vec<ResultRecord>, StreamError> {
    match body {
        Value::Array(items) => Ok(normalize_records(items)),
        other => Err(StreamError::Shape(shape_name(other).to_string())),
    }
}

fn lookup<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = raw.as_object()?;
    keys.iter().find_map(|key| object.get(*key))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
