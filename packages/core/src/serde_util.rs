// ABOUTME: Lenient deserializers for client-supplied JSON fields
// ABOUTME: Odd shapes degrade to empty values instead of rejecting the whole payload

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings pass through; any other shape (numbers, null, objects) is "no id".
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Strings pass through, scalars are rendered, everything else is empty.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}
