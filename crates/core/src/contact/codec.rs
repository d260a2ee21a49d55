//! JSON codec for the phone-number directory column.
//!
//! The column holds a JSON object mapping labels to numbers, e.g.
//! `{"Home":8899776612,"Work":9876543210}`. Rows written by the earlier inline
//! quoting scheme hold the same object wrapped in a JSON string; the decoder
//! unwraps those transparently.
//!
//! The tagged-array form stores the same directory as
//! `[{"tag":"Home","value":8899776612}]`. Labels can then only be matched by
//! containment (`@>`) or by unnesting the array.

use serde_json::Value;

use super::{ContactError, PhoneEntry, PhoneNumbers};

/// Encodes a phone directory as JSON object text.
///
/// The result is meant to be bound as a statement parameter, never spliced
/// into SQL text.
pub fn encode_phone_numbers(phone_numbers: &PhoneNumbers) -> Result<String, ContactError> {
    serde_json::to_string(phone_numbers).map_err(|e| ContactError::Encode(e.to_string()))
}

/// Decodes stored JSON text back into a phone directory.
pub fn decode_phone_numbers(text: &str) -> Result<PhoneNumbers, ContactError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ContactError::Decode(e.to_string()))?;

    let value = match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|e| ContactError::Decode(e.to_string()))?
        }
        Value::Null => return Ok(PhoneNumbers::new()),
        other => other,
    };

    if !value.is_object() {
        return Err(ContactError::Decode(format!(
            "expected a JSON object, found {value}"
        )));
    }

    serde_json::from_value(value).map_err(|e| ContactError::Decode(e.to_string()))
}

/// Encodes a phone directory as a JSON array of `{"tag", "value"}` objects,
/// ordered by tag.
pub fn encode_tagged_phone_numbers(phone_numbers: &PhoneNumbers) -> Result<String, ContactError> {
    let entries: Vec<PhoneEntry> = phone_numbers
        .iter()
        .map(|(tag, value)| PhoneEntry {
            tag: tag.clone(),
            value: *value,
        })
        .collect();
    serde_json::to_string(&entries).map_err(|e| ContactError::Encode(e.to_string()))
}

/// Decodes the tagged-array form. A tag may appear only once.
pub fn decode_tagged_phone_numbers(text: &str) -> Result<PhoneNumbers, ContactError> {
    let entries: Option<Vec<PhoneEntry>> =
        serde_json::from_str(text).map_err(|e| ContactError::Decode(e.to_string()))?;

    let mut phone_numbers = PhoneNumbers::new();
    for entry in entries.unwrap_or_default() {
        if phone_numbers.insert(entry.tag.clone(), entry.value).is_some() {
            return Err(ContactError::Decode(format!("duplicate tag {:?}", entry.tag)));
        }
    }
    Ok(phone_numbers)
}

/// Builds the containment operand that matches arrays holding an entry with
/// `tag`, e.g. `[{"tag":"Home"}]`.
pub fn tag_filter(tag: &str) -> Result<String, ContactError> {
    serde_json::to_string(&serde_json::json!([{ "tag": tag }]))
        .map_err(|e| ContactError::Encode(e.to_string()))
}
