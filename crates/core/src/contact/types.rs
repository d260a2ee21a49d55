use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Phone numbers keyed by label ("Home", "Work", ...).
pub type PhoneNumbers = BTreeMap<String, i64>;

/// One element of the tagged-array form of a phone directory:
/// `[{"tag":"Home","value":8899776612}, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEntry {
    pub tag: String,
    pub value: i64,
}

/// A contact with a directory of labelled phone numbers.
///
/// `email` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_numbers: PhoneNumbers,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone_numbers: PhoneNumbers::new(),
        }
    }

    /// Adds (or replaces) a labelled phone number.
    pub fn with_phone(mut self, label: impl Into<String>, number: i64) -> Self {
        self.phone_numbers.insert(label.into(), number);
        self
    }

    /// Returns true if a number is stored under `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.phone_numbers.contains_key(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_builder() {
        let contact = Contact::new("Julie Dsouza", "julie@xyz.com")
            .with_phone("Home", 8899776612)
            .with_phone("Work", 9876543210);

        assert_eq!(contact.phone_numbers.len(), 2);
        assert!(contact.has_label("Home"));
        assert!(!contact.has_label("Mobile"));
    }

    #[test]
    fn test_contact_json_shape() {
        let contact = Contact::new("Julie Dsouza", "julie@xyz.com").with_phone("Home", 8899776612);
        let json = serde_json::to_value(&contact).unwrap();

        assert_eq!(json["name"], "Julie Dsouza");
        assert_eq!(json["email"], "julie@xyz.com");
        assert_eq!(json["phoneNumbers"]["Home"], 8899776612_i64);
    }

    #[test]
    fn test_contact_deserialize_without_phone_numbers() {
        let contact: Contact =
            serde_json::from_str(r#"{"name": "Ann", "email": "ann@xyz.com"}"#).unwrap();

        assert!(contact.phone_numbers.is_empty());
    }
}
