use thiserror::Error;

/// Errors from the phone-directory JSON codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Failed to encode phone numbers: {0}")]
    Encode(String),
    #[error("Failed to decode phone numbers: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_error_display() {
        assert_eq!(
            ContactError::Decode("expected an object".to_string()).to_string(),
            "Failed to decode phone numbers: expected an object"
        );
        assert_eq!(
            ContactError::Encode("key must be a string".to_string()).to_string(),
            "Failed to encode phone numbers: key must be a string"
        );
    }
}
