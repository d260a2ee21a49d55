use thiserror::Error;

/// Errors raised while reading or writing the fields of a composite value.
///
/// Field indexes are zero-based positions within the composite type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Missing field at position {index}")]
    Missing { index: usize },
    #[error("Unexpected NULL at position {index}")]
    UnexpectedNull { index: usize },
    #[error("Invalid integer at position {index}: {raw:?}")]
    InvalidInteger { index: usize, raw: String },
    #[error("Unread trailing fields: expected {expected}, found {found}")]
    TrailingFields { expected: usize, found: usize },
    #[error("Malformed record literal: {0}")]
    Malformed(String),
    #[error("Field {index} failed in store codec: {message}")]
    Backend { index: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_display() {
        assert_eq!(
            FieldError::Missing { index: 3 }.to_string(),
            "Missing field at position 3"
        );
    }

    #[test]
    fn test_invalid_integer_display() {
        let error = FieldError::InvalidInteger {
            index: 0,
            raw: "abc".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid integer at position 0: \"abc\"");
    }

    #[test]
    fn test_backend_display() {
        let error = FieldError::Backend {
            index: 4,
            message: "mismatched types".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Field 4 failed in store codec: mismatched types"
        );
    }
}
