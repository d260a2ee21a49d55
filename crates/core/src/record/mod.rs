//! Composite (custom data type) value codec.
//!
//! Records implement [`CompositeRecord`] and are written to / read from any
//! [`FieldWriter`] / [`FieldReader`]. The text implementations here follow the
//! server's composite literal format; the binary implementations live with the
//! PostgreSQL storage backend.

mod error;
mod text;
mod traits;

pub use error::FieldError;
pub use text::{RecordTextReader, RecordTextWriter};
pub use traits::{CompositeRecord, FieldReader, FieldWriter};

/// Renders a record as a composite text literal.
pub fn to_record_text<T: CompositeRecord>(record: &T) -> Result<String, FieldError> {
    let mut writer = RecordTextWriter::new();
    record.encode_into(&mut writer)?;
    Ok(writer.finish())
}

/// Parses a composite text literal into a record.
///
/// The literal must contain exactly the record's fields.
pub fn from_record_text<T: CompositeRecord>(text: &str) -> Result<T, FieldError> {
    let mut reader = RecordTextReader::parse(text)?;
    let record = T::decode_from(&mut reader)?;
    reader.finish()?;
    Ok(record)
}
