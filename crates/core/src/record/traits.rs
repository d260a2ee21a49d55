use super::FieldError;

/// Sequential reader over the fields of a composite value.
///
/// Every call consumes the next field. Implementations never rewind.
pub trait FieldReader {
    /// Reads the next field as a 32-bit integer.
    fn read_int(&mut self) -> Result<i32, FieldError>;

    /// Reads the next field as text.
    fn read_string(&mut self) -> Result<String, FieldError>;
}

/// Sequential writer for the fields of a composite value.
pub trait FieldWriter {
    /// Appends a 32-bit integer field.
    fn write_int(&mut self, value: i32) -> Result<(), FieldError>;

    /// Appends a text field.
    fn write_string(&mut self, value: &str) -> Result<(), FieldError>;
}

/// A record stored as a store-native composite type.
///
/// The field sequence used by `encode_into` and `decode_from` must match the
/// composite type definition named by `TYPE_NAME`, field for field.
pub trait CompositeRecord: Sized {
    /// Name of the composite type in the store.
    const TYPE_NAME: &'static str;

    /// Number of fields in the composite type.
    const FIELD_COUNT: usize;

    /// Writes every field of `self` to `writer`, in declaration order.
    fn encode_into(&self, writer: &mut dyn FieldWriter) -> Result<(), FieldError>;

    /// Reads a complete value from `reader`, in declaration order.
    fn decode_from(reader: &mut dyn FieldReader) -> Result<Self, FieldError>;
}
