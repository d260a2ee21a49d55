//! PostgreSQL value and row conversions.
//!
//! [`PgAddress`] carries an [`Address`] across the wire as the `address`
//! composite type. Field order is owned by `Address`'s [`CompositeRecord`]
//! impl; the adapters here only bridge sqlx's record encoder/decoder to the
//! [`FieldReader`] / [`FieldWriter`] contract.

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::{PgRecordDecoder, PgRecordEncoder};
use sqlx::postgres::{PgArgumentBuffer, PgRow, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Row, Type};

use pgcdt_core::contact::{
    decode_phone_numbers, decode_tagged_phone_numbers, Contact, ContactError, PhoneNumbers,
};
use pgcdt_core::person::{Address, User};
use pgcdt_core::record::{CompositeRecord, FieldError, FieldReader, FieldWriter};

/// An [`Address`] bound to, or read from, an `address` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgAddress(pub Address);

impl Type<Postgres> for PgAddress {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name(Address::TYPE_NAME)
    }
}

impl Encode<'_, Postgres> for PgAddress {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        let mut writer = PgFieldWriter::new(buf);
        self.0.encode_into(&mut writer)?;
        writer.finish();
        Ok(IsNull::No)
    }
}

impl<'r> Decode<'r, Postgres> for PgAddress {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let mut reader = PgFieldReader::new(value)?;
        Ok(PgAddress(Address::decode_from(&mut reader)?))
    }
}

/// [`FieldReader`] over sqlx's composite decoder.
struct PgFieldReader<'r> {
    decoder: PgRecordDecoder<'r>,
    index: usize,
}

impl<'r> PgFieldReader<'r> {
    fn new(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        Ok(Self {
            decoder: PgRecordDecoder::new(value)?,
            index: 0,
        })
    }

    fn next<T>(&mut self) -> Result<T, FieldError>
    where
        T: for<'a> Decode<'a, Postgres> + Type<Postgres>,
    {
        let index = self.index;
        self.index += 1;
        self.decoder
            .try_decode::<T>()
            .map_err(|e| FieldError::Backend {
                index,
                message: e.to_string(),
            })
    }
}

impl FieldReader for PgFieldReader<'_> {
    fn read_int(&mut self) -> Result<i32, FieldError> {
        self.next::<i32>()
    }

    fn read_string(&mut self) -> Result<String, FieldError> {
        self.next::<String>()
    }
}

/// [`FieldWriter`] over sqlx's composite encoder.
struct PgFieldWriter<'a> {
    encoder: PgRecordEncoder<'a>,
    index: usize,
}

impl<'a> PgFieldWriter<'a> {
    fn new(buf: &'a mut PgArgumentBuffer) -> Self {
        Self {
            encoder: PgRecordEncoder::new(buf),
            index: 0,
        }
    }

    fn finish(&mut self) {
        self.encoder.finish();
    }

    fn track(&mut self, result: Result<(), BoxDynError>) -> Result<(), FieldError> {
        let index = self.index;
        self.index += 1;
        result.map_err(|e| FieldError::Backend {
            index,
            message: e.to_string(),
        })
    }
}

impl FieldWriter for PgFieldWriter<'_> {
    fn write_int(&mut self, value: i32) -> Result<(), FieldError> {
        let result = self.encoder.encode(value).map(|_| ());
        self.track(result)
    }

    fn write_string(&mut self, value: &str) -> Result<(), FieldError> {
        let result = self.encoder.encode(VarcharField(value)).map(|_| ());
        self.track(result)
    }
}

/// A string field of the `address` composite.
///
/// sqlx tags `&str` as `text`; the server rejects a binary record whose field
/// type differs from the declared `varchar`.
struct VarcharField<'a>(&'a str);

impl Type<Postgres> for VarcharField<'_> {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("varchar")
    }
}

impl Encode<'_, Postgres> for VarcharField<'_> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<'_, Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Convert a row to a Contact.
///
/// Expected columns: name, email, phone_numbers (jsonb object cast to text)
pub fn row_to_contact(row: &PgRow) -> sqlx::Result<Contact> {
    row_to_contact_with(row, decode_phone_numbers)
}

/// Convert a `tagged_contacts` row to a Contact.
///
/// Expected columns: name, email, phone_numbers (jsonb array cast to text)
pub fn row_to_tagged_contact(row: &PgRow) -> sqlx::Result<Contact> {
    row_to_contact_with(row, decode_tagged_phone_numbers)
}

fn row_to_contact_with(
    row: &PgRow,
    decode: fn(&str) -> Result<PhoneNumbers, ContactError>,
) -> sqlx::Result<Contact> {
    let name: String = row.try_get("name")?;
    let email: String = row.try_get("email")?;
    let phone_numbers: Option<String> = row.try_get("phone_numbers")?;

    let phone_numbers = match phone_numbers {
        Some(text) => decode(&text).map_err(|e| sqlx::Error::ColumnDecode {
            index: "phone_numbers".to_string(),
            source: Box::new(e),
        })?,
        None => PhoneNumbers::new(),
    };

    Ok(Contact {
        name,
        email,
        phone_numbers,
    })
}

/// Convert a row to a User.
///
/// Expected columns: id, name, address
pub fn row_to_user(row: &PgRow) -> sqlx::Result<User> {
    let id: i32 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let PgAddress(address) = row.try_get::<PgAddress, _>("address")?;

    Ok(User { id, name, address })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::TypeInfo;

    #[test]
    fn test_address_type_is_looked_up_by_name() {
        assert_eq!(PgAddress::type_info().name(), "address");
    }

    #[test]
    fn test_string_fields_are_tagged_varchar() {
        // Must match the field type declared in the composite, not `text`.
        assert_eq!(VarcharField::type_info().name(), "varchar");
        assert_ne!(
            VarcharField::type_info().name(),
            <&str as Type<Postgres>>::type_info().name()
        );
    }
}
