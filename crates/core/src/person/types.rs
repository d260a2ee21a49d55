use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::{
    from_record_text, to_record_text, CompositeRecord, FieldError, FieldReader, FieldWriter,
};

/// A postal address, stored as the `address` composite type.
///
/// Field order matches the type definition:
/// `(block_no, street_address, city, state, pin_code)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub block_number: i32,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub pin_code: i32,
}

impl Address {
    pub fn new(
        block_number: i32,
        street_address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        pin_code: i32,
    ) -> Self {
        Self {
            block_number,
            street_address: street_address.into(),
            city: city.into(),
            state: state.into(),
            pin_code,
        }
    }
}

impl CompositeRecord for Address {
    const TYPE_NAME: &'static str = "address";
    const FIELD_COUNT: usize = 5;

    fn encode_into(&self, writer: &mut dyn FieldWriter) -> Result<(), FieldError> {
        writer.write_int(self.block_number)?;
        writer.write_string(&self.street_address)?;
        writer.write_string(&self.city)?;
        writer.write_string(&self.state)?;
        writer.write_int(self.pin_code)?;
        Ok(())
    }

    fn decode_from(reader: &mut dyn FieldReader) -> Result<Self, FieldError> {
        // Struct expressions evaluate fields in the order written.
        Ok(Address {
            block_number: reader.read_int()?,
            street_address: reader.read_string()?,
            city: reader.read_string()?,
            state: reader.read_string()?,
            pin_code: reader.read_int()?,
        })
    }
}

/// Formats the address as a composite literal, e.g.
/// `(201,"Bartelt Junction",Duke,NY,51023)`.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = to_record_text(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Address {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_record_text(s)
    }
}

/// A person with a nested address. Only used for sample responses.
///
/// The nested address goes over the wire as `flatNo` / `streetName`; user rows
/// keep the column-derived `blockNumber` / `streetAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: i32,
    #[serde(with = "flat_address")]
    pub address: Address,
}

mod flat_address {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Address;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct FlatAddress {
        flat_no: i32,
        street_name: String,
        city: String,
        state: String,
        pin_code: i32,
    }

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        FlatAddress {
            flat_no: address.block_number,
            street_name: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pin_code: address.pin_code,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let flat = FlatAddress::deserialize(deserializer)?;
        Ok(Address::new(
            flat.flat_no,
            flat.street_name,
            flat.city,
            flat.state,
            flat.pin_code,
        ))
    }
}

impl Person {
    pub fn new(name: impl Into<String>, age: i32, address: Address) -> Self {
        Self {
            name: name.into(),
            age,
            address,
        }
    }
}

/// A stored user row with its composite address column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned serial id.
    pub id: i32,
    pub name: String,
    pub address: Address,
}

/// Request payload for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub address: Address,
}

impl NewUser {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// Attaches the id assigned by the store.
    pub fn into_user(self, id: i32) -> User {
        User {
            id,
            name: self.name,
            address: self.address,
        }
    }
}
