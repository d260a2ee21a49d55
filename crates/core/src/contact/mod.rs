mod codec;
mod error;
mod types;

pub use codec::{
    decode_phone_numbers, decode_tagged_phone_numbers, encode_phone_numbers,
    encode_tagged_phone_numbers, tag_filter,
};
pub use error::ContactError;
pub use types::{Contact, PhoneEntry, PhoneNumbers};
