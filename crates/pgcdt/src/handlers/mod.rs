pub mod contacts;
pub mod error;
pub mod explain;
pub mod health;
pub mod persons;
pub mod tagged_contacts;
pub mod users;

pub use error::AppError;
