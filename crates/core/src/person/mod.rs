mod types;

pub use types::{Address, NewUser, Person, User};
