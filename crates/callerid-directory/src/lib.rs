//! Caller directory: registered identities, personal address books, spam
//! reports and directory search.
//!
//! Records live in a [`DirectoryStore`]. Each operation is a plain function
//! that takes the store explicitly; writes run as one unit of work through
//! [`DirectoryStore::transact`].

pub mod contacts;
mod error;
pub mod registration;
pub mod search;
pub mod spam;
pub mod store;
mod types;
pub mod validate;

pub use contacts::{add_contact, list_contacts, ContactDedup, ContactOutcome, NewContact};
pub use error::DirectoryError;
pub use registration::{authenticate_token, login, register, NewIdentity};
pub use search::{search_by_name, search_by_phone, PhoneLookup};
pub use spam::{mark_spam, SpamOutcome};
pub use store::{DirectoryData, DirectoryStats, DirectoryStore};
pub use types::*;
