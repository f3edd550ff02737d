//! Caller directory server - HTTP front end for the caller directory.
//!
//! Exposes registration, login, personal contacts, spam reporting and
//! directory search over JSON, with token authentication and a global rate
//! limit.

pub mod api;
pub mod config;
pub mod error;

pub use config::Config;
pub use error::ApiError;
