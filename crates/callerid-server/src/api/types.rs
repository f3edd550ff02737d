//! API request and response types.
//!
//! Request fields are all optional so that a missing field is reported as a
//! validation error with a readable message.

use callerid_directory::{ContactView, SpamOutcome};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Request to register a new identity.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<SecretString>,
    pub email: Option<String>,
}

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

/// Response after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Request to add a contact to the caller's address book.
#[derive(Debug, Deserialize)]
pub struct AddContactRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// Response after adding a contact.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,
    /// The stored contact; absent when it already existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactView>,
}

/// Request to report a number as spam.
#[derive(Debug, Deserialize)]
pub struct MarkSpamRequest {
    pub phone_number: Option<String>,
}

/// Response after a spam report.
#[derive(Debug, Serialize)]
pub struct SpamResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: SpamOutcome,
}

/// Query for name search.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// Query for phone number search.
#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone_number: Option<String>,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub identities: usize,
    pub contacts: usize,
    pub spam_reports: usize,
    pub persistent: bool,
}
