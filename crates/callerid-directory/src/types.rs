//! Directory records and the read-only projections handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub u64);

/// Identifier of a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user of the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub phone_number: String,
    pub email: Option<String>,
    #[serde(default)]
    pub spam: bool,
    pub registered_at: DateTime<Utc>,
}

/// Login secret for an identity. The hash is an argon2 PHC string.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    pub identity_id: IdentityId,
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity_id", &self.identity_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Persistent opaque login token. One per identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub key: String,
    pub identity_id: IdentityId,
    pub created_at: DateTime<Utc>,
}

/// Someone's phone number as known to the owners linking to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    #[serde(default)]
    pub spam: bool,
    pub created_at: DateTime<Utc>,
}

/// Address-book entry: `owner` added `contact`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnershipLink {
    pub owner: IdentityId,
    pub contact: ContactId,
}

/// Spam report for a number the directory has no contact for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalSpamEntry {
    pub phone_number: String,
    pub reported_at: DateTime<Utc>,
}

/// Search result, regardless of which record kind produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryHit {
    pub name: String,
    pub phone_number: String,
    pub spam: bool,
}

impl From<&Identity> for DirectoryHit {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.username.clone(),
            phone_number: identity.phone_number.clone(),
            spam: identity.spam,
        }
    }
}

impl From<&Contact> for DirectoryHit {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            spam: contact.spam,
        }
    }
}

/// Public profile of a registered identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityProfile {
    pub username: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub spam: bool,
}

impl From<&Identity> for IdentityProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            phone_number: identity.phone_number.clone(),
            email: identity.email.clone(),
            spam: identity.spam,
        }
    }
}

/// Contact as returned to API callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactView {
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub spam: bool,
}

impl From<&Contact> for ContactView {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            email: contact.email.clone(),
            spam: contact.spam,
        }
    }
}
