//! Spam reporting.
//!
//! A report lands on every contact holding the number when there is one, and
//! on the global ledger otherwise. The identity registered with the number is
//! kept in step with its contacts.

use crate::error::DirectoryError;
use crate::store::{DirectoryData, DirectoryStore};
use crate::validate;
use serde::Serialize;
use tracing::{info, instrument};

/// What a spam report changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpamOutcome {
    /// Contacts with the number were flagged.
    ContactMarked {
        contacts: usize,
        identity_marked: bool,
    },
    /// The number was added to the global ledger.
    GlobalCreated,
    /// The ledger already held the number.
    GlobalExisting,
}

impl SpamOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SpamOutcome::ContactMarked { .. } => "Contact marked as spam successfully",
            SpamOutcome::GlobalCreated => "Number marked as spam globally successfully",
            SpamOutcome::GlobalExisting => "Number already marked as spam globally",
        }
    }
}

/// Report a phone number as spam.
///
/// Idempotent: repeating a report converges on the same state and never
/// fails for a valid number.
#[instrument(skip(store))]
pub async fn mark_spam(
    store: &DirectoryStore,
    phone_number: Option<&str>,
) -> Result<SpamOutcome, DirectoryError> {
    let phone_number = validate::phone_number(phone_number)?;

    let outcome = store
        .transact(|data| Ok(apply_report(data, &phone_number)))
        .await?;

    info!(phone_number = %phone_number, ?outcome, "Spam report recorded");
    Ok(outcome)
}

/// Apply a report to `data`. Contacts first, ledger as fallback.
pub fn apply_report(data: &mut DirectoryData, phone_number: &str) -> SpamOutcome {
    if data.contacts_by_phone(phone_number).next().is_some() {
        return flag_contacts(data, phone_number);
    }

    if data.insert_global_spam(phone_number) {
        SpamOutcome::GlobalCreated
    } else {
        SpamOutcome::GlobalExisting
    }
}

/// Flag every contact holding the number, then the identity registered with it.
pub(crate) fn flag_contacts(data: &mut DirectoryData, phone_number: &str) -> SpamOutcome {
    let mut contacts = 0;
    for contact in data.contacts_by_phone_mut(phone_number) {
        contact.spam = true;
        contacts += 1;
    }

    let identity_marked = match data.identity_by_phone_mut(phone_number) {
        Some(identity) => {
            identity.spam = true;
            true
        }
        None => false,
    };

    SpamOutcome::ContactMarked {
        contacts,
        identity_marked,
    }
}
