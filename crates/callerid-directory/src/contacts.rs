//! Personal address books.

use crate::error::DirectoryError;
use crate::spam;
use crate::store::{DirectoryData, DirectoryStore};
use crate::types::{ContactView, IdentityId};
use crate::validate::{self, MAX_CONTACT_NAME_LEN};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Which existing entry makes an `add_contact` call a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactDedup {
    /// The caller already has a contact with this phone number.
    #[default]
    Caller,
    /// Some identity whose username equals the contact name already has a
    /// contact with this phone number. Compatibility mode for older clients.
    NamedIdentity,
}

/// Contact input.
#[derive(Debug, Default, Clone)]
pub struct NewContact {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// Result of adding a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Saved(ContactView),
    AlreadyExists,
}

/// Add a contact to `owner`'s address book.
///
/// Creates one contact and one ownership link unless `dedup` finds an
/// existing entry. A new contact inherits any spam report already held for
/// its number, whether on the global ledger or on another owner's contact.
#[instrument(skip(store, request), fields(phone_number = ?request.phone_number))]
pub async fn add_contact(
    store: &DirectoryStore,
    owner: IdentityId,
    request: NewContact,
    dedup: ContactDedup,
) -> Result<ContactOutcome, DirectoryError> {
    let name = validate::required("name", request.name.as_deref())?;
    let name = validate::max_len("name", name, MAX_CONTACT_NAME_LEN)?;
    let phone_number = validate::phone_number(request.phone_number.as_deref())?;
    let email = validate::email(request.email.as_deref())?;

    let outcome = store
        .transact(|data| {
            if is_duplicate(data, owner, name, &phone_number, dedup) {
                return Ok(ContactOutcome::AlreadyExists);
            }

            let contact_id = data.insert_contact(name, &phone_number, email);
            data.insert_link(owner, contact_id)?;

            let from_ledger = data.remove_global_spam(&phone_number).is_some();
            if from_ledger || data.contacts_by_phone(&phone_number).any(|c| c.spam) {
                info!(phone_number = %phone_number, from_ledger, "New contact inherits spam report");
                spam::flag_contacts(data, &phone_number);
            }

            let contact = data
                .contact(contact_id)
                .ok_or_else(|| DirectoryError::Storage("contact vanished".into()))?;
            Ok(ContactOutcome::Saved(ContactView::from(contact)))
        })
        .await?;

    match &outcome {
        ContactOutcome::Saved(_) => info!(%owner, phone_number = %phone_number, "Contact saved"),
        ContactOutcome::AlreadyExists => {
            debug!(%owner, phone_number = %phone_number, "Contact already exists")
        }
    }
    Ok(outcome)
}

fn is_duplicate(
    data: &DirectoryData,
    owner: IdentityId,
    name: &str,
    phone_number: &str,
    dedup: ContactDedup,
) -> bool {
    match dedup {
        ContactDedup::Caller => data.owner_has_phone(owner, phone_number),
        ContactDedup::NamedIdentity => data
            .identity_by_username(name)
            .is_some_and(|named| data.owner_has_phone(named.id, phone_number)),
    }
}

/// Contacts in `owner`'s address book, oldest first.
pub async fn list_contacts(store: &DirectoryStore, owner: IdentityId) -> Vec<ContactView> {
    store
        .read(|data| {
            data.owned_contacts(owner)
                .into_iter()
                .map(ContactView::from)
                .collect()
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(usernames: &[(&str, &str)]) -> (DirectoryStore, Vec<IdentityId>) {
        let store = DirectoryStore::memory();
        let mut ids = Vec::new();
        for (username, phone) in usernames {
            let id = store
                .transact(|data| data.insert_identity(username, phone, None))
                .await
                .unwrap();
            ids.push(id);
        }
        (store, ids)
    }

    fn bob() -> NewContact {
        NewContact {
            name: Some("Bob".into()),
            phone_number: Some("+2".into()),
            email: Some("bob@example.com".into()),
        }
    }

    #[tokio::test]
    async fn test_add_contact_saves_contact_and_link() {
        let (store, ids) = store_with(&[("alice", "+1")]).await;

        let outcome = add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();

        let ContactOutcome::Saved(view) = outcome else {
            panic!("expected saved contact");
        };
        assert_eq!(view.name, "Bob");
        assert_eq!(view.email, Some("bob@example.com".into()));
        assert!(!view.spam);
        assert_eq!(list_contacts(&store, ids[0]).await, vec![view]);
    }

    #[tokio::test]
    async fn test_add_contact_twice_is_noop() {
        let (store, ids) = store_with(&[("alice", "+1")]).await;

        add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();
        let second = add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();

        assert_eq!(second, ContactOutcome::AlreadyExists);
        let stats = store.stats().await;
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.links, 1);
    }

    #[tokio::test]
    async fn test_two_owners_keep_separate_contacts() {
        let (store, ids) = store_with(&[("alice", "+1"), ("carol", "+3")]).await;

        add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();
        let outcome = add_contact(
            &store,
            ids[1],
            NewContact {
                name: Some("Bobby".into()),
                ..bob()
            },
            ContactDedup::Caller,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ContactOutcome::Saved(_)));
        assert_eq!(list_contacts(&store, ids[1]).await[0].name, "Bobby");
        assert_eq!(list_contacts(&store, ids[0]).await[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_named_identity_dedup_checks_named_user() {
        let (store, ids) = store_with(&[("alice", "+1"), ("Bob", "+5")]).await;
        let (alice, bob_id) = (ids[0], ids[1]);

        // Bob's own address book holds +2
        add_contact(&store, bob_id, bob(), ContactDedup::Caller)
            .await
            .unwrap();

        // Alice adding "Bob" at +2 matches Bob's entry, not hers
        let outcome = add_contact(&store, alice, bob(), ContactDedup::NamedIdentity)
            .await
            .unwrap();
        assert_eq!(outcome, ContactOutcome::AlreadyExists);
        assert!(list_contacts(&store, alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_named_identity_dedup_surfaces_conflict() {
        let (store, ids) = store_with(&[("alice", "+1")]).await;

        add_contact(&store, ids[0], bob(), ContactDedup::NamedIdentity)
            .await
            .unwrap();
        // No identity is named "Bob", so the storage constraint decides
        let result = add_contact(&store, ids[0], bob(), ContactDedup::NamedIdentity).await;

        assert!(matches!(result, Err(DirectoryError::Conflict(_))));
        assert_eq!(store.stats().await.contacts, 1);
    }

    #[tokio::test]
    async fn test_add_contact_absorbs_global_spam_report() {
        let (store, ids) = store_with(&[("alice", "+1"), ("bob", "+2")]).await;
        store
            .transact(|data| Ok(data.insert_global_spam("+2")))
            .await
            .unwrap();

        let outcome = add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();

        let ContactOutcome::Saved(view) = outcome else {
            panic!("expected saved contact");
        };
        assert!(view.spam);
        let (ledger, identity_spam) = store
            .read(|data| {
                (
                    data.global_spam_entries().len(),
                    data.identity_by_phone("+2").map(|i| i.spam),
                )
            })
            .await;
        assert_eq!(ledger, 0);
        assert_eq!(identity_spam, Some(true));
    }

    #[tokio::test]
    async fn test_add_contact_inherits_report_from_other_owner() {
        let (store, ids) = store_with(&[("alice", "+1"), ("carol", "+3"), ("bob", "+2")]).await;
        add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();
        spam::mark_spam(&store, Some("+2")).await.unwrap();

        let outcome = add_contact(
            &store,
            ids[1],
            NewContact {
                name: Some("Bobby".into()),
                ..bob()
            },
            ContactDedup::Caller,
        )
        .await
        .unwrap();

        let ContactOutcome::Saved(view) = outcome else {
            panic!("expected saved contact");
        };
        assert!(view.spam);
        let (flags, identity_spam, ledger) = store
            .read(|data| {
                (
                    data.contacts_by_phone("+2").map(|c| c.spam).collect::<Vec<_>>(),
                    data.identity_by_phone("+2").map(|i| i.spam),
                    data.global_spam_entries().len(),
                )
            })
            .await;
        assert_eq!(flags, vec![true, true]);
        assert_eq!(identity_spam, Some(true));
        assert_eq!(ledger, 0);
    }

    #[tokio::test]
    async fn test_add_contact_for_clean_number_stays_clean() {
        let (store, ids) = store_with(&[("alice", "+1"), ("carol", "+3")]).await;
        add_contact(&store, ids[0], bob(), ContactDedup::Caller)
            .await
            .unwrap();

        let outcome = add_contact(
            &store,
            ids[1],
            NewContact {
                name: Some("Bobby".into()),
                ..bob()
            },
            ContactDedup::Caller,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ContactOutcome::Saved(view) if !view.spam));
    }

    #[tokio::test]
    async fn test_add_contact_missing_fields() {
        let (store, ids) = store_with(&[("alice", "+1")]).await;

        let no_name = NewContact {
            name: None,
            ..bob()
        };
        let no_phone = NewContact {
            phone_number: Some(" ".into()),
            ..bob()
        };

        for request in [no_name, no_phone] {
            let result = add_contact(&store, ids[0], request, ContactDedup::Caller).await;
            assert!(matches!(result, Err(DirectoryError::Validation(_))));
        }
        assert_eq!(store.stats().await.contacts, 0);
    }
}
