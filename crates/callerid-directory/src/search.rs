//! Directory search by name and by phone number.

use crate::error::DirectoryError;
use crate::store::{DirectoryData, DirectoryStore};
use crate::types::{ContactView, DirectoryHit, IdentityProfile};
use crate::validate;
use serde::Serialize;
use tracing::{debug, instrument};

/// Result of a phone number lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PhoneLookup {
    /// A registered identity holds the number.
    Identity(IdentityProfile),
    /// Only contacts hold the number.
    Contacts(Vec<ContactView>),
}

/// Search identities and contacts by name.
#[instrument(skip(store))]
pub async fn search_by_name(
    store: &DirectoryStore,
    name: Option<&str>,
) -> Result<Vec<DirectoryHit>, DirectoryError> {
    // Blank queries are rejected, but matching uses the query as given
    validate::required("name", name)?;
    let query = name.unwrap_or_default();

    let hits = store.read(|data| name_hits(data, query)).await;

    debug!(results = hits.len(), "Name search complete");
    Ok(hits)
}

/// Rank name matches: prefix matches before substring matches, identities
/// before contacts within each, storage order inside each group.
pub fn name_hits(data: &DirectoryData, query: &str) -> Vec<DirectoryHit> {
    let identities = data.identities();
    let contacts = data.contacts();

    let identity_prefix = identities
        .iter()
        .filter(|i| i.username.starts_with(query))
        .map(DirectoryHit::from);
    let contact_prefix = contacts
        .iter()
        .filter(|c| c.name.starts_with(query))
        .map(DirectoryHit::from);
    let identity_infix = identities
        .iter()
        .filter(|i| is_infix(&i.username, query))
        .map(DirectoryHit::from);
    let contact_infix = contacts
        .iter()
        .filter(|c| is_infix(&c.name, query))
        .map(DirectoryHit::from);

    identity_prefix
        .chain(contact_prefix)
        .chain(identity_infix)
        .chain(contact_infix)
        .collect()
}

fn is_infix(value: &str, query: &str) -> bool {
    value.contains(query) && !value.starts_with(query)
}

/// Look up a phone number. A registered identity takes precedence over
/// contacts holding the same number.
#[instrument(skip(store))]
pub async fn search_by_phone(
    store: &DirectoryStore,
    phone_number: Option<&str>,
) -> Result<PhoneLookup, DirectoryError> {
    let phone_number = validate::phone_number(phone_number)?;

    let found = store.read(|data| phone_lookup(data, &phone_number)).await;
    found.ok_or(DirectoryError::NotFound(phone_number))
}

pub fn phone_lookup(data: &DirectoryData, phone_number: &str) -> Option<PhoneLookup> {
    if let Some(identity) = data.identity_by_phone(phone_number) {
        return Some(PhoneLookup::Identity(IdentityProfile::from(identity)));
    }

    let contacts: Vec<ContactView> = data
        .contacts_by_phone(phone_number)
        .map(ContactView::from)
        .collect();
    if contacts.is_empty() {
        None
    } else {
        Some(PhoneLookup::Contacts(contacts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> DirectoryStore {
        let store = DirectoryStore::memory();
        store
            .transact(|data| {
                let john = data.insert_identity("John", "+10", None)?;
                data.insert_identity("Joan", "+11", None)?;
                data.insert_identity("MaryJo", "+12", None)?;
                let joe = data.insert_contact("Joe", "+20", None);
                let bojo = data.insert_contact("BoJo", "+21", None);
                let jane = data.insert_contact("Jane", "+10", None);
                data.insert_link(john, joe)?;
                data.insert_link(john, bojo)?;
                data.insert_link(john, jane)
            })
            .await
            .unwrap();
        store
    }

    fn names(hits: &[DirectoryHit]) -> Vec<&str> {
        hits.iter().map(|h| h.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_name_search_group_order() {
        let store = seeded_store().await;

        let hits = search_by_name(&store, Some("Jo")).await.unwrap();

        assert_eq!(names(&hits), vec!["John", "Joan", "Joe", "MaryJo", "BoJo"]);
    }

    #[tokio::test]
    async fn test_name_search_is_case_sensitive() {
        let store = seeded_store().await;

        let hits = search_by_name(&store, Some("jo")).await.unwrap();

        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_name_search_reports_phone_and_spam() {
        let store = seeded_store().await;
        store
            .transact(|data| Ok(crate::spam::apply_report(data, "+20")))
            .await
            .unwrap();

        let hits = search_by_name(&store, Some("Joe")).await.unwrap();

        assert_eq!(
            hits,
            vec![DirectoryHit {
                name: "Joe".into(),
                phone_number: "+20".into(),
                spam: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_name_search_keeps_surrounding_whitespace() {
        let store = seeded_store().await;
        store
            .transact(|data| data.insert_identity("Mary Jo", "+13", None).map(|_| ()))
            .await
            .unwrap();

        let hits = search_by_name(&store, Some(" Jo")).await.unwrap();

        assert_eq!(names(&hits), vec!["Mary Jo"]);
    }

    #[tokio::test]
    async fn test_name_search_requires_name() {
        let store = seeded_store().await;

        assert!(matches!(
            search_by_name(&store, Some("")).await,
            Err(DirectoryError::Validation(_))
        ));
        assert!(matches!(
            search_by_name(&store, Some("  ")).await,
            Err(DirectoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_phone_search_prefers_identity() {
        let store = seeded_store().await;

        let result = search_by_phone(&store, Some("+10")).await.unwrap();

        let PhoneLookup::Identity(profile) = result else {
            panic!("expected identity profile");
        };
        assert_eq!(profile.username, "John");
    }

    #[tokio::test]
    async fn test_phone_search_falls_back_to_contacts() {
        let store = seeded_store().await;

        let result = search_by_phone(&store, Some("+21")).await.unwrap();

        let PhoneLookup::Contacts(contacts) = result else {
            panic!("expected contact list");
        };
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "BoJo");
    }

    #[tokio::test]
    async fn test_phone_search_not_found() {
        let store = seeded_store().await;

        assert!(matches!(
            search_by_phone(&store, Some("+99")).await,
            Err(DirectoryError::NotFound(n)) if n == "+99"
        ));
        assert!(matches!(
            search_by_phone(&store, None).await,
            Err(DirectoryError::Validation(_))
        ));
    }

    #[test]
    fn test_phone_lookup_serializes_untagged() {
        let profile = PhoneLookup::Identity(IdentityProfile {
            username: "alice".into(),
            phone_number: "+1".into(),
            email: None,
            spam: false,
        });
        let list = PhoneLookup::Contacts(vec![]);

        assert!(serde_json::to_value(&profile).unwrap().is_object());
        assert!(serde_json::to_value(&list).unwrap().is_array());
    }
}
