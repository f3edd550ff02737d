//! Directory storage: plain records behind one lock, with optional
//! JSON snapshot persistence.

use crate::error::DirectoryError;
use crate::types::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Data version for schema migrations.
const DATA_VERSION: u32 = 1;

/// Every record the directory holds. Vectors keep insertion order, which is
/// the storage order search results are reported in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryData {
    /// Schema version for migrations.
    pub version: u32,
    next_identity_id: u64,
    next_contact_id: u64,
    identities: Vec<Identity>,
    credentials: Vec<Credential>,
    tokens: Vec<AuthToken>,
    contacts: Vec<Contact>,
    links: Vec<OwnershipLink>,
    global_spam: Vec<GlobalSpamEntry>,
}

impl Default for DirectoryData {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            next_identity_id: 1,
            next_contact_id: 1,
            identities: Vec::new(),
            credentials: Vec::new(),
            tokens: Vec::new(),
            contacts: Vec::new(),
            links: Vec::new(),
            global_spam: Vec::new(),
        }
    }
}

impl DirectoryData {
    // Identities

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn identity(&self, id: IdentityId) -> Option<&Identity> {
        self.identities.iter().find(|i| i.id == id)
    }

    pub fn identity_by_phone(&self, phone_number: &str) -> Option<&Identity> {
        self.identities
            .iter()
            .find(|i| i.phone_number == phone_number)
    }

    pub fn identity_by_phone_mut(&mut self, phone_number: &str) -> Option<&mut Identity> {
        self.identities
            .iter_mut()
            .find(|i| i.phone_number == phone_number)
    }

    pub fn identity_by_username(&self, username: &str) -> Option<&Identity> {
        self.identities.iter().find(|i| i.username == username)
    }

    /// Insert an identity. Phone numbers are unique across identities.
    pub fn insert_identity(
        &mut self,
        username: &str,
        phone_number: &str,
        email: Option<String>,
    ) -> Result<IdentityId, DirectoryError> {
        if self.identity_by_phone(phone_number).is_some() {
            return Err(DirectoryError::DuplicatePhoneNumber(phone_number.to_string()));
        }
        if self.identity_by_username(username).is_some() {
            return Err(DirectoryError::validation(
                "A user with that username already exists.",
            ));
        }

        let id = IdentityId(self.next_identity_id);
        self.next_identity_id += 1;
        self.identities.push(Identity {
            id,
            username: username.to_string(),
            phone_number: phone_number.to_string(),
            email,
            spam: false,
            registered_at: Utc::now(),
        });
        Ok(id)
    }

    // Credentials and tokens

    pub fn credential_by_username(&self, username: &str) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.username == username)
    }

    /// Insert a credential. Usernames are unique across credentials.
    pub fn insert_credential(&mut self, credential: Credential) -> Result<(), DirectoryError> {
        if self.credential_by_username(&credential.username).is_some() {
            return Err(DirectoryError::validation(
                "A user with that username already exists.",
            ));
        }
        self.credentials.push(credential);
        Ok(())
    }

    pub fn token(&self, key: &str) -> Option<&AuthToken> {
        self.tokens.iter().find(|t| t.key == key)
    }

    pub fn token_for(&self, identity_id: IdentityId) -> Option<&AuthToken> {
        self.tokens.iter().find(|t| t.identity_id == identity_id)
    }

    /// Insert a token. An identity holds at most one token.
    pub fn insert_token(&mut self, token: AuthToken) -> Result<(), DirectoryError> {
        if self.token_for(token.identity_id).is_some() || self.token(&token.key).is_some() {
            return Err(DirectoryError::Conflict(format!(
                "token already issued for identity {}",
                token.identity_id
            )));
        }
        self.tokens.push(token);
        Ok(())
    }

    // Contacts and ownership

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn contacts_by_phone<'a>(
        &'a self,
        phone_number: &'a str,
    ) -> impl Iterator<Item = &'a Contact> + 'a {
        self.contacts
            .iter()
            .filter(move |c| c.phone_number == phone_number)
    }

    pub fn contacts_by_phone_mut<'a>(
        &'a mut self,
        phone_number: &'a str,
    ) -> impl Iterator<Item = &'a mut Contact> + 'a {
        self.contacts
            .iter_mut()
            .filter(move |c| c.phone_number == phone_number)
    }

    pub fn insert_contact(
        &mut self,
        name: &str,
        phone_number: &str,
        email: Option<String>,
    ) -> ContactId {
        let id = ContactId(self.next_contact_id);
        self.next_contact_id += 1;
        self.contacts.push(Contact {
            id,
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            email,
            spam: false,
            created_at: Utc::now(),
        });
        id
    }

    pub fn links(&self) -> &[OwnershipLink] {
        &self.links
    }

    /// Contacts linked to `owner`, in the order they were added.
    pub fn owned_contacts(&self, owner: IdentityId) -> Vec<&Contact> {
        self.links
            .iter()
            .filter(|l| l.owner == owner)
            .filter_map(|l| self.contact(l.contact))
            .collect()
    }

    pub fn owner_has_phone(&self, owner: IdentityId, phone_number: &str) -> bool {
        self.owned_contacts(owner)
            .iter()
            .any(|c| c.phone_number == phone_number)
    }

    /// Link `contact` into `owner`'s address book.
    ///
    /// The pair is unique, and an owner never holds two contacts with the same
    /// phone number.
    pub fn insert_link(
        &mut self,
        owner: IdentityId,
        contact: ContactId,
    ) -> Result<(), DirectoryError> {
        if self.identity(owner).is_none() {
            return Err(DirectoryError::Conflict(format!("unknown identity {}", owner)));
        }
        let phone_number = match self.contact(contact) {
            Some(c) => c.phone_number.clone(),
            None => {
                return Err(DirectoryError::Conflict(format!("unknown contact {}", contact)))
            }
        };
        if self.links.iter().any(|l| l.owner == owner && l.contact == contact) {
            return Err(DirectoryError::Conflict(format!(
                "contact {} already linked to identity {}",
                contact, owner
            )));
        }
        if self.owner_has_phone(owner, &phone_number) {
            return Err(DirectoryError::Conflict(format!(
                "identity {} already has a contact for {}",
                owner, phone_number
            )));
        }

        self.links.push(OwnershipLink { owner, contact });
        Ok(())
    }

    // Global spam ledger

    pub fn global_spam_entries(&self) -> &[GlobalSpamEntry] {
        &self.global_spam
    }

    pub fn global_spam(&self, phone_number: &str) -> Option<&GlobalSpamEntry> {
        self.global_spam
            .iter()
            .find(|e| e.phone_number == phone_number)
    }

    /// Record a ledger entry unless one exists. Returns true when created.
    pub fn insert_global_spam(&mut self, phone_number: &str) -> bool {
        if self.global_spam(phone_number).is_some() {
            return false;
        }
        self.global_spam.push(GlobalSpamEntry {
            phone_number: phone_number.to_string(),
            reported_at: Utc::now(),
        });
        true
    }

    pub fn remove_global_spam(&mut self, phone_number: &str) -> Option<GlobalSpamEntry> {
        let idx = self
            .global_spam
            .iter()
            .position(|e| e.phone_number == phone_number)?;
        Some(self.global_spam.remove(idx))
    }

    pub fn stats(&self) -> DirectoryStats {
        DirectoryStats {
            identities: self.identities.len(),
            contacts: self.contacts.len(),
            links: self.links.len(),
            spam_reports: self.global_spam.len(),
        }
    }
}

/// Record counts, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    pub identities: usize,
    pub contacts: usize,
    pub links: usize,
    pub spam_reports: usize,
}

/// Shared directory store.
///
/// Reads take the lock shared. Writes go through [`DirectoryStore::transact`],
/// which stages the change on a copy and publishes it only after the
/// operation and the snapshot write both succeed.
pub struct DirectoryStore {
    data: RwLock<DirectoryData>,
    storage_path: Option<PathBuf>,
}

impl DirectoryStore {
    /// In-memory store (data is lost on restart).
    pub fn memory() -> Self {
        Self {
            data: RwLock::new(DirectoryData::default()),
            storage_path: None,
        }
    }

    /// Store backed by a snapshot file, loading it if it exists.
    pub async fn open(storage_path: PathBuf) -> Result<Self, DirectoryError> {
        let data = load(&storage_path).await?;
        Ok(Self {
            data: RwLock::new(data),
            storage_path: Some(storage_path),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.storage_path.is_some()
    }

    /// Run a read-only query against the current state.
    pub async fn read<T>(&self, query: impl FnOnce(&DirectoryData) -> T) -> T {
        let data = self.data.read().await;
        query(&data)
    }

    /// Apply `op` as one unit of work.
    ///
    /// The write lock is held for the whole call. If `op` fails or the
    /// snapshot cannot be written, the published state is left untouched.
    pub async fn transact<T>(
        &self,
        op: impl FnOnce(&mut DirectoryData) -> Result<T, DirectoryError>,
    ) -> Result<T, DirectoryError> {
        let mut data = self.data.write().await;
        let mut staged = data.clone();
        let out = op(&mut staged)?;

        if let Some(path) = &self.storage_path {
            persist(path, &staged).await?;
        }

        *data = staged;
        Ok(out)
    }

    pub async fn stats(&self) -> DirectoryStats {
        self.data.read().await.stats()
    }
}

/// Write the snapshot atomically (temp file, then rename).
async fn persist(path: &Path, data: &DirectoryData) -> Result<(), DirectoryError> {
    let bytes = serde_json::to_vec(data)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &bytes).await?;
    fs::rename(&temp_path, path).await?;

    debug!("Saved directory snapshot ({} bytes) to {:?}", bytes.len(), path);
    Ok(())
}

async fn load(path: &Path) -> Result<DirectoryData, DirectoryError> {
    if !path.exists() {
        info!("Directory snapshot not found at {:?}, starting fresh", path);
        return Ok(DirectoryData::default());
    }

    let bytes = fs::read(path).await?;
    if bytes.is_empty() {
        warn!("Directory snapshot at {:?} is empty, starting fresh", path);
        return Ok(DirectoryData::default());
    }

    let data: DirectoryData = serde_json::from_slice(&bytes)?;
    if data.version > DATA_VERSION {
        return Err(DirectoryError::Storage(format!(
            "snapshot version {} is newer than supported version {}",
            data.version, DATA_VERSION
        )));
    }

    let stats = data.stats();
    info!(
        "Loaded directory snapshot: {} identities, {} contacts, {} spam reports",
        stats.identities, stats.contacts, stats.spam_reports
    );
    Ok(data)
}
