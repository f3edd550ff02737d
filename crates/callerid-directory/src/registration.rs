//! Identity registration and credential authentication.

use crate::error::DirectoryError;
use crate::store::DirectoryStore;
use crate::types::{AuthToken, Credential, Identity, IdentityProfile};
use crate::validate::{self, MAX_USERNAME_LEN};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

/// Random bytes per token; hex-encoded to 40 characters.
const TOKEN_BYTES: usize = 20;

/// Registration input. Every field is optional so that missing values are
/// reported as validation errors rather than decode failures.
#[derive(Debug, Default)]
pub struct NewIdentity {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<SecretString>,
    pub email: Option<String>,
}

/// Register a new identity.
///
/// Writes one credential and one identity, or nothing. The phone number must
/// not belong to another identity.
#[instrument(skip_all, fields(username = ?request.username))]
pub async fn register(
    store: &DirectoryStore,
    request: NewIdentity,
) -> Result<IdentityProfile, DirectoryError> {
    let username = validate::required("name", request.username.as_deref())?;
    let username = validate::max_len("name", username, MAX_USERNAME_LEN)?;
    let phone_number = validate::phone_number(request.phone_number.as_deref())?;
    let password = required_password(request.password.as_ref())?;
    let email = validate::email(request.email.as_deref())?;

    // Skip the hashing work for the common conflict
    if store
        .read(|data| data.identity_by_phone(&phone_number).is_some())
        .await
    {
        warn!(phone_number = %phone_number, "Registration with existing phone number");
        return Err(DirectoryError::DuplicatePhoneNumber(phone_number));
    }

    let password_hash = hash_password(password)?;

    let profile = store
        .transact(|data| {
            let identity_id = data.insert_identity(username, &phone_number, email)?;
            data.insert_credential(Credential {
                identity_id,
                username: username.to_string(),
                password_hash,
            })?;

            // Numbers already reported, on the ledger or on a contact, start out flagged
            let flagged = data.global_spam(&phone_number).is_some()
                || data.contacts_by_phone(&phone_number).any(|c| c.spam);
            let identity = data
                .identity_by_phone_mut(&phone_number)
                .ok_or_else(|| DirectoryError::Storage("identity vanished".into()))?;
            identity.spam = flagged;
            Ok(IdentityProfile::from(&*identity))
        })
        .await?;

    info!(phone_number = %profile.phone_number, spam = profile.spam, "Identity registered");
    Ok(profile)
}

/// Authenticate with username and password, returning the identity's token.
///
/// The first successful login issues a token; later logins return the same one.
#[instrument(skip(store, password))]
pub async fn login(
    store: &DirectoryStore,
    username: Option<&str>,
    password: Option<&SecretString>,
) -> Result<String, DirectoryError> {
    let username = validate::required("username", username)?;
    let password = required_password(password)?;

    let credential = store
        .read(|data| data.credential_by_username(username).cloned())
        .await;
    let Some(credential) = credential else {
        warn!("Login for unknown username");
        return Err(DirectoryError::Unauthorized);
    };

    if !verify_password(password, &credential.password_hash)? {
        warn!("Login with wrong password");
        return Err(DirectoryError::Unauthorized);
    }

    let identity_id = credential.identity_id;
    let existing = store
        .read(|data| data.token_for(identity_id).map(|t| t.key.clone()))
        .await;
    if let Some(key) = existing {
        debug!(%identity_id, "Reusing existing token");
        return Ok(key);
    }

    let key = store
        .transact(|data| {
            if let Some(token) = data.token_for(identity_id) {
                return Ok(token.key.clone());
            }
            let token = AuthToken {
                key: generate_token_key(),
                identity_id,
                created_at: Utc::now(),
            };
            let key = token.key.clone();
            data.insert_token(token)?;
            Ok(key)
        })
        .await?;

    info!(%identity_id, "Token issued");
    Ok(key)
}

/// Resolve a token to the identity it was issued to.
pub async fn authenticate_token(
    store: &DirectoryStore,
    key: &str,
) -> Result<Identity, DirectoryError> {
    store
        .read(|data| {
            data.token(key)
                .and_then(|t| data.identity(t.identity_id))
                .cloned()
        })
        .await
        .ok_or(DirectoryError::Unauthorized)
}

fn required_password(password: Option<&SecretString>) -> Result<&str, DirectoryError> {
    password
        .map(|p| p.expose_secret().as_str())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| DirectoryError::validation("password is required"))
}

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, DirectoryError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored PHC string.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, DirectoryError> {
    let parsed = PasswordHash::new(password_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
