//! HTTP request handlers.

use super::middleware::Caller;
use super::types::{
    AddContactRequest, ContactResponse, HealthResponse, LoginRequest, MarkSpamRequest,
    MessageResponse, NameQuery, PhoneQuery, RegisterRequest, SpamResponse, TokenResponse,
};
use super::AppState;
use crate::error::ApiError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use callerid_directory::{
    self as directory, ContactOutcome, ContactView, DirectoryHit, NewContact, NewIdentity,
    PhoneLookup,
};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.store.stats().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        identities: stats.identities,
        contacts: stats.contacts,
        spam_reports: stats.spam_reports,
        persistent: state.store.is_persistent(),
    })
}

/// Register a new identity.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    let new_identity = NewIdentity {
        username: request.name,
        phone_number: request.phone_number,
        password: request.password,
        email: request.email,
    };

    directory::register(&state.store, new_identity).await?;

    Ok(Json(MessageResponse {
        message: "Registered successfully".to_string(),
    }))
}

/// Log in and receive the identity's token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;
    let token = directory::login(
        &state.store,
        request.username.as_deref(),
        request.password.as_ref(),
    )
    .await?;

    Ok(Json(TokenResponse { token }))
}

/// Add a contact to the caller's address book.
pub async fn add_contact(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Result<Json<AddContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    let Json(request) = payload?;
    let new_contact = NewContact {
        name: request.name,
        phone_number: request.phone_number,
        email: request.email,
    };

    let outcome =
        directory::add_contact(&state.store, caller.id, new_contact, state.contact_dedup).await?;

    let response = match outcome {
        ContactOutcome::Saved(contact) => (
            StatusCode::CREATED,
            Json(ContactResponse {
                message: "Contact saved successfully".to_string(),
                contact: Some(contact),
            }),
        ),
        ContactOutcome::AlreadyExists => (
            StatusCode::OK,
            Json(ContactResponse {
                message: "Contact already exists".to_string(),
                contact: None,
            }),
        ),
    };
    Ok(response)
}

/// List the caller's contacts.
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
) -> Json<Vec<ContactView>> {
    Json(directory::list_contacts(&state.store, caller.id).await)
}

/// Report a phone number as spam.
pub async fn mark_spam(
    State(state): State<AppState>,
    payload: Result<Json<MarkSpamRequest>, JsonRejection>,
) -> Result<Json<SpamResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = directory::mark_spam(&state.store, request.phone_number.as_deref()).await?;

    Ok(Json(SpamResponse {
        message: outcome.message().to_string(),
        outcome,
    }))
}

/// Search the directory by name.
pub async fn search_by_name(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<Vec<DirectoryHit>>, ApiError> {
    let Query(query) = query?;
    let hits = directory::search_by_name(&state.store, query.name.as_deref()).await?;
    Ok(Json(hits))
}

/// Look up a phone number.
pub async fn search_by_phone(
    State(state): State<AppState>,
    query: Result<Query<PhoneQuery>, QueryRejection>,
) -> Result<Json<PhoneLookup>, ApiError> {
    let Query(query) = query?;
    let lookup = directory::search_by_phone(&state.store, query.phone_number.as_deref()).await?;
    Ok(Json(lookup))
}
