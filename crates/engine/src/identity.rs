//! Identity types: signed-in users, bearer sessions and auth-state events.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, users, util::parse_uuid};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<users::Model> for User {
    type Error = EngineError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            email: model.email,
            created_at: model.created_at,
        })
    }
}

/// A signed-in user and the bearer token identifying the login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Published on every sign-in, sign-up and sign-out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut(User),
}

impl AuthEvent {
    pub fn user(&self) -> &User {
        match self {
            Self::SignedIn(user) | Self::SignedOut(user) => user,
        }
    }
}

pub(crate) fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Fresh random salt.
pub(crate) fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted SHA-256 digest, hex encoded.
pub(crate) fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Opaque bearer token built from two random UUIDs.
pub(crate) fn new_token() -> String {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}
