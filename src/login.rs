#![cfg(feature = "web")]

use crate::error::{Error, Result};
use crate::store::{Database, USERS_FILE};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User data structure representing a registered application user
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    /// Username (unique identifier for the user)
    pub username: String,

    /// Argon2 hash of the user's password
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Credential data for registration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserCredentials {
    #[serde(default)]
    pub username: String,

    /// Password in plaintext (only transmitted, never stored)
    #[serde(default)]
    pub password: String,
}

/// Get all registered users, keyed by username
pub fn get_users(db: &Database) -> Result<HashMap<String, User>> {
    db.read(USERS_FILE)
}

/// Register a new user
///
/// Runs Argon2 hashing; async callers should move it off the runtime with
/// `tokio::task::spawn_blocking`.
///
/// # Errors
/// * `Error::Validation` if a field is empty or the username is taken
pub fn register_user(db: &Database, username: &str, password: &str) -> Result<User> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::Validation(
            "Username and password are required".to_string(),
        ));
    }

    // hashing is slow, keep it outside the store lock
    let password_hash = hash_password(password)?;

    let _guard = db.lock();
    let mut users = get_users(db)?;
    if users.contains_key(username) {
        return Err(Error::Validation("Username already exists".to_string()));
    }

    let user = User {
        username: username.to_string(),
        password_hash,
        created_at: Utc::now(),
    };
    users.insert(username.to_string(), user.clone());
    db.write(USERS_FILE, &users)?;

    info!("registered user {}", username);
    Ok(user)
}

/// Check a username/password pair against the user database
///
/// Unknown users and wrong passwords both return `Ok(false)`.
pub fn verify_user(db: &Database, username: &str, password: &str) -> Result<bool> {
    let users = get_users(db)?;
    match users.get(username) {
        Some(user) => verify_password(password, &user.password_hash),
        None => Ok(false),
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| Error::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| Error::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Split an `Authorization: Basic <base64(user:pass)>` header value
///
/// Returns `None` for any other scheme or a malformed payload.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Build the header value clients send for Basic authentication
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// Resolve an `Authorization` header to the authenticated username
///
/// Blocking, like [`register_user`].
///
/// # Errors
/// * `Error::Unauthorized` if the header is missing, malformed or wrong
pub fn authenticate(db: &Database, header: Option<&str>) -> Result<String> {
    let (username, password) = header
        .and_then(parse_basic_auth)
        .ok_or_else(|| Error::Unauthorized("Unauthorized Access".to_string()))?;

    if verify_user(db, &username, &password)? {
        Ok(username)
    } else {
        warn!("failed login for {}", username);
        Err(Error::Unauthorized("Unauthorized Access".to_string()))
    }
}
