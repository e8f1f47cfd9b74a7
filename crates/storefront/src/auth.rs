//! Authentication service.
//!
//! Email/password registration and login over the store, with Argon2id
//! password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use homegrid_core::UserRole;

use crate::models::User;
use crate::store::{Store, StoreError};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Register a new user with email and password.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` if the email format is invalid,
/// `AuthError::WeakPassword` if the password doesn't meet requirements, and
/// `AuthError::UserAlreadyExists` if the email is already registered.
pub async fn register<S: Store>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let email = normalize_email(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    store
        .create_user(&email, &password_hash, UserRole::Customer)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Store(other),
        })
}

/// Login with email and password.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
pub async fn login<S: Store>(store: &S, email: &str, password: &str) -> Result<User, AuthError> {
    let email = normalize_email(email)?;
    let user = store
        .user_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    verify_password(password, &user.password_hash)?;
    Ok(user)
}

/// Lowercase and minimally validate an email address.
fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail(raw.to_owned()))
    }
}

/// Validate that a password meets minimum requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// Public for the CLI's admin-account provisioning; request handlers go
/// through [`register`] instead.
///
/// # Errors
///
/// Returns [`AuthError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
