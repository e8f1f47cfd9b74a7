//! Authentication extractors and the admin gate.
//!
//! The logged-in user is a small serialized struct in the session, not a
//! database row; handlers that need fresh data re-fetch by id.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use homegrid_core::{UserId, UserRole};

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::models::User;

/// Session key for the current user.
pub const CURRENT_USER_KEY: &str = "current_user";

/// Header carrying the shared admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// The logged-in user as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Extractor that requires a logged-in user.
///
/// Rejects with `401 Unauthorized` when there is no session user; this is a
/// JSON API, so there is no login redirect.
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::Unauthorized("login required".to_owned()).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection)?;

        let user: CurrentUser = session
            .get(CURRENT_USER_KEY)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike [`RequireAuth`], this does not reject when nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(CURRENT_USER_KEY)
                .await
                .ok()
                .flatten(),
            None => None,
        };
        Ok(Self(user))
    }
}

/// Authorize an admin request.
///
/// Requires both an admin session and the shared `x-admin-key` header; the
/// session is checked first, then the key in constant time.
///
/// # Errors
///
/// `Unauthorized` when the session or key is missing or the key is wrong,
/// `Forbidden` when a user is logged in but not an admin.
pub fn authorize_admin(
    config: &StorefrontConfig,
    headers: &HeaderMap,
    user: Option<&CurrentUser>,
) -> Result<(), AppError> {
    match user {
        Some(user) if user.role == UserRole::Admin => {}
        Some(_) => return Err(AppError::Forbidden("admin role required".to_owned())),
        None => {
            return Err(AppError::Unauthorized(
                "admin credentials required".to_owned(),
            ));
        }
    }

    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("admin key required".to_owned()))?;
    if !constant_time_eq(provided, config.admin_api_key.expose_secret()) {
        return Err(AppError::Unauthorized("invalid admin key".to_owned()));
    }
    Ok(())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Set the current user in the session after login or registration.
///
/// Cycles the session id to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session backend fails.
pub async fn set_current_user(session: &Session, user: &User) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    session
        .insert(CURRENT_USER_KEY, CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    crate::error::set_sentry_user(&user.id, Some(&user.email));
    Ok(())
}

/// Clear the current user from the session on logout.
///
/// # Errors
///
/// Returns an error if the session backend fails.
pub async fn clear_current_user(session: &Session) -> Result<(), AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    crate::error::clear_sentry_user();
    Ok(())
}
