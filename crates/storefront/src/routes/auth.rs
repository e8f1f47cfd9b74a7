//! Session auth route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::ai::TextGenerator;
use crate::auth;
use crate::error::Result;
use crate::gateway::PaymentGateway;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::User;
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn user_body(user: &User) -> serde_json::Value {
    json!({
        "user": {
            "id": user.id,
            "email": user.email,
            "role": user.role,
        }
    })
}

/// Create an account and open a session for it.
pub async fn register<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<serde_json::Value>)>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let user = auth::register(state.store(), &body.email, &body.password).await?;
    set_current_user(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(user_body(&user))))
}

/// Verify credentials and open a session.
pub async fn login<S, G, T>(
    State(state): State<AppState<S, G, T>>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<Json<serde_json::Value>>
where
    S: Store,
    G: PaymentGateway,
    T: TextGenerator,
{
    let user = auth::login(state.store(), &body.email, &body.password).await?;
    set_current_user(&session, &user).await?;
    Ok(Json(user_body(&user)))
}

/// Close the current session. Succeeds even when nobody is logged in.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
