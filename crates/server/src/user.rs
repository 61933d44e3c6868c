//! Registration and login endpoints.

use api_types::{
    Message,
    user::{Credentials, LoginResponse},
};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

/// Create a new user
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.username, &payload.password)
        .await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(Message::new("User registered successfully")),
    ))
}

/// Check credentials and hand out a bearer token
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.username, &payload.password)
        .await?;
    let token = state.tokens.issue(user.id)?;

    Ok(Json(LoginResponse {
        auth: true,
        token,
        user_id: user.id,
    }))
}
