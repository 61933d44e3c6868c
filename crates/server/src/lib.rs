use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use mailer::DispatchError;

use serde::Serialize;
pub use auth::{AuthUser, Claims, TokenKeys};
pub use server::{ServerState, router, run_with_listener};

mod auth;
mod distribution;
mod email;
mod server;
mod user;

pub mod types {
    pub mod user {
        pub use api_types::user::{Credentials, LoginResponse};
    }

    pub mod distribution {
        pub use api_types::distribution::{
            Distribution, DistributionNew, DistributionRecord, Payment, SendDistributionEmail,
            SpenderLedger,
        };
    }

    pub use api_types::Message;
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Dispatch(DispatchError),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
        EngineError::InvalidInput(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::PasswordHash(_)
        | EngineError::Serialization(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(_) | EngineError::Serialization(_) | EngineError::PasswordHash(_) => {
            tracing::error!("engine error: {err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn response_for_dispatch_error(err: DispatchError) -> (StatusCode, String) {
    match err {
        DispatchError::MissingData => (StatusCode::BAD_REQUEST, err.to_string()),
        DispatchError::Delivery { .. } => {
            tracing::error!("failed to send emails: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send emails.".to_string(),
            )
        }
        DispatchError::Config(_) => {
            tracing::error!("{err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Dispatch(err) => response_for_dispatch_error(err),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, err),
            ServerError::Internal(err) => {
                tracing::error!("{err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<DispatchError> for ServerError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}
