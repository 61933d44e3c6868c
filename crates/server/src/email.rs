//! Report delivery endpoint.

use api_types::{Message, distribution::SendDistributionEmail};
use axum::{Extension, Json, extract::State};
use mailer::DispatchError;

use crate::{AuthUser, ServerError, distribution::engine_distribution, server::ServerState};

/// Email every listed friend their distribution report
pub async fn send_distribution_email(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<SendDistributionEmail>,
) -> Result<Json<Message>, ServerError> {
    // Absent and empty inputs are both "missing", and are reported before any
    // amount is validated.
    let (Some(friends), Some(emails), Some(distribution)) = (
        payload.friends.filter(|friends| !friends.is_empty()),
        payload.friend_emails.filter(|emails| !emails.is_empty()),
        payload.distribution.filter(|distribution| !distribution.is_empty()),
    ) else {
        return Err(DispatchError::MissingData.into());
    };

    let distribution = engine_distribution(distribution)?;
    let report = state
        .dispatcher
        .dispatch(&friends, &emails, &distribution)
        .await?;
    tracing::info!(user_id = %user.id, delivered = report.delivered, "distribution emails sent");

    Ok(Json(Message::new("Emails sent successfully.")))
}
