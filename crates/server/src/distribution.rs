//! Distribution record endpoints.

use api_types::{
    Message,
    distribution::{self as api, DistributionNew, DistributionRecord},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{EngineError, MoneyCents, Payment};
use uuid::Uuid;

use crate::{AuthUser, ServerError, server::ServerState};

/// Convert a wire distribution into the engine's, validating every amount.
pub(crate) fn engine_distribution(
    distribution: api::Distribution,
) -> Result<engine::Distribution, EngineError> {
    distribution
        .into_iter()
        .map(|(friend, ledger)| -> Result<_, EngineError> {
            let ledger = ledger
                .into_iter()
                .map(|(spender, payments)| -> Result<_, EngineError> {
                    let payments = payments
                        .into_iter()
                        .map(|payment| {
                            Payment::new(
                                payment.description,
                                MoneyCents::from_major(payment.amount)?,
                                payment.paid,
                            )
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok((spender, payments))
                })
                .collect::<Result<engine::SpenderLedger, EngineError>>()?;
            Ok((friend, ledger))
        })
        .collect()
}

fn api_distribution(distribution: engine::Distribution) -> api::Distribution {
    distribution
        .into_iter()
        .map(|(friend, ledger)| {
            let ledger = ledger
                .into_iter()
                .map(|(spender, payments)| {
                    let payments = payments
                        .iter()
                        .map(|payment| api::Payment {
                            description: payment.description().to_string(),
                            amount: payment.amount().to_major(),
                            paid: payment.paid(),
                        })
                        .collect();
                    (spender, payments)
                })
                .collect();
            (friend, ledger)
        })
        .collect()
}

/// Handle requests for saving a new distribution record
pub async fn distribution_new(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<DistributionNew>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let owner = payload.user_id.unwrap_or(user.id);
    if owner != user.id {
        return Err(ServerError::Forbidden(
            "cannot save distributions for another user".to_string(),
        ));
    }

    let new = engine::DistributionNew {
        amount: MoneyCents::from_major(payload.amount)?,
        friends: payload.friends,
        spender: payload.spender,
        description: payload.description,
        distribution: engine_distribution(payload.distribution)?,
    };
    let record = state.engine.save_distribution(owner, new).await?;
    tracing::info!(distribution_id = %record.id, "distribution saved");

    Ok((
        StatusCode::CREATED,
        Json(Message::new("Distribution saved successfully")),
    ))
}

/// Handle requests for listing a user's distribution records
pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<DistributionRecord>>, ServerError> {
    if user_id != user.id {
        return Err(ServerError::Forbidden(
            "cannot read distributions of another user".to_string(),
        ));
    }

    let records = state
        .engine
        .distributions_for_user(user_id)
        .await?
        .into_iter()
        .map(|record| DistributionRecord {
            id: record.id,
            user_id: record.user_id,
            amount: record.amount.to_major(),
            friends: record.friends,
            spender: record.spender,
            description: record.description,
            distribution: api_distribution(record.distribution),
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(records))
}
