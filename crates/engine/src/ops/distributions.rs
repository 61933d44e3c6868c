use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    DistributionNew, DistributionRecord, EngineError, ResultEngine, distributions,
    util::normalize_text,
};

use super::Engine;

impl Engine {
    /// Persist a distribution record owned by `user_id`.
    pub async fn save_distribution(
        &self,
        user_id: Uuid,
        new: DistributionNew,
    ) -> ResultEngine<DistributionRecord> {
        if new.amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        // Fails with `KeyNotFound` for unknown owners.
        self.user(user_id).await?;

        let record = DistributionRecord {
            id: Uuid::new_v4(),
            user_id,
            amount: new.amount,
            friends: normalize_text(&new.friends),
            spender: normalize_text(&new.spender),
            description: normalize_text(&new.description),
            distribution: new.distribution,
            created_at: Utc::now(),
        };

        distributions::ActiveModel::try_from(&record)?
            .insert(&self.database)
            .await?;

        Ok(record)
    }

    /// All records owned by `user_id`, oldest first.
    pub async fn distributions_for_user(
        &self,
        user_id: Uuid,
    ) -> ResultEngine<Vec<DistributionRecord>> {
        distributions::Entity::find()
            .filter(distributions::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(distributions::Column::CreatedAt)
            .order_by_asc(distributions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(DistributionRecord::try_from)
            .collect()
    }
}
