//! Distribution records.
//!
//! A record is the saved outcome of splitting one expense: the headline
//! fields typed in by the user plus the full per-friend [`Distribution`],
//! kept as JSON text so spender and friend order survive the round trip.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Distribution, EngineError, MoneyCents, util::parse_uuid};

/// Input for [`Engine::save_distribution`](crate::Engine::save_distribution).
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionNew {
    pub amount: MoneyCents,
    pub friends: String,
    pub spender: String,
    pub description: String,
    pub distribution: Distribution,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: MoneyCents,
    pub friends: String,
    pub spender: String,
    pub description: String,
    pub distribution: Distribution,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "distributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub friends: String,
    pub spender: String,
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub distribution: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&DistributionRecord> for ActiveModel {
    type Error = EngineError;

    fn try_from(record: &DistributionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(record.id.to_string()),
            user_id: ActiveValue::Set(record.user_id.to_string()),
            amount_minor: ActiveValue::Set(record.amount.cents()),
            friends: ActiveValue::Set(record.friends.clone()),
            spender: ActiveValue::Set(record.spender.clone()),
            description: ActiveValue::Set(record.description.clone()),
            distribution: ActiveValue::Set(serde_json::to_string(&record.distribution)?),
            created_at: ActiveValue::Set(record.created_at),
        })
    }
}

impl TryFrom<Model> for DistributionRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "distribution")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            amount: MoneyCents::new(model.amount_minor),
            friends: model.friends,
            spender: model.spender,
            description: model.description,
            distribution: serde_json::from_str(&model.distribution)?,
            created_at: model.created_at,
        })
    }
}
