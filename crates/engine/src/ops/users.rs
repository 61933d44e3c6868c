use chrono::Utc;
use sea_orm::{QueryFilter, SqlErr, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, users,
    util::normalize_username,
};

use super::Engine;

impl Engine {
    /// Register a new user.
    ///
    /// The username is trimmed and NFC-normalized before the uniqueness
    /// check; the password is stored as an Argon2id hash.
    pub async fn register_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_username(username)?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        if self.user_by_username(&username).await?.is_some() {
            return Err(EngineError::ExistingKey(username));
        }

        let user = User {
            id: Uuid::new_v4(),
            username,
            created_at: Utc::now(),
        };
        let password_hash = crate::password::hash_password_blocking(password.to_string()).await?;

        // Two concurrent registrations can both pass the lookup above; the
        // unique index decides.
        match user.active_model(password_hash).insert(&self.database).await {
            Ok(_) => Ok(user),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(EngineError::ExistingKey(user.username))
                }
                _ => Err(err.into()),
            },
        }
    }

    /// Check a username/password pair and return the matching user.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = normalize_username(username)?;
        let model = self
            .user_by_username(&username)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User".to_string()))?;

        let matches =
            crate::password::verify_password_blocking(password.to_string(), model.password.clone())
                .await?;
        if !matches {
            return Err(EngineError::InvalidCredentials(
                "Invalid password".to_string(),
            ));
        }

        User::try_from(model)
    }

    /// Look a user up by id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User".to_string()))
            .and_then(User::try_from)
    }

    async fn user_by_username(&self, username: &str) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?)
    }
}
