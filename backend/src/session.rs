use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

pub const SESSION_USER_ID_KEY: &str = "qb:user:id";

/// Typed wrapper around the signed-in user's id in the session store, so
/// handlers never deal with raw session keys.
#[derive(Deserialize, Serialize, Debug)]
pub struct SessionUserId(pub i64);

impl SessionUserId {
    pub async fn insert(session: &Session, user_id: i64) -> Result<(), AppError> {
        session
            .insert(SESSION_USER_ID_KEY, SessionUserId(user_id))
            .await?;

        Ok(())
    }

    pub async fn get(session: &Session) -> Result<Option<i64>, AppError> {
        Ok(session
            .get::<SessionUserId>(SESSION_USER_ID_KEY)
            .await?
            .map(|SessionUserId(id)| id))
    }
}
