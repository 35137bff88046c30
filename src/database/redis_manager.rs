use std::sync::Arc;
use anyhow::{Context, Result};
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::environment::EnvironmentVariables;

/// What a login stores under `session:<token>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
}

/// Score kept between a quiz attempt and the results page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone)]
pub struct RedisService {
    client: Client,
    session_ttl_seconds: u64,
}

impl RedisService {
    pub fn new(env: Arc<EnvironmentVariables>) -> Result<Self> {
        let client = Client::open(env.redis_url.as_ref())
            .context("Failed to create Redis client")?;
        Ok(Self {
            client,
            session_ttl_seconds: env.session_ttl_seconds,
        })
    }

    pub async fn initialize(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;

        // Simple ping to verify connection
        let _: () = redis::cmd("PING").query_async(&mut conn).await
            .context("Failed to ping Redis")?;

        info!("Redis connection established successfully");
        Ok(())
    }

    pub async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
            .context("Failed to get Redis multiplexed connection")
    }

    pub async fn shutdown(&self) {
        // Multiplexed connections close when dropped
        info!("Redis service shutdown (noop)");
    }

    /// Creates a session and returns its bearer token
    pub async fn create_session(&self, session: &SessionData) -> Result<String> {
        let token: String = Uuid::new_v4().simple().to_string();
        let mut conn = self.get_connection().await?;

        let payload: String = serde_json::to_string(session)?;
        let _: () = conn
            .set_ex(session_key(&token), payload, self.session_ttl_seconds)
            .await
            .context("Failed to store session in Redis")?;

        Ok(token)
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<SessionData>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn
            .get(session_key(token))
            .await
            .context("Failed to read session from Redis")?;

        raw.map(|json| serde_json::from_str(&json).context("Corrupt session payload"))
            .transpose()
    }

    /// Removes the session and anything stored against it
    pub async fn delete_session(&self, token: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let _: () = conn
            .del(session_key(token))
            .await
            .context("Failed to delete session from Redis")?;
        Ok(())
    }

    pub async fn store_quiz_result(&self, token: &str, quiz_id: i64, result: QuizResult) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let payload: String = serde_json::to_string(&result)?;
        let _: () = conn
            .set_ex(quiz_result_key(token, quiz_id), payload, self.session_ttl_seconds)
            .await
            .context("Failed to store quiz result")?;
        Ok(())
    }

    /// Reads and removes the stored result, so results are shown once per attempt
    pub async fn take_quiz_result(&self, token: &str, quiz_id: i64) -> Result<Option<QuizResult>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = redis::cmd("GETDEL")
            .arg(quiz_result_key(token, quiz_id))
            .query_async(&mut conn)
            .await
            .context("Failed to read quiz result")?;

        raw.map(|json| serde_json::from_str(&json).context("Corrupt quiz result payload"))
            .transpose()
    }
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

fn quiz_result_key(token: &str, quiz_id: i64) -> String {
    format!("quiz_result:{}:{}", token, quiz_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(session_key("abc"), "session:abc");
        assert_eq!(quiz_result_key("abc", 7), "quiz_result:abc:7");
    }

    #[test]
    fn session_payload_round_trips_through_json() {
        let session = SessionData { user_id: 3, username: "amina".into() };
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, r#"{"user_id":3,"username":"amina"}"#);
    }
}
