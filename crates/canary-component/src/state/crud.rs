//! Load and save recorded state

use super::db::DbPool;
use anyhow::{Context, Result};
use canary_common::RecordedState;
use chrono::Utc;

/// Load the recorded state of an instance, empty if none was saved
pub async fn load_state(pool: &DbPool, instance: &str) -> Result<RecordedState> {
    let row: Option<String> = sqlx::query_scalar("SELECT state FROM instances WHERE name = ?")
        .bind(instance)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(json) => serde_json::from_str(&json)
            .with_context(|| format!("Corrupt recorded state for instance '{instance}'")),
        None => Ok(RecordedState::default()),
    }
}

/// Insert or replace the recorded state of an instance
pub async fn save_state(pool: &DbPool, instance: &str, state: &RecordedState) -> Result<()> {
    let json = serde_json::to_string(state)?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO instances (name, state, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(name) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
    )
    .bind(instance)
    .bind(&json)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Forget an instance entirely
pub async fn clear_state(pool: &DbPool, instance: &str) -> Result<()> {
    sqlx::query("DELETE FROM instances WHERE name = ?")
        .bind(instance)
        .execute(pool)
        .await?;

    Ok(())
}
