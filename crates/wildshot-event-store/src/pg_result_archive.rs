//! `PostgreSQL` implementation of the `ResultArchive` port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use wildshot_core::collaborators::ResultArchive;
use wildshot_core::error::DomainError;

/// One archived expedition result.
#[derive(Debug, Clone, FromRow)]
pub struct ArchivedResult {
    /// Row identifier.
    pub result_id: Uuid,
    /// Player the score belongs to.
    pub player_name: String,
    /// Final score.
    pub final_score: i32,
    /// When the result was archived.
    pub recorded_at: DateTime<Utc>,
}

/// Stores final expedition scores in `expedition_results`.
#[derive(Debug, Clone)]
pub struct PgResultArchive {
    pool: PgPool,
}

impl PgResultArchive {
    /// Creates a new `PgResultArchive`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Highest scores first, ties broken by who got there first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the query fails.
    pub async fn top_results(&self, limit: i64) -> Result<Vec<ArchivedResult>, DomainError> {
        sqlx::query_as::<_, ArchivedResult>(
            r"
            SELECT result_id, player_name, final_score, recorded_at
            FROM expedition_results
            ORDER BY final_score DESC, recorded_at ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("result archive: {e}")))
    }
}

#[async_trait]
impl ResultArchive for PgResultArchive {
    async fn persist_result(&self, player_name: &str, final_score: u32) -> Result<(), DomainError> {
        let score = i32::try_from(final_score).unwrap_or(i32::MAX);
        sqlx::query(
            r"
            INSERT INTO expedition_results (result_id, player_name, final_score)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(player_name)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("result archive: {e}")))?;

        info!(player_name, final_score, "archived expedition result");
        Ok(())
    }
}
