//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use wildshot_core::error::DomainError;
use wildshot_core::repository::{EventRepository, StoredEvent};

const SELECT_EVENTS: &str = r"
SELECT event_id, aggregate_id, event_type, payload, sequence_number,
       correlation_id, causation_id, occurred_at
FROM domain_events
WHERE aggregate_id = $1
ORDER BY sequence_number ASC
";

const SELECT_STREAM_HEAD: &str = r"
SELECT COALESCE(MAX(sequence_number), 0)
FROM domain_events
WHERE aggregate_id = $1
";

const INSERT_EVENT: &str = r"
INSERT INTO domain_events
    (event_id, aggregate_id, event_type, payload, sequence_number,
     correlation_id, causation_id, occurred_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
";

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(e: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("event store: {e}"))
}

fn row_to_event(row: &PgRow) -> Result<StoredEvent, sqlx::Error> {
    Ok(StoredEvent {
        event_id: row.try_get("event_id")?,
        aggregate_id: row.try_get("aggregate_id")?,
        event_type: row.try_get("event_type")?,
        payload: row.try_get("payload")?,
        sequence_number: row.try_get("sequence_number")?,
        correlation_id: row.try_get("correlation_id")?,
        causation_id: row.try_get("causation_id")?,
        occurred_at: row.try_get("occurred_at")?,
    })
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query(SELECT_EVENTS)
            .bind(aggregate_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| infrastructure(&e))?;

        rows.iter()
            .map(row_to_event)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| infrastructure(&e))
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        let actual: i64 = sqlx::query_scalar(SELECT_STREAM_HEAD)
            .bind(aggregate_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| infrastructure(&e))?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            sqlx::query(INSERT_EVENT)
                .bind(event.event_id)
                .bind(event.aggregate_id)
                .bind(&event.event_type)
                .bind(&event.payload)
                .bind(event.sequence_number)
                .bind(event.correlation_id)
                .bind(event.causation_id)
                .bind(event.occurred_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| match &e {
                    // A concurrent writer committed the same sequence number
                    // between our head check and this insert.
                    sqlx::Error::Database(db) if db.is_unique_violation() => {
                        DomainError::ConcurrencyConflict {
                            aggregate_id,
                            expected: expected_version,
                            actual: event.sequence_number,
                        }
                    }
                    _ => infrastructure(&e),
                })?;
        }

        tx.commit().await.map_err(|e| infrastructure(&e))?;

        debug!(
            %aggregate_id,
            expected_version,
            appended = events.len(),
            "appended domain events"
        );
        Ok(())
    }
}
