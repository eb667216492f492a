//! PostgreSQL persistence for Wildshot: the domain event store and the
//! archive of finished expedition results.

pub mod pg_event_repository;
pub mod pg_result_archive;

/// Embedded schema migrations from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
