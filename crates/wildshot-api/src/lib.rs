//! Wildshot API: axum HTTP surface over the expedition context.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
