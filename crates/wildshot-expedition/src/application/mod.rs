//! Application layer for the Expedition context.

pub mod command_handlers;
pub mod query_handlers;
