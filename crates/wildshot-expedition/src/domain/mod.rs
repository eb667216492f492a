//! Domain model for the Expedition context.

pub mod aggregates;
pub mod biome;
pub mod commands;
pub mod countdown;
pub mod events;
pub mod progression;
pub mod prompts;
pub mod score_record;
pub mod scoring;
