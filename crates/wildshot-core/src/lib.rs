//! Wildshot Core: shared domain abstractions.
//!
//! This crate defines the traits and types every Wildshot crate depends on:
//! event sourcing primitives, the clock, domain errors and the ports through
//! which the expedition context reaches external AI services. It contains no
//! infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod collaborators;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
