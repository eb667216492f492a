//! Wildshot: Expedition bounded context.
//!
//! Responsible for turning AI species analysis into points, moving a player
//! through the configured biomes, the expedition countdown, and the photo
//! album and discovery log that accumulate along the way.

pub mod application;
pub mod domain;
