//! Domain events for the Expedition context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wildshot_core::event::{DomainEvent, EventMetadata};

/// Emitted when a player sets out on an expedition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpeditionStarted {
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// Name the final score is archived under.
    pub player_name: String,
    /// Countdown length in seconds.
    pub time_limit_secs: u64,
    /// Number of biomes in the catalog at start time.
    pub biome_count: usize,
    /// Photos required per biome.
    pub selections_per_biome: u32,
}

/// Emitted when a new panorama is generated for the current biome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRevealed {
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// Biome the scene belongs to.
    pub biome_index: usize,
    /// URL of the panorama.
    pub scene_url: String,
}

/// Emitted when a photo has been enhanced, analyzed and scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoScored {
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// Biome the photo was taken in.
    pub biome_index: usize,
    /// URL of the enhanced photo.
    pub photo_url: String,
    /// Raw vision analysis.
    pub analysis: String,
    /// Display label for the identified species.
    pub species: String,
    /// Points earned.
    pub score: u32,
}

/// Emitted when the player moves on to the next biome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeAdvanced {
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// Biome that was completed.
    pub from_biome: usize,
    /// Biome now being explored.
    pub to_biome: usize,
}

/// Why an expedition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The final biome was fully photographed.
    Completed,
    /// The countdown ran out.
    TimeExpired,
}

/// Emitted exactly once, when an expedition ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpeditionEnded {
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// Score at the moment the expedition ended.
    pub final_score: u32,
    /// Why it ended.
    pub reason: EndReason,
}

/// Event type identifier for [`ExpeditionStarted`].
pub const EXPEDITION_STARTED_EVENT_TYPE: &str = "expedition.started";

/// Event type identifier for [`SceneRevealed`].
pub const SCENE_REVEALED_EVENT_TYPE: &str = "expedition.scene_revealed";

/// Event type identifier for [`PhotoScored`].
pub const PHOTO_SCORED_EVENT_TYPE: &str = "expedition.photo_scored";

/// Event type identifier for [`BiomeAdvanced`].
pub const BIOME_ADVANCED_EVENT_TYPE: &str = "expedition.biome_advanced";

/// Event type identifier for [`ExpeditionEnded`].
pub const EXPEDITION_ENDED_EVENT_TYPE: &str = "expedition.ended";

/// Event payload variants for the Expedition context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpeditionEventKind {
    /// An expedition has started.
    ExpeditionStarted(ExpeditionStarted),
    /// A panorama has been revealed.
    SceneRevealed(SceneRevealed),
    /// A photo has been scored.
    PhotoScored(PhotoScored),
    /// The player moved to the next biome.
    BiomeAdvanced(BiomeAdvanced),
    /// The expedition has ended.
    ExpeditionEnded(ExpeditionEnded),
}

impl ExpeditionEventKind {
    /// Event type identifier for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ExpeditionStarted(_) => EXPEDITION_STARTED_EVENT_TYPE,
            Self::SceneRevealed(_) => SCENE_REVEALED_EVENT_TYPE,
            Self::PhotoScored(_) => PHOTO_SCORED_EVENT_TYPE,
            Self::BiomeAdvanced(_) => BIOME_ADVANCED_EVENT_TYPE,
            Self::ExpeditionEnded(_) => EXPEDITION_ENDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Expedition context.
#[derive(Debug, Clone)]
pub struct ExpeditionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ExpeditionEventKind,
}

impl DomainEvent for ExpeditionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ExpeditionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
