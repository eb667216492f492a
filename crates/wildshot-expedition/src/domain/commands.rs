//! Commands for the Expedition context.

use uuid::Uuid;
use wildshot_core::command::Command;

/// Command to start a new expedition.
#[derive(Debug, Clone)]
pub struct StartExpedition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Player the final score is recorded for.
    pub player_name: String,
    /// Countdown length in seconds.
    pub time_limit_secs: u64,
}

impl Command for StartExpedition {
    fn command_type(&self) -> &'static str {
        "expedition.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to generate a fresh panorama for the current biome.
#[derive(Debug, Clone)]
pub struct RevealScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The expedition identifier.
    pub expedition_id: Uuid,
}

impl Command for RevealScene {
    fn command_type(&self) -> &'static str {
        "expedition.reveal_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to photograph a region of the current panorama.
#[derive(Debug, Clone)]
pub struct PhotographSubject {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// URL (or data URL) of the cropped region the player selected.
    pub image_url: String,
}

impl Command for PhotographSubject {
    fn command_type(&self) -> &'static str {
        "expedition.photograph_subject"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to end an expedition whose countdown has run out.
#[derive(Debug, Clone)]
pub struct ExpireExpedition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The expedition identifier.
    pub expedition_id: Uuid,
}

impl Command for ExpireExpedition {
    fn command_type(&self) -> &'static str {
        "expedition.expire"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
