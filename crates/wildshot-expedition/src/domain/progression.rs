//! Biome progression state machine.
//!
//! ```text
//! Active(i, n)   --select, n + 1 < per_biome-->           Active(i, n + 1)
//! Active(i, n)   --select, n + 1 == per_biome, i < last--> Active(i + 1, 0)
//! Active(last, n)--select, n + 1 == per_biome-->           Ended
//! Ended is terminal.
//! ```

use serde::{Deserialize, Serialize};

use super::scoring::score_analysis;

/// Number of biomes and photos per biome that drive progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRules {
    /// Number of biomes in the expedition. Always at least 1.
    pub biome_count: usize,
    /// Photos taken in a biome before moving on. Always at least 1.
    pub selections_per_biome: u32,
}

impl ProgressionRules {
    /// Default number of photos per biome.
    pub const DEFAULT_SELECTIONS_PER_BIOME: u32 = 2;

    /// Default number of biomes.
    pub const DEFAULT_BIOME_COUNT: usize = 3;

    /// Builds rules, clamping both counts to at least 1.
    #[must_use]
    pub fn new(biome_count: usize, selections_per_biome: u32) -> Self {
        Self {
            biome_count: biome_count.max(1),
            selections_per_biome: selections_per_biome.max(1),
        }
    }

    /// Index of the final biome.
    #[must_use]
    pub fn last_biome_index(&self) -> usize {
        self.biome_count.max(1) - 1
    }
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_BIOME_COUNT,
            Self::DEFAULT_SELECTIONS_PER_BIOME,
        )
    }
}

/// Where an expedition stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Exploring `biome_index` with `selections` photos taken there so far.
    Active {
        /// Current biome.
        biome_index: usize,
        /// Photos taken in the current biome.
        selections: u32,
    },
    /// No further selections are accepted.
    Ended,
}

/// What a selection did to the expedition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Still in the same biome.
    Stayed,
    /// Moved from one biome to the next.
    AdvancedBiome {
        /// Biome that was completed.
        from: usize,
        /// Biome now being explored.
        to: usize,
    },
    /// The final biome was completed.
    Completed,
    /// The expedition had already ended; nothing changed.
    Ignored,
}

/// Immutable snapshot of an expedition's progression and score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    current_prompt_index: usize,
    selections_in_current_biome: u32,
    cumulative_score: u32,
    session_ended: bool,
}

impl SessionState {
    /// Fresh state: first biome, no photos, zero score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the biome being explored (or last explored).
    #[must_use]
    pub fn current_prompt_index(&self) -> usize {
        self.current_prompt_index
    }

    /// Photos taken in the current biome.
    #[must_use]
    pub fn selections_in_current_biome(&self) -> u32 {
        self.selections_in_current_biome
    }

    /// Running total score.
    #[must_use]
    pub fn cumulative_score(&self) -> u32 {
        self.cumulative_score
    }

    /// Whether the expedition has ended.
    #[must_use]
    pub fn session_ended(&self) -> bool {
        self.session_ended
    }

    /// State-machine view of this snapshot.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.session_ended {
            Phase::Ended
        } else {
            Phase::Active {
                biome_index: self.current_prompt_index,
                selections: self.selections_in_current_biome,
            }
        }
    }

    /// Adds `delta` for one completed selection and applies the biome
    /// transition rule. An ended state is returned unchanged.
    #[must_use]
    pub fn apply_selection(self, delta: u32, rules: &ProgressionRules) -> (Self, Progress) {
        if self.session_ended {
            return (self, Progress::Ignored);
        }

        let mut next = Self {
            cumulative_score: self.cumulative_score.saturating_add(delta),
            selections_in_current_biome: self.selections_in_current_biome + 1,
            ..self
        };

        if next.selections_in_current_biome < rules.selections_per_biome.max(1) {
            return (next, Progress::Stayed);
        }

        if self.current_prompt_index < rules.last_biome_index() {
            next.current_prompt_index = self.current_prompt_index + 1;
            next.selections_in_current_biome = 0;
            let progress = Progress::AdvancedBiome {
                from: self.current_prompt_index,
                to: next.current_prompt_index,
            };
            (next, progress)
        } else {
            next.session_ended = true;
            (next, Progress::Completed)
        }
    }

    /// Ends the expedition early (countdown expiry). Idempotent.
    #[must_use]
    pub fn end(self) -> Self {
        Self {
            session_ended: true,
            ..self
        }
    }
}

/// Scores `analysis` and records it as one selection under the default
/// rules (three biomes, two photos each).
#[must_use]
pub fn record_selection(state: SessionState, analysis: &str) -> SessionState {
    record_selection_with(state, analysis, &ProgressionRules::default()).0
}

/// Scores `analysis` and records it as one selection under `rules`.
#[must_use]
pub fn record_selection_with(
    state: SessionState,
    analysis: &str,
    rules: &ProgressionRules,
) -> (SessionState, Progress) {
    state.apply_selection(score_analysis(analysis), rules)
}
