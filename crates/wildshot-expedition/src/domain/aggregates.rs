//! Aggregate roots for the Expedition context.

use serde::Serialize;
use uuid::Uuid;
use wildshot_core::aggregate::AggregateRoot;
use wildshot_core::clock::Clock;
use wildshot_core::error::DomainError;
use wildshot_core::event::EventMetadata;

use super::countdown::{Countdown, MAX_TIME_LIMIT_SECS};
use super::events::{
    BiomeAdvanced, EndReason, ExpeditionEnded, ExpeditionEvent, ExpeditionEventKind,
    ExpeditionStarted, PhotoScored, SceneRevealed,
};
use super::progression::{Progress, ProgressionRules, SessionState};
use super::scoring::{first_sentence, score_analysis};

/// One scored photo in the discovery log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// Biome the photo was taken in.
    pub biome_index: usize,
    /// Display label for the identified species.
    pub species: String,
    /// First sentence of the analysis.
    pub summary: String,
    /// Points earned.
    pub score: u32,
    /// URL of the enhanced photo.
    pub photo_url: String,
}

/// Result of recording a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoOutcome {
    /// Points earned by the photo.
    pub score: u32,
    /// Progression caused by the photo.
    pub progress: Progress,
}

/// The aggregate root for one player's expedition.
#[derive(Debug)]
pub struct Expedition {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (persisted event count).
    pub(crate) version: i64,
    /// Player name; `None` until started.
    pub(crate) player_name: Option<String>,
    /// Time budget; `None` until started.
    pub(crate) countdown: Option<Countdown>,
    /// Progression rules fixed at start.
    pub(crate) rules: ProgressionRules,
    /// Progression and score.
    pub(crate) progress: SessionState,
    /// Panorama currently shown, if one was generated for this biome.
    pub(crate) scene_url: Option<String>,
    /// Enhanced photo URLs in the order they were taken.
    pub(crate) album: Vec<String>,
    /// Scored photos in the order they were taken.
    pub(crate) discoveries: Vec<Discovery>,
    /// Set once the expedition ends.
    pub(crate) end_reason: Option<EndReason>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ExpeditionEvent>,
}

impl Expedition {
    /// Creates an empty, not yet started expedition.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            player_name: None,
            countdown: None,
            rules: ProgressionRules::default(),
            progress: SessionState::new(),
            scene_url: None,
            album: Vec::new(),
            discoveries: Vec::new(),
            end_reason: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Progression and score snapshot.
    #[must_use]
    pub fn progress(&self) -> SessionState {
        self.progress
    }

    /// Player name, once started.
    #[must_use]
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Whether a `start` event has been raised or applied.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.countdown.is_some()
    }

    /// Starts the expedition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the expedition already started,
    /// the player name is blank, or `time_limit_secs` is outside
    /// `1..=MAX_TIME_LIMIT_SECS`.
    pub fn start(
        &mut self,
        player_name: &str,
        time_limit_secs: u64,
        rules: ProgressionRules,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.is_started() {
            return Err(DomainError::Validation(
                "expedition has already started".to_owned(),
            ));
        }
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(DomainError::Validation(
                "player name must not be blank".to_owned(),
            ));
        }
        if !(1..=MAX_TIME_LIMIT_SECS).contains(&time_limit_secs) {
            return Err(DomainError::Validation(format!(
                "time limit must be between 1 and {MAX_TIME_LIMIT_SECS} seconds, got {time_limit_secs}"
            )));
        }

        self.raise(
            ExpeditionEventKind::ExpeditionStarted(ExpeditionStarted {
                expedition_id: self.id,
                player_name: player_name.to_owned(),
                time_limit_secs,
                biome_count: rules.biome_count,
                selections_per_biome: rules.selections_per_biome,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Index of the biome currently being explored.
    #[must_use]
    pub fn current_biome(&self) -> usize {
        self.progress.current_prompt_index()
    }

    /// Checks that the expedition exists and has not ended.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if not started or already ended.
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if !self.is_started() {
            return Err(DomainError::Validation(
                "expedition has not started".to_owned(),
            ));
        }
        if self.progress.session_ended() {
            return Err(DomainError::Validation("expedition has ended".to_owned()));
        }
        Ok(())
    }

    /// Checks that a photo taken at `clock.now()` can still be scored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the expedition is not active or
    /// its countdown has run out.
    pub fn ensure_accepting_photos(&self, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_active()?;
        if self.countdown.is_some_and(|c| c.is_expired(clock.now())) {
            return Err(DomainError::Validation(
                "expedition time limit has been reached".to_owned(),
            ));
        }
        Ok(())
    }

    /// Records a freshly generated panorama for the current biome.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the expedition is not active.
    pub fn reveal_scene(
        &mut self,
        scene_url: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.raise(
            ExpeditionEventKind::SceneRevealed(SceneRevealed {
                expedition_id: self.id,
                biome_index: self.current_biome(),
                scene_url,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Scores an analyzed photo and applies biome progression. Moving to the
    /// next biome raises `BiomeAdvanced`; finishing the last biome raises
    /// `ExpeditionEnded`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the expedition is not accepting
    /// photos.
    pub fn record_photo(
        &mut self,
        photo_url: String,
        analysis: String,
        species: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<PhotoOutcome, DomainError> {
        self.ensure_accepting_photos(clock)?;

        let score = score_analysis(&analysis);
        let (_, progress) = self.progress.apply_selection(score, &self.rules);

        self.raise(
            ExpeditionEventKind::PhotoScored(PhotoScored {
                expedition_id: self.id,
                biome_index: self.current_biome(),
                photo_url,
                analysis,
                species,
                score,
            }),
            correlation_id,
            clock,
        );

        match progress {
            Progress::AdvancedBiome { from, to } => self.raise(
                ExpeditionEventKind::BiomeAdvanced(BiomeAdvanced {
                    expedition_id: self.id,
                    from_biome: from,
                    to_biome: to,
                }),
                correlation_id,
                clock,
            ),
            Progress::Completed => self.raise(
                ExpeditionEventKind::ExpeditionEnded(ExpeditionEnded {
                    expedition_id: self.id,
                    final_score: self.progress.cumulative_score(),
                    reason: EndReason::Completed,
                }),
                correlation_id,
                clock,
            ),
            Progress::Stayed | Progress::Ignored => {}
        }

        Ok(PhotoOutcome { score, progress })
    }

    /// Ends the expedition because its countdown ran out.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the expedition is not active or
    /// time remains on the countdown.
    pub fn expire(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.ensure_active()?;
        let remaining = self
            .countdown
            .map_or(0, |c| c.remaining_secs(clock.now()));
        if remaining > 0 {
            return Err(DomainError::Validation(format!(
                "expedition countdown still running: {remaining}s left"
            )));
        }

        self.raise(
            ExpeditionEventKind::ExpeditionEnded(ExpeditionEnded {
                expedition_id: self.id,
                final_score: self.progress.cumulative_score(),
                reason: EndReason::TimeExpired,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Wraps `kind` in metadata, folds it into state and queues it for
    /// persistence. The persisted version is left untouched.
    fn raise(&mut self, kind: ExpeditionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = ExpeditionEvent {
            metadata: EventMetadata::for_command(
                kind.event_type(),
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.mutate(&event);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, event: &ExpeditionEvent) {
        match &event.kind {
            ExpeditionEventKind::ExpeditionStarted(payload) => {
                self.player_name = Some(payload.player_name.clone());
                self.countdown = Some(Countdown::new(
                    event.metadata.occurred_at,
                    payload.time_limit_secs,
                ));
                self.rules =
                    ProgressionRules::new(payload.biome_count, payload.selections_per_biome);
            }
            ExpeditionEventKind::SceneRevealed(payload) => {
                self.scene_url = Some(payload.scene_url.clone());
            }
            ExpeditionEventKind::PhotoScored(payload) => {
                self.progress = self.progress.apply_selection(payload.score, &self.rules).0;
                self.album.push(payload.photo_url.clone());
                self.discoveries.push(Discovery {
                    biome_index: payload.biome_index,
                    species: payload.species.clone(),
                    summary: first_sentence(&payload.analysis),
                    score: payload.score,
                    photo_url: payload.photo_url.clone(),
                });
            }
            ExpeditionEventKind::BiomeAdvanced(_) => {
                self.scene_url = None;
            }
            ExpeditionEventKind::ExpeditionEnded(payload) => {
                self.progress = self.progress.end();
                self.end_reason = Some(payload.reason);
            }
        }
    }
}

impl AggregateRoot for Expedition {
    type Event = ExpeditionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(event);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use wildshot_core::event::DomainEvent;
    use wildshot_test_support::FixedClock;

    const BIRD: &str = "A **Toucan** sits in the canopy. Other birds call.";
    const EMPTY_SCENE: &str = "Ferns and moss.";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn started(clock: &FixedClock) -> Expedition {
        let mut expedition = Expedition::new(Uuid::new_v4());
        expedition
            .start("Ada", 180, ProgressionRules::default(), Uuid::new_v4(), clock)
            .unwrap();
        expedition
    }

    fn photograph(expedition: &mut Expedition, analysis: &str, clock: &FixedClock) -> PhotoOutcome {
        expedition
            .record_photo(
                "https://img/photo.jpg".to_owned(),
                analysis.to_owned(),
                "label".to_owned(),
                Uuid::new_v4(),
                clock,
            )
            .unwrap()
    }

    #[test]
    fn test_start_rejects_time_limits_outside_bounds() {
        // Arrange
        let clock = FixedClock(fixed_now());

        for limit in [0, MAX_TIME_LIMIT_SECS + 1, u64::MAX] {
            let mut expedition = Expedition::new(Uuid::new_v4());

            // Act
            let result =
                expedition.start("Ada", limit, ProgressionRules::default(), Uuid::new_v4(), &clock);

            // Assert
            assert!(
                matches!(result, Err(DomainError::Validation(ref msg)) if msg.contains("time limit")),
                "limit {limit}: {result:?}"
            );
            assert!(expedition.uncommitted_events().is_empty());
            assert!(!expedition.is_started());
        }
    }

    #[test]
    fn test_start_accepts_longest_time_limit() {
        let clock = FixedClock(fixed_now());
        let mut expedition = Expedition::new(Uuid::new_v4());

        expedition
            .start("Ada", MAX_TIME_LIMIT_SECS, ProgressionRules::default(), Uuid::new_v4(), &clock)
            .unwrap();

        assert!(expedition.ensure_accepting_photos(&clock.later(3_599)).is_ok());
        assert!(expedition.ensure_accepting_photos(&clock.later(3_600)).is_err());
    }

    #[test]
    fn test_start_produces_expedition_started_event() {
        // Arrange
        let id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let mut expedition = Expedition::new(id);

        // Act
        expedition
            .start("  Ada  ", 120, ProgressionRules::new(3, 2), correlation_id, &clock)
            .unwrap();

        // Assert
        let events = expedition.uncommitted_events();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.event_type(), "expedition.started");

        let meta = event.metadata();
        assert_eq!(meta.aggregate_id, id);
        assert_eq!(meta.sequence_number, 1);
        assert_eq!(meta.correlation_id, correlation_id);
        assert_eq!(meta.causation_id, correlation_id);
        assert_eq!(meta.occurred_at, fixed_now());

        match &event.kind {
            ExpeditionEventKind::ExpeditionStarted(payload) => {
                assert_eq!(payload.expedition_id, id);
                assert_eq!(payload.player_name, "Ada");
                assert_eq!(payload.time_limit_secs, 120);
                assert_eq!(payload.biome_count, 3);
                assert_eq!(payload.selections_per_biome, 2);
            }
            other => panic!("expected ExpeditionStarted, got {other:?}"),
        }
        assert_eq!(expedition.version(), 0);
    }

    #[test]
    fn test_start_rejects_blank_player_name() {
        let clock = FixedClock(fixed_now());
        let mut expedition = Expedition::new(Uuid::new_v4());

        let result = expedition.start("   ", 180, ProgressionRules::default(), Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(expedition.uncommitted_events().is_empty());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);

        let result = expedition.start("Bo", 180, ProgressionRules::default(), Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_first_photo_scores_without_advancing() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);

        // Act
        let outcome = photograph(&mut expedition, BIRD, &clock);

        // Assert
        assert_eq!(outcome.score, 10);
        assert_eq!(outcome.progress, Progress::Stayed);

        let events = expedition.uncommitted_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type(), "expedition.photo_scored");
        assert_eq!(events[1].metadata().sequence_number, 2);
        assert_eq!(expedition.progress().cumulative_score(), 10);
        assert_eq!(expedition.discoveries[0].summary, "A **Toucan** sits in the canopy.");
    }

    #[test]
    fn test_second_photo_advances_biome_and_clears_scene() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);
        expedition
            .reveal_scene("https://img/pano.jpg".to_owned(), Uuid::new_v4(), &clock)
            .unwrap();
        photograph(&mut expedition, BIRD, &clock);

        // Act
        let outcome = photograph(&mut expedition, EMPTY_SCENE, &clock);

        // Assert
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.progress, Progress::AdvancedBiome { from: 0, to: 1 });

        let types: Vec<&str> = expedition
            .uncommitted_events()
            .iter()
            .map(DomainEvent::event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "expedition.started",
                "expedition.scene_revealed",
                "expedition.photo_scored",
                "expedition.photo_scored",
                "expedition.biome_advanced",
            ]
        );
        assert_eq!(expedition.current_biome(), 1);
        assert!(expedition.scene_url.is_none());
        assert_eq!(expedition.album.len(), 2);
    }

    #[test]
    fn test_final_biome_completion_ends_expedition() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);
        for _ in 0..5 {
            photograph(&mut expedition, BIRD, &clock);
        }

        // Act
        let outcome = photograph(&mut expedition, BIRD, &clock);

        // Assert
        assert_eq!(outcome.progress, Progress::Completed);
        let last = expedition.uncommitted_events().last().unwrap();
        match &last.kind {
            ExpeditionEventKind::ExpeditionEnded(payload) => {
                assert_eq!(payload.final_score, 60);
                assert_eq!(payload.reason, EndReason::Completed);
            }
            other => panic!("expected ExpeditionEnded, got {other:?}"),
        }
        assert!(expedition.progress().session_ended());
        assert_eq!(expedition.end_reason, Some(EndReason::Completed));
    }

    #[test]
    fn test_photo_after_end_is_rejected() {
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);
        for _ in 0..6 {
            photograph(&mut expedition, EMPTY_SCENE, &clock);
        }

        let result = expedition.record_photo(
            "u".to_owned(),
            BIRD.to_owned(),
            String::new(),
            Uuid::new_v4(),
            &clock,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_photo_after_countdown_is_rejected() {
        // Arrange
        let start_clock = FixedClock(fixed_now());
        let mut expedition = started(&start_clock);
        let late_clock = FixedClock(fixed_now() + Duration::seconds(181));

        // Act
        let result = expedition.record_photo(
            "u".to_owned(),
            BIRD.to_owned(),
            String::new(),
            Uuid::new_v4(),
            &late_clock,
        );

        // Assert
        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("time limit")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_expire_ends_expedition_after_countdown() {
        // Arrange
        let start_clock = FixedClock(fixed_now());
        let mut expedition = started(&start_clock);
        photograph(&mut expedition, BIRD, &start_clock);
        let late_clock = FixedClock(fixed_now() + Duration::seconds(180));

        // Act
        expedition.expire(Uuid::new_v4(), &late_clock).unwrap();

        // Assert
        let last = expedition.uncommitted_events().last().unwrap();
        match &last.kind {
            ExpeditionEventKind::ExpeditionEnded(payload) => {
                assert_eq!(payload.final_score, 10);
                assert_eq!(payload.reason, EndReason::TimeExpired);
            }
            other => panic!("expected ExpeditionEnded, got {other:?}"),
        }
        assert!(expedition.progress().session_ended());
    }

    #[test]
    fn test_expire_is_rejected_while_time_remains() {
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);

        let result = expedition.expire(Uuid::new_v4(), &FixedClock(fixed_now() + Duration::seconds(30)));

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("150s left")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_expire_twice_is_rejected() {
        let clock = FixedClock(fixed_now());
        let mut expedition = started(&clock);
        let late_clock = FixedClock(fixed_now() + Duration::seconds(600));
        expedition.expire(Uuid::new_v4(), &late_clock).unwrap();

        let result = expedition.expire(Uuid::new_v4(), &late_clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_reveal_scene_requires_started_expedition() {
        let clock = FixedClock(fixed_now());
        let mut expedition = Expedition::new(Uuid::new_v4());

        let result = expedition.reveal_scene("https://img/pano.jpg".to_owned(), Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_apply_replays_state_and_bumps_version() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut original = started(&clock);
        photograph(&mut original, BIRD, &clock);
        photograph(&mut original, BIRD, &clock);
        let events = original.uncommitted_events().to_vec();

        // Act
        let mut replayed = Expedition::new(original.id);
        for event in &events {
            replayed.apply(event);
        }

        // Assert
        assert_eq!(replayed.version(), 4);
        assert!(replayed.uncommitted_events().is_empty());
        assert_eq!(replayed.progress(), original.progress());
        assert_eq!(replayed.player_name(), Some("Ada"));
        assert_eq!(replayed.discoveries, original.discoveries);
        assert_eq!(replayed.next_sequence_number(), 5);
    }
}
