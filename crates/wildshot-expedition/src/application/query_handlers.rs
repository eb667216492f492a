//! Query handlers for the Expedition context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use serde::Serialize;
use uuid::Uuid;
use wildshot_core::clock::Clock;
use wildshot_core::error::DomainError;
use wildshot_core::repository::EventRepository;

use crate::application::command_handlers;
use crate::domain::aggregates::Discovery;
use crate::domain::biome::BiomeCatalog;
use crate::domain::events::EndReason;

/// Read-only view of an expedition.
#[derive(Debug, Serialize)]
pub struct ExpeditionView {
    /// The expedition identifier.
    pub expedition_id: Uuid,
    /// Player the expedition belongs to.
    pub player_name: Option<String>,
    /// Index of the current (or final) biome.
    pub biome_index: usize,
    /// Display name of the current biome, if still in the catalog.
    pub biome_name: Option<String>,
    /// Track to play for the current biome.
    pub soundtrack: Option<String>,
    /// Photos taken in the current biome.
    pub selections_in_biome: u32,
    /// Running score.
    pub score: u32,
    /// Whether the expedition has ended.
    pub ended: bool,
    /// Why it ended, once it has.
    pub end_reason: Option<EndReason>,
    /// Seconds left on the countdown at query time.
    pub seconds_remaining: u64,
    /// Current panorama, if one was generated for this biome.
    pub scene_url: Option<String>,
    /// Enhanced photo URLs.
    pub album: Vec<String>,
    /// Scored photos.
    pub discoveries: Vec<Discovery>,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves an expedition by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_expedition_by_id(
    expedition_id: Uuid,
    catalog: &BiomeCatalog,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<ExpeditionView, DomainError> {
    let stored_events = repo.load_events(expedition_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(expedition_id));
    }
    let expedition = command_handlers::reconstitute(expedition_id, &stored_events)?;

    let progress = expedition.progress;
    let biome = catalog.get(progress.current_prompt_index());
    let seconds_remaining = if progress.session_ended() {
        0
    } else {
        expedition
            .countdown
            .map_or(0, |c| c.remaining_secs(clock.now()))
    };

    Ok(ExpeditionView {
        expedition_id,
        player_name: expedition.player_name.clone(),
        biome_index: progress.current_prompt_index(),
        biome_name: biome.map(|b| b.name.clone()),
        soundtrack: biome.map(|b| b.soundtrack.clone()),
        selections_in_biome: progress.selections_in_current_biome(),
        score: progress.cumulative_score(),
        ended: progress.session_ended(),
        end_reason: expedition.end_reason,
        seconds_remaining,
        scene_url: expedition.scene_url.clone(),
        album: expedition.album.clone(),
        discoveries: expedition.discoveries.clone(),
        version: expedition.version,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;
    use wildshot_core::error::DomainError;
    use wildshot_core::repository::StoredEvent;

    use crate::application::query_handlers::get_expedition_by_id;
    use crate::domain::biome::BiomeCatalog;
    use crate::domain::events::{
        EndReason, ExpeditionEnded, ExpeditionEventKind, ExpeditionStarted, PhotoScored,
    };
    use wildshot_test_support::{EmptyEventRepository, FixedClock, RecordingEventRepository};

    fn stored(aggregate_id: Uuid, sequence_number: i64, kind: &ExpeditionEventKind) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id,
            event_type: kind.event_type().to_owned(),
            payload: serde_json::to_value(kind).unwrap(),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    fn started(expedition_id: Uuid) -> ExpeditionEventKind {
        ExpeditionEventKind::ExpeditionStarted(ExpeditionStarted {
            expedition_id,
            player_name: "Ada".to_owned(),
            time_limit_secs: 180,
            biome_count: 3,
            selections_per_biome: 2,
        })
    }

    #[tokio::test]
    async fn test_get_expedition_by_id_returns_view_with_state() {
        // Arrange
        let expedition_id = Uuid::new_v4();
        let events = vec![
            stored(expedition_id, 1, &started(expedition_id)),
            stored(
                expedition_id,
                2,
                &ExpeditionEventKind::PhotoScored(PhotoScored {
                    expedition_id,
                    biome_index: 0,
                    photo_url: "https://img/1.jpg".to_owned(),
                    analysis: "A **Macaw** preens. It is red.".to_owned(),
                    species: "Macaw".to_owned(),
                    score: 5,
                }),
            ),
        ];
        let repo = RecordingEventRepository::new(events);
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 1, 0).unwrap());

        // Act
        let view = get_expedition_by_id(expedition_id, &BiomeCatalog::default(), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(view.expedition_id, expedition_id);
        assert_eq!(view.player_name.as_deref(), Some("Ada"));
        assert_eq!(view.biome_index, 0);
        assert_eq!(view.biome_name.as_deref(), Some("Rainforest"));
        assert_eq!(view.soundtrack.as_deref(), Some("audio/CanopyWhispers.mp3"));
        assert_eq!(view.selections_in_biome, 1);
        assert_eq!(view.score, 5);
        assert!(!view.ended);
        assert_eq!(view.seconds_remaining, 120);
        assert_eq!(view.album, vec!["https://img/1.jpg".to_owned()]);
        assert_eq!(view.discoveries[0].summary, "A **Macaw** preens.");
        assert_eq!(view.version, 2);
    }

    #[tokio::test]
    async fn test_get_expedition_by_id_reports_end_reason_and_zero_time() {
        // Arrange
        let expedition_id = Uuid::new_v4();
        let events = vec![
            stored(expedition_id, 1, &started(expedition_id)),
            stored(
                expedition_id,
                2,
                &ExpeditionEventKind::ExpeditionEnded(ExpeditionEnded {
                    expedition_id,
                    final_score: 0,
                    reason: EndReason::TimeExpired,
                }),
            ),
        ];
        let repo = RecordingEventRepository::new(events);
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 30).unwrap());

        // Act
        let view = get_expedition_by_id(expedition_id, &BiomeCatalog::default(), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert!(view.ended);
        assert_eq!(view.end_reason, Some(EndReason::TimeExpired));
        assert_eq!(view.seconds_remaining, 0);
    }

    #[tokio::test]
    async fn test_get_expedition_by_id_returns_not_found_when_no_events() {
        // Arrange
        let expedition_id = Uuid::new_v4();
        let clock = FixedClock(Utc::now());

        // Act
        let result = get_expedition_by_id(
            expedition_id,
            &BiomeCatalog::default(),
            &clock,
            &EmptyEventRepository,
        )
        .await;

        // Assert
        match result {
            Err(DomainError::AggregateNotFound(id)) => assert_eq!(id, expedition_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_expedition_by_id_surfaces_corrupt_payloads() {
        let expedition_id = Uuid::new_v4();
        let mut event = stored(expedition_id, 1, &started(expedition_id));
        event.payload = serde_json::json!({ "Unknown": {} });
        let repo = RecordingEventRepository::new(vec![event]);

        let result = get_expedition_by_id(
            expedition_id,
            &BiomeCatalog::default(),
            &FixedClock(Utc::now()),
            &repo,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
