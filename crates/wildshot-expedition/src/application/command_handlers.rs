//! Command handlers for the Expedition context.
//!
//! Each handler loads the aggregate, runs any external studio calls the
//! command needs, executes the domain method and persists the events.
//! Handlers never retry; a failed studio call aborts the command before
//! anything is recorded.

use tracing::{info, warn};
use uuid::Uuid;
use wildshot_core::aggregate::AggregateRoot;
use wildshot_core::clock::Clock;
use wildshot_core::collaborators::{
    ImageEnhancer, ResultArchive, SceneGenerator, ScoreFormatter, VisionAnalyzer,
};
use wildshot_core::error::DomainError;
use wildshot_core::repository::{EventRepository, StoredEvent};

use crate::domain::aggregates::Expedition;
use crate::domain::biome::{Biome, BiomeCatalog};
use crate::domain::commands::{ExpireExpedition, PhotographSubject, RevealScene, StartExpedition};
use crate::domain::events::{ExpeditionEvent, ExpeditionEventKind};
use crate::domain::progression::{Progress, ProgressionRules};
use crate::domain::prompts::{enhancement_prompt, identification_prompt, scene_prompt};
use crate::domain::score_record::{parse_score_record, resolve_species_label};
use crate::domain::scoring::score_analysis;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct ExpeditionCommandResult {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

/// Result of `RevealScene`.
#[derive(Debug)]
pub struct SceneCommandResult {
    /// The expedition.
    pub aggregate_id: Uuid,
    /// Empty when the generator produced nothing.
    pub stored_events: Vec<StoredEvent>,
    /// The new panorama, if one was generated.
    pub scene_url: Option<String>,
}

/// Result of `PhotographSubject`.
#[derive(Debug)]
pub struct PhotoCommandResult {
    /// The expedition.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
    /// URL of the enhanced photo.
    pub photo_url: String,
    /// Raw vision analysis.
    pub analysis: String,
    /// Display label for the identified species.
    pub species: String,
    /// Points earned by this photo.
    pub score: u32,
    /// Whether this photo finished the expedition.
    pub expedition_ended: bool,
}

/// The studio calls a photo goes through, in order.
#[derive(Clone, Copy)]
pub struct PhotoPipeline<'a> {
    /// Upscales the selected region.
    pub enhancer: &'a dyn ImageEnhancer,
    /// Identifies species in the upscaled photo.
    pub analyzer: &'a dyn VisionAnalyzer,
    /// Restates the analysis as a `{species, score}` record.
    pub formatter: &'a dyn ScoreFormatter,
}

/// Reconstitutes an `Expedition` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    expedition_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Expedition, DomainError> {
    let mut expedition = Expedition::new(expedition_id);
    for stored in existing_events {
        let kind: ExpeditionEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = ExpeditionEvent {
            metadata: stored.metadata(),
            kind,
        };
        expedition.apply(&event);
    }
    Ok(expedition)
}

async fn load(expedition_id: Uuid, repo: &dyn EventRepository) -> Result<Expedition, DomainError> {
    let existing_events = repo.load_events(expedition_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(expedition_id));
    }
    reconstitute(expedition_id, &existing_events)
}

async fn persist(
    expedition: &Expedition,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = expedition
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();

    repo.append_events(expedition.id, expedition.version(), &stored_events)
        .await?;

    Ok(stored_events)
}

fn current_biome<'c>(
    expedition: &Expedition,
    catalog: &'c BiomeCatalog,
) -> Result<&'c Biome, DomainError> {
    let index = expedition.current_biome();
    catalog.get(index).ok_or_else(|| {
        DomainError::Validation(format!("biome {index} is not in the configured catalog"))
    })
}

/// Hands the final score to the archive. Failures are logged, never raised:
/// the expedition has already ended by the time this runs.
async fn archive_result(expedition: &Expedition, archive: &dyn ResultArchive) {
    let Some(player_name) = expedition.player_name() else {
        return;
    };
    let final_score = expedition.progress().cumulative_score();
    match archive.persist_result(player_name, final_score).await {
        Ok(()) => info!(expedition_id = %expedition.id, final_score, "expedition result archived"),
        Err(e) => warn!(
            expedition_id = %expedition.id,
            final_score,
            error = %e,
            "failed to archive expedition result"
        ),
    }
}

/// Handles the `StartExpedition` command: creates a new aggregate sized to
/// `catalog` and persists the resulting event.
///
/// This is a CREATION command; the handler generates the expedition ID.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank player name, or any error
/// from event appending.
pub async fn handle_start_expedition(
    command: &StartExpedition,
    catalog: &BiomeCatalog,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<ExpeditionCommandResult, DomainError> {
    let expedition_id = Uuid::new_v4();
    let mut expedition = Expedition::new(expedition_id);

    expedition.start(
        &command.player_name,
        command.time_limit_secs,
        catalog.rules(ProgressionRules::DEFAULT_SELECTIONS_PER_BIOME),
        command.correlation_id,
        clock,
    )?;

    let stored_events = persist(&expedition, repo).await?;

    Ok(ExpeditionCommandResult {
        aggregate_id: expedition_id,
        stored_events,
    })
}

/// Handles the `RevealScene` command: generates a panorama for the current
/// biome and records it. A generator that returns nothing leaves the
/// expedition unchanged.
///
/// # Errors
///
/// Returns `DomainError` if the expedition is missing or inactive, the
/// generator fails, or event loading/appending fails.
pub async fn handle_reveal_scene(
    command: &RevealScene,
    catalog: &BiomeCatalog,
    generator: &dyn SceneGenerator,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SceneCommandResult, DomainError> {
    let mut expedition = load(command.expedition_id, repo).await?;
    expedition.ensure_active()?;
    let biome = current_biome(&expedition, catalog)?;

    let Some(scene_url) = generator.generate_panorama(&scene_prompt(&biome.prompt)).await? else {
        warn!(
            expedition_id = %command.expedition_id,
            biome = %biome.name,
            "scene generator returned no panorama"
        );
        return Ok(SceneCommandResult {
            aggregate_id: command.expedition_id,
            stored_events: Vec::new(),
            scene_url: None,
        });
    };

    expedition.reveal_scene(scene_url.clone(), command.correlation_id, clock)?;
    let stored_events = persist(&expedition, repo).await?;

    Ok(SceneCommandResult {
        aggregate_id: command.expedition_id,
        stored_events,
        scene_url: Some(scene_url),
    })
}

/// Handles the `PhotographSubject` command: upscale, analyze, score, record.
///
/// The locally computed score is the one recorded. The formatter's record
/// only supplies the species label; when it fails or does not parse, the
/// label falls back to the analysis itself. Finishing the last biome
/// archives the final score.
///
/// # Errors
///
/// Returns `DomainError` if the expedition is missing, ended or out of time,
/// the enhancer or analyzer fails, or event loading/appending fails.
pub async fn handle_photograph_subject(
    command: &PhotographSubject,
    catalog: &BiomeCatalog,
    pipeline: PhotoPipeline<'_>,
    archive: &dyn ResultArchive,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<PhotoCommandResult, DomainError> {
    let mut expedition = load(command.expedition_id, repo).await?;
    expedition.ensure_accepting_photos(clock)?;
    let biome = current_biome(&expedition, catalog)?;

    let photo_url = pipeline
        .enhancer
        .upscale(&command.image_url, &enhancement_prompt(&biome.prompt))
        .await?;
    let analysis = pipeline
        .analyzer
        .analyze(&identification_prompt(&biome.prompt), &photo_url)
        .await?;

    let local_score = score_analysis(&analysis);
    let record = match pipeline.formatter.format_score(&analysis, local_score).await {
        Ok(text) => {
            let record = parse_score_record(&text);
            if record.is_none() {
                warn!(
                    expedition_id = %command.expedition_id,
                    "score record did not parse; using local score"
                );
            }
            record
        }
        Err(e) => {
            warn!(
                expedition_id = %command.expedition_id,
                error = %e,
                "score formatter failed; using local score"
            );
            None
        }
    };
    if let Some(record) = record.as_ref().filter(|r| r.score != local_score) {
        warn!(
            expedition_id = %command.expedition_id,
            local_score,
            formatter_score = record.score,
            "formatter score disagrees with local score"
        );
    }
    let species = resolve_species_label(record.as_ref(), &analysis);

    let outcome = expedition.record_photo(
        photo_url.clone(),
        analysis.clone(),
        species.clone(),
        command.correlation_id,
        clock,
    )?;
    let stored_events = persist(&expedition, repo).await?;

    let expedition_ended = outcome.progress == Progress::Completed;
    if expedition_ended {
        archive_result(&expedition, archive).await;
    }

    Ok(PhotoCommandResult {
        aggregate_id: command.expedition_id,
        stored_events,
        photo_url,
        analysis,
        species,
        score: outcome.score,
        expedition_ended,
    })
}

/// Handles the `ExpireExpedition` command: ends an expedition whose
/// countdown has run out and archives its score.
///
/// # Errors
///
/// Returns `DomainError` if the expedition is missing, already ended or
/// still has time left, or event loading/appending fails.
pub async fn handle_expire_expedition(
    command: &ExpireExpedition,
    archive: &dyn ResultArchive,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<ExpeditionCommandResult, DomainError> {
    let mut expedition = load(command.expedition_id, repo).await?;

    expedition.expire(command.correlation_id, clock)?;
    let stored_events = persist(&expedition, repo).await?;

    archive_result(&expedition, archive).await;

    Ok(ExpeditionCommandResult {
        aggregate_id: command.expedition_id,
        stored_events,
    })
}
