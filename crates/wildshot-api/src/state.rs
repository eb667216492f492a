//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;
use wildshot_core::clock::{Clock, SystemClock};
use wildshot_core::collaborators::{
    ImageEnhancer, ResultArchive, SceneGenerator, ScoreFormatter, VisionAnalyzer,
};
use wildshot_core::repository::EventRepository;
use wildshot_event_store::pg_event_repository::PgEventRepository;
use wildshot_event_store::pg_result_archive::PgResultArchive;
use wildshot_expedition::application::command_handlers::PhotoPipeline;
use wildshot_expedition::domain::biome::BiomeCatalog;
use wildshot_studio::blockade::BlockadeClient;
use wildshot_studio::fal::FalClient;
use wildshot_studio::gemini::GeminiClient;
use wildshot_studio::groq::GroqClient;
use wildshot_studio::scene::FallbackSceneGenerator;
use wildshot_studio::unconfigured::Unconfigured;

use crate::config::AppConfig;
use crate::error::AppError;

/// The AI services behind an expedition.
#[derive(Clone)]
pub struct Studio {
    /// Panorama generation.
    pub scene_generator: Arc<dyn SceneGenerator>,
    /// Photo upscaling.
    pub enhancer: Arc<dyn ImageEnhancer>,
    /// Species identification.
    pub analyzer: Arc<dyn VisionAnalyzer>,
    /// Score record formatting.
    pub formatter: Arc<dyn ScoreFormatter>,
}

impl Studio {
    /// Wires the HTTP clients for whichever keys are configured. A missing
    /// key leaves that port answering with a collaborator error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Studio` if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let fal = config
            .fal_key
            .clone()
            .map(FalClient::new)
            .transpose()?
            .map(Arc::new);
        let blockade: Option<Arc<dyn SceneGenerator>> = match &config.blockade_api_key {
            Some(key) => Some(Arc::new(BlockadeClient::new(key.clone())?)),
            None => None,
        };

        let fal_missing = Unconfigured { env_var: "FAL_KEY" };
        let scene_generator: Arc<dyn SceneGenerator> = match (blockade, &fal) {
            (Some(blockade), Some(fal)) => Arc::new(FallbackSceneGenerator::new(
                blockade,
                Arc::clone(fal) as Arc<dyn SceneGenerator>,
            )),
            (Some(blockade), None) => blockade,
            (None, Some(fal)) => Arc::clone(fal) as Arc<dyn SceneGenerator>,
            (None, None) => Arc::new(fal_missing),
        };
        let enhancer: Arc<dyn ImageEnhancer> = match fal {
            Some(fal) => fal,
            None => Arc::new(fal_missing),
        };
        let analyzer: Arc<dyn VisionAnalyzer> = match &config.gemini_api_key {
            Some(key) => Arc::new(GeminiClient::new(key.clone())?),
            None => Arc::new(Unconfigured {
                env_var: "GEMINI_API_KEY",
            }),
        };
        let formatter: Arc<dyn ScoreFormatter> = match &config.groq_api_key {
            Some(key) => Arc::new(GroqClient::new(key.clone())?),
            None => Arc::new(Unconfigured {
                env_var: "GROQ_API_KEY",
            }),
        };

        Ok(Self {
            scene_generator,
            enhancer,
            analyzer,
            formatter,
        })
    }

    /// Borrows the photo pipeline ports.
    #[must_use]
    pub fn photo_pipeline(&self) -> PhotoPipeline<'_> {
        PhotoPipeline {
            enhancer: self.enhancer.as_ref(),
            analyzer: self.analyzer.as_ref(),
            formatter: self.formatter.as_ref(),
        }
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Clock for countdowns and event timestamps.
    pub clock: Arc<dyn Clock>,
    /// Event repository for loading and persisting domain events.
    pub event_repository: Arc<dyn EventRepository>,
    /// Final score archive.
    pub result_archive: Arc<dyn ResultArchive>,
    /// Biomes every expedition walks through.
    pub catalog: Arc<BiomeCatalog>,
    /// External AI services.
    pub studio: Studio,
    /// Countdown for expeditions started without an explicit limit.
    pub default_time_limit_secs: u64,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        db_pool: PgPool,
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        result_archive: Arc<dyn ResultArchive>,
        catalog: Arc<BiomeCatalog>,
        studio: Studio,
        default_time_limit_secs: u64,
    ) -> Self {
        Self {
            db_pool,
            clock,
            event_repository,
            result_archive,
            catalog,
            studio,
            default_time_limit_secs,
        }
    }

    /// Production state: Postgres-backed repository and archive, the
    /// system clock and the configured studio clients.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the catalog or a studio client cannot be loaded.
    pub fn from_config(db_pool: PgPool, config: &AppConfig) -> Result<Self, AppError> {
        let catalog = config.load_catalog()?;
        let studio = Studio::from_config(config)?;
        Ok(Self::new(
            db_pool.clone(),
            Arc::new(SystemClock),
            Arc::new(PgEventRepository::new(db_pool.clone())),
            Arc::new(PgResultArchive::new(db_pool)),
            Arc::new(catalog),
            studio,
            config.time_limit_secs,
        ))
    }
}
