//! Stub AI studio collaborators and a recording result archive.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use wildshot_core::collaborators::{
    ImageEnhancer, ResultArchive, SceneGenerator, ScoreFormatter, VisionAnalyzer,
};
use wildshot_core::error::DomainError;

/// Scene generator that returns the same answer every time.
#[derive(Debug, Clone)]
pub struct StubSceneGenerator(pub Option<String>);

#[async_trait]
impl SceneGenerator for StubSceneGenerator {
    async fn generate_panorama(&self, _prompt: &str) -> Result<Option<String>, DomainError> {
        Ok(self.0.clone())
    }
}

/// Enhancer that appends `?upscaled` to the input URL.
#[derive(Debug, Clone, Copy)]
pub struct StubEnhancer;

#[async_trait]
impl ImageEnhancer for StubEnhancer {
    async fn upscale(&self, image_url: &str, _prompt: &str) -> Result<String, DomainError> {
        Ok(format!("{image_url}?upscaled"))
    }
}

/// Analyzer that returns queued analyses in order, repeating the last one
/// once the queue is down to a single entry.
#[derive(Debug)]
pub struct ScriptedAnalyzer {
    analyses: Mutex<VecDeque<String>>,
}

impl ScriptedAnalyzer {
    /// Creates an analyzer serving `analyses` in order.
    ///
    /// # Panics
    ///
    /// Panics if `analyses` is empty.
    #[must_use]
    pub fn new<I, S>(analyses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let analyses: VecDeque<String> = analyses.into_iter().map(Into::into).collect();
        assert!(!analyses.is_empty(), "ScriptedAnalyzer needs at least one analysis");
        Self {
            analyses: Mutex::new(analyses),
        }
    }

    /// Analyzer that always returns `analysis`.
    #[must_use]
    pub fn always(analysis: &str) -> Self {
        Self::new([analysis])
    }
}

#[async_trait]
impl VisionAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, _prompt: &str, _image_url: &str) -> Result<String, DomainError> {
        let mut analyses = self.analyses.lock().unwrap();
        if analyses.len() > 1 {
            Ok(analyses.pop_front().unwrap_or_default())
        } else {
            Ok(analyses.front().cloned().unwrap_or_default())
        }
    }
}

/// Formatter that returns a canned completion, or fails when `None`.
#[derive(Debug, Clone)]
pub struct StubFormatter(pub Option<String>);

#[async_trait]
impl ScoreFormatter for StubFormatter {
    async fn format_score(&self, _analysis: &str, _score: u32) -> Result<String, DomainError> {
        self.0
            .clone()
            .ok_or_else(|| DomainError::Collaborator("formatter unavailable".into()))
    }
}

/// Every studio port, always failing with a collaborator error.
#[derive(Debug, Clone, Copy)]
pub struct FailingStudio;

#[async_trait]
impl SceneGenerator for FailingStudio {
    async fn generate_panorama(&self, _prompt: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Collaborator("studio offline".into()))
    }
}

#[async_trait]
impl ImageEnhancer for FailingStudio {
    async fn upscale(&self, _image_url: &str, _prompt: &str) -> Result<String, DomainError> {
        Err(DomainError::Collaborator("studio offline".into()))
    }
}

#[async_trait]
impl VisionAnalyzer for FailingStudio {
    async fn analyze(&self, _prompt: &str, _image_url: &str) -> Result<String, DomainError> {
        Err(DomainError::Collaborator("studio offline".into()))
    }
}

#[async_trait]
impl ScoreFormatter for FailingStudio {
    async fn format_score(&self, _analysis: &str, _score: u32) -> Result<String, DomainError> {
        Err(DomainError::Collaborator("studio offline".into()))
    }
}

/// Archive that records every persisted result, optionally failing.
#[derive(Debug, Default)]
pub struct RecordingArchive {
    results: Mutex<Vec<(String, u32)>>,
    fail: bool,
}

impl RecordingArchive {
    /// Archive that accepts every result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive that records the attempt and then fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of `(player_name, final_score)` attempts.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn results(&self) -> Vec<(String, u32)> {
        self.results.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultArchive for RecordingArchive {
    async fn persist_result(&self, player_name: &str, final_score: u32) -> Result<(), DomainError> {
        self.results
            .lock()
            .unwrap()
            .push((player_name.to_owned(), final_score));
        if self.fail {
            Err(DomainError::Infrastructure("archive unavailable".into()))
        } else {
            Ok(())
        }
    }
}
