//! Shared test mocks and utilities for the Wildshot photo safari.

mod clock;
mod collaborators;
mod repository;

pub use clock::FixedClock;
pub use collaborators::{
    FailingStudio, RecordingArchive, ScriptedAnalyzer, StubEnhancer, StubFormatter,
    StubSceneGenerator,
};
pub use repository::{
    EmptyEventRepository, FailingEventRepository, InMemoryEventRepository,
    RecordingEventRepository,
};
