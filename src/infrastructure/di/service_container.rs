//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{AnimationScheduler, DocumentLoader};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{
    FileSystem, FrameClock, RealFileSystem, SteppedFrameClock, TokioFrameClock,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn document_loader(&self) -> DocumentLoader {
        DocumentLoader::new(self.fs.clone())
    }

    /// Load both documents and build a scheduler driven by `clock`.
    pub fn scheduler_with<C: FrameClock>(&self, clock: C) -> ApplicationResult<AnimationScheduler<C>> {
        let session = self.document_loader().load_session(&self.settings)?;
        Ok(AnimationScheduler::new(
            session,
            clock,
            self.settings.animation_config(),
        ))
    }

    /// Scheduler paced by wall-clock frames.
    pub fn realtime_scheduler(&self) -> ApplicationResult<AnimationScheduler<TokioFrameClock>> {
        self.scheduler_with(TokioFrameClock::new(self.settings.frame_interval()))
    }

    /// Scheduler whose frames advance without waiting.
    pub fn instant_scheduler(&self) -> ApplicationResult<AnimationScheduler<SteppedFrameClock>> {
        self.scheduler_with(SteppedFrameClock::new(self.settings.frame_interval()))
    }
}
