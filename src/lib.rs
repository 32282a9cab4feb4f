pub mod clock;
pub mod config;
pub mod progression;
pub mod srs;
pub mod storage;

use std::path::PathBuf;

use clock::{Clock, SystemClock};
use config::CoreConfig;
use progression::Progression;
use srs::Scheduler;
use storage::{FileStore, KeyValueStore, StorageError};

/// Both engines wired to the same data directory.
pub struct LearningCore {
    pub progression: Progression,
    pub scheduler: Scheduler,
}

impl LearningCore {
    /// Open the engines on disk using the configured (or default) data directory.
    pub fn open(config: &CoreConfig) -> Result<Self, StorageError> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => FileStore::default_data_dir()?,
        };
        Self::open_at(data_dir, config)
    }

    pub fn open_at(data_dir: PathBuf, config: &CoreConfig) -> Result<Self, StorageError> {
        let progress_store = FileStore::new(data_dir.clone());
        progress_store.init()?;
        let srs_store = FileStore::new(data_dir);
        log::info!("Opening learner data at {:?}", progress_store.base_path());

        Ok(Self::with_parts(
            Box::new(progress_store),
            Box::new(srs_store),
            || -> Box<dyn Clock> { Box::new(SystemClock) },
            config,
        ))
    }

    /// Build from injected stores and a clock factory (one clock per engine).
    pub fn with_parts(
        progress_store: Box<dyn KeyValueStore>,
        srs_store: Box<dyn KeyValueStore>,
        clock: impl Fn() -> Box<dyn Clock>,
        config: &CoreConfig,
    ) -> Self {
        let progression = Progression::load(
            progress_store,
            clock(),
            config.rewards.clone(),
            config.unlock.clone(),
        );
        let scheduler = Scheduler::load(srs_store, clock(), config.scheduler.clone());

        Self {
            progression,
            scheduler,
        }
    }
}
