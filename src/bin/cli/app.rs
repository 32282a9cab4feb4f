use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use n5lab_lib::config::CoreConfig;
use n5lab_lib::progression::Curriculum;
use n5lab_lib::storage::StorageError;
use n5lab_lib::LearningCore;

/// Shared application state for CLI commands
pub struct App {
    pub core: LearningCore,
}

impl App {
    /// Load the config and open both engines
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let mut config = CoreConfig::load(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }

        let core = LearningCore::open(&config).context("Failed to open learner data")?;
        Ok(Self { core })
    }

    /// Daily check-in. Runs on every start; repeated runs on the same day change nothing.
    pub fn check_in(&mut self) {
        let before = self.core.progression.profile().streak;
        warn_unsaved(self.core.progression.update_streak());
        let after = self.core.progression.profile().streak;
        if after != before {
            log::info!("Streak is now {} day(s)", after);
        }
    }
}

/// Storage failures never abort a command; the learner is told the change may be lost.
pub fn warn_unsaved(result: std::result::Result<(), StorageError>) {
    if let Err(e) = result {
        eprintln!("warning: progress was not saved: {}", e);
    }
}

fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("n5lab").join("config.toml"))
        .context("Failed to get config directory")
}

/// Read a curriculum from a `.json` file, or TOML for anything else
pub fn load_curriculum(path: &Path) -> Result<Curriculum> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read curriculum {}", path.display()))?;

    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let curriculum = if is_json {
        serde_json::from_str(&content).context("Invalid curriculum JSON")?
    } else {
        toml::from_str(&content).context("Invalid curriculum TOML")?
    };
    Ok(curriculum)
}
