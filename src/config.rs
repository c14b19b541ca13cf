use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::alloc_stress::{retained_bytes_for, DEFAULT_SLOTS};
use crate::call_timer::DEFAULT_CALLS;
use crate::error::ConfigError;

/// File looked up in the working directory by both binaries.
pub const CONFIG_FILE_NAME: &str = "memspeed.toml";

/// Default number of allocation cycles.
///
/// Keep this well away from 1,000,000: every cycle retains a full buffer and
/// a run of that size exhausts the memory of an ordinary machine.
pub const DEFAULT_CYCLES: usize = 100;

pub const DEFAULT_MAX_RETAINED_BYTES: u64 = 1 << 30;

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub memory: MemorySettings,
    pub speed: SpeedSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemorySettings {
    pub cycles: usize,
    pub slots: usize,
    pub profile_dir: PathBuf,
    pub profile_file: String,
    pub max_retained_bytes: u64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        MemorySettings {
            cycles: DEFAULT_CYCLES,
            slots: DEFAULT_SLOTS,
            profile_dir: PathBuf::from("."),
            profile_file: "dhat-heap.json".to_string(),
            max_retained_bytes: DEFAULT_MAX_RETAINED_BYTES,
        }
    }
}

impl MemorySettings {
    pub fn profile_path(&self) -> PathBuf {
        self.profile_dir.join(&self.profile_file)
    }

    /// Refuses runs that would retain more than `max_retained_bytes`.
    pub fn check_retention(&self) -> Result<u64, ConfigError> {
        match retained_bytes_for(self.cycles, self.slots) {
            Some(bytes) if bytes <= self.max_retained_bytes => Ok(bytes),
            requested => Err(ConfigError::RetentionLimit {
                cycles: self.cycles,
                slots: self.slots,
                requested: requested.unwrap_or(u64::MAX),
                limit: self.max_retained_bytes,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedSettings {
    pub calls: usize,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        SpeedSettings {
            calls: DEFAULT_CALLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: "warn".to_string(),
        }
    }
}

impl LogSettings {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidLogLevel {
                level: self.level.clone(),
            })
    }
}

// =============================================================================
// Loading and validation
// =============================================================================

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(content).map_err(|err| ConfigError::from_toml(err, content))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `memspeed.toml` from `dir` if it exists, otherwise the defaults.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// [`Settings::discover`] in the current working directory.
    pub fn discover_cwd() -> Result<Self, ConfigError> {
        let dir = env::current_dir().map_err(ConfigError::WorkingDir)?;
        Self::discover(&dir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.slots == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        self.memory.check_retention()?;
        self.log.level_filter()?;
        Ok(())
    }
}
