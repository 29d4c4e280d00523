use crate::target::Playfield;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub max_matches: usize,
    pub idle_timeout_ms: u64,
    pub max_idle_misses: u32,
    pub idle_punishment_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            radius: 50.0,
            max_matches: 10,
            idle_timeout_ms: 3000,
            max_idle_misses: 3,
            idle_punishment_ms: 3000.0,
        }
    }
}

impl Config {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn playfield(&self) -> Playfield {
        Playfield {
            width: self.width,
            height: self.height,
            radius: self.radius,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blip") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("blip_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
