use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::search_data::MatchMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Generated `search/` directory, or a single data file
    #[serde(default = "default_search_dir")]
    pub search_dir: Option<PathBuf>,
    /// Root URL of the generated site, used to resolve relative links
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub default_mode: MatchMode,
    /// Maximum results per query; 0 means no limit
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Config {
    /// Apply command line / environment values on top of the file values
    pub fn with_overrides(mut self, search_dir: Option<PathBuf>, base_url: Option<String>) -> Self {
        if search_dir.is_some() {
            self.search_dir = search_dir;
        }
        if base_url.is_some() {
            self.base_url = base_url;
        }
        self
    }

    /// Result limit for a query; `requested` wins over the configured one,
    /// and 0 from either source means unlimited.
    pub fn result_limit(&self, requested: Option<usize>) -> Option<usize> {
        match requested.unwrap_or(self.limit) {
            0 => None,
            limit => Some(limit),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_dir: default_search_dir(),
            base_url: None,
            default_mode: MatchMode::default(),
            limit: default_limit(),
        }
    }
}

fn default_search_dir() -> Option<PathBuf> {
    // Doxygen's default HTML output layout
    let candidate = Path::new("html").join("search");
    candidate.is_dir().then_some(candidate)
}

fn default_limit() -> usize {
    50
}

pub fn default_config_path() -> PathBuf {
    let Some(dirs) = ProjectDirs::from("org", "doxindex", "doxindex") else {
        return Path::new("doxindex.json").to_path_buf();
    };
    dirs.config_dir().join("config.json")
}

/// Missing or unreadable config files fall back to defaults
pub fn load_config(path: &Path) -> Config {
    let Ok(bytes) = fs::read(path) else {
        return Config::default();
    };
    match serde_json::from_slice::<Config>(&bytes) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Ignoring malformed config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<(), String> {
    let json = serde_json::to_vec_pretty(cfg).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(path, json).map_err(|e| e.to_string())
}
