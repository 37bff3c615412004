use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use allergen_core::{SynonymEntry, SynonymTable};
use allergen_engine::{FetchSettings, DEFAULT_BATCH_WIDTH};
use anyhow::{Context, Result};
use scan_logging::{scan_debug, scan_info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "cart_scan.ron";
pub const DEFAULT_BASE_URL: &str = "https://www.amazon.com/";

/// Extra synonyms merged into the built-in table at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraSynonym {
    pub canonical: String,
    pub variations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub base_url: Option<String>,
    pub batch_width: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: u64,
    pub user_agent: Option<String>,
    pub allergies: Vec<String>,
    pub extra_synonyms: Vec<ExtraSynonym>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: None,
            batch_width: DEFAULT_BATCH_WIDTH,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.map(|timeout| timeout.as_secs()),
            max_bytes: fetch.max_bytes,
            user_agent: fetch.user_agent,
            allergies: Vec::new(),
            extra_synonyms: Vec::new(),
        }
    }
}

impl ScanConfig {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
            ..FetchSettings::default()
        }
    }

    pub fn synonym_table(&self) -> SynonymTable {
        SynonymTable::builtin().extended(
            self.extra_synonyms
                .iter()
                .map(|extra| SynonymEntry::new(&extra.canonical, &extra.variations)),
        )
    }
}

/// Loads the configuration file.
///
/// An explicit path must exist. Without one, `cart_scan.ron` in the working
/// directory is used when present and defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<ScanConfig> {
    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound && explicit.is_none() => {
            scan_debug!("No {:?}, using default configuration", path);
            return Ok(ScanConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };

    let config: ScanConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    scan_info!("Loaded configuration from {:?}", path);
    Ok(config)
}
