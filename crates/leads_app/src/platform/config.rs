//! Static configuration: a RON file overlaid with command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_info;
use leads_core::DEFAULT_PAGE_SIZE;
use leads_engine::ApiSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::CliArgs;

const DEFAULT_CONFIG_FILE: &str = "leads.ron";

const DEFAULT_CAMPAIGN_IDS: [&str; 4] = [
    "ad2cbb80-59a4-4596-8ba6-229528d78b10",
    "06005835-0b5c-4bde-bf77-1d759738bc20",
    "4b9dddb4-c737-4e3e-bd33-9526acdd5dc9",
    "516546a4-e02b-4282-8228-a807493ba9a5",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("no campaign identifiers configured")]
    NoCampaigns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub campaign_ids: Vec<String>,
    pub page_size: usize,
    pub use_stream: bool,
    pub retry_delay_ms: u64,
    pub connect_timeout_ms: u64,
    pub log_to_file: bool,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3070".to_string(),
            campaign_ids: DEFAULT_CAMPAIGN_IDS.iter().map(|id| id.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
            use_stream: true,
            retry_delay_ms: 3_000,
            connect_timeout_ms: 10_000,
            log_to_file: true,
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: None,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn to_ron(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .unwrap_or_else(|err| format!("/* could not serialize config: {err} */"))
    }
}

/// Load the config file (an explicit path must exist) and apply CLI overrides.
pub fn resolve(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_file(default_path)?
            } else {
                AppConfig::default()
            }
        }
    };

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if !args.campaigns.is_empty() {
        config.campaign_ids = args.campaigns.clone();
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if args.no_stream {
        config.use_stream = false;
    }

    config.page_size = config.page_size.max(1);
    config.campaign_ids.retain(|id| !id.trim().is_empty());
    if config.campaign_ids.is_empty() {
        return Err(ConfigError::NoCampaigns);
    }
    Ok(config)
}

fn load_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args_with_config(path: &Path) -> CliArgs {
        CliArgs {
            config: Some(path.to_path_buf()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.ron");
        fs::write(&path, r#"(base_url: "http://api.test", page_size: 8)"#).unwrap();

        let config = resolve(&args_with_config(&path)).unwrap();
        assert_eq!(config.base_url, "http://api.test");
        assert_eq!(config.page_size, 8);
        assert_eq!(config.campaign_ids.len(), 4);
        assert!(config.use_stream);
    }

    #[test]
    fn cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.ron");
        fs::write(&path, r#"(campaign_ids: ["from-file"], use_stream: true)"#).unwrap();

        let args = CliArgs {
            campaigns: vec!["from-cli".to_string()],
            no_stream: true,
            page_size: Some(0),
            ..args_with_config(&path)
        };
        let config = resolve(&args).unwrap();
        assert_eq!(config.campaign_ids, vec!["from-cli".to_string()]);
        assert!(!config.use_stream);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(&args_with_config(&dir.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.ron");
        fs::write(&path, "(base_url: 3").unwrap();
        let err = resolve(&args_with_config(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_campaign_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.ron");
        fs::write(&path, r#"(campaign_ids: ["  "])"#).unwrap();
        let err = resolve(&args_with_config(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NoCampaigns));
    }

    #[test]
    fn printed_config_parses_back() {
        let config = AppConfig::default();
        let parsed: AppConfig = ron::from_str(&config.to_ron()).unwrap();
        assert_eq!(parsed, config);
    }
}
