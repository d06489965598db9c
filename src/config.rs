use std::path::PathBuf;
use std::time::Duration;

use dirs::home_dir;
use log::error;

const DEFAULT_WIKI_API_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const DEFAULT_USER_AGENT: &str = "chimap/0.1.0 (https://github.com/chimap/chimap)";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Merged application configuration: environment variables win over the
/// config file, the config file wins over built-in defaults.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
  pub config_path: Option<PathBuf>,
  pub wiki_api_url: Option<String>,
  pub user_agent: Option<String>,
  pub fetch_timeout_secs: Option<u64>,
}

impl Config {
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file();

    let mut merged = from_env;
    if let Some(from_file) = &from_file {
      merged = merged.merge(from_file);
    }
    if merged.config_path.is_none() {
      merged.config_path = home_dir().map(|p| p.join(".config").join("chimap"));
    }

    if merged.config_path.is_some() && from_file.is_none() {
      merged.init_cfg_file();
    }

    merged
  }

  fn from_env() -> Self {
    Self {
      config_path: std::env::var("CHIMAP_CONFIG").ok().map(PathBuf::from),
      wiki_api_url: std::env::var("CHIMAP_WIKI_URL").ok(),
      user_agent: None,
      fetch_timeout_secs: None,
    }
  }

  fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.wiki_api_url = self.wiki_api_url.or(other.wiki_api_url.clone());
    self.user_agent = self.user_agent.or(other.user_agent.clone());
    self.fetch_timeout_secs = self.fetch_timeout_secs.or(other.fetch_timeout_secs);
    self
  }

  fn from_file() -> Option<Self> {
    let config_path = std::env::var("CHIMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("chimap")))?;
    let config_path = config_path.join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()?
  }

  fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else { return };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if !path.exists() {
      if let Ok(config) = serde_json::to_string_pretty(self) {
        let _ = std::fs::write(path, config).inspect_err(|e| {
          error!("Failed to write config file: {e}");
        });
      } else {
        error!("Failed to serialize config");
      }
    }
  }

  #[must_use]
  pub fn wiki_api_url(&self) -> &str {
    self.wiki_api_url.as_deref().unwrap_or(DEFAULT_WIKI_API_URL)
  }

  #[must_use]
  pub fn user_agent(&self) -> &str {
    self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
  }

  #[must_use]
  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS))
  }
}
