use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_SEARCH_URL: &str = "https://www.ultimate-guitar.com/search.php";
pub const DEFAULT_SELECTOR: &str = "fzf";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONFIG_FILE: &str = "ugscrape";
const ENV_PREFIX: &str = "UGS";

/// Runtime settings: defaults, then `ugscrape.toml`, then `UGS_*` env vars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub selector_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: concat!("ug_scraper/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            selector_command: DEFAULT_SELECTOR.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }
}
