use crate::status::ClearPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Json,
    Sqlite,
    Memory,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub backend: StoreBackend,
    pub message_ttl_secs: u64,
    pub clear_policy: ClearPolicy,
    pub debug: bool,
    pub http_addr: String,
}

impl Settings {
    /// Defaults, then an optional `school-calendar.toml`, then
    /// `SCHOOL_CALENDAR_*` environment variables (a `.env` file is honoured).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("data_dir", "calendar-data")?
            .set_default("backend", "json")?
            .set_default("message_ttl_secs", 3)?
            .set_default("clear_policy", "unconditional")?
            .set_default("debug", false)?
            .set_default("http_addr", "0.0.0.0:3000")?
            .add_source(File::with_name("school-calendar").required(false))
            .add_source(Environment::with_prefix("SCHOOL_CALENDAR").prefix_separator("_"))
            .build()?;

        config.try_deserialize()
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
