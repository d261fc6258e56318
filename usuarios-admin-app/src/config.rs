//! Application configuration
//!
//! Loaded from TOML, then overridden by environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `USUARIOS_API_BASE_URL` | `api_base_url` |
//! | `NEXT_PUBLIC_API_URL` | `upstream_url` |
//! | `USUARIOS_SECTOR` | `sector` |
//! | `USUARIOS_PAGE_SIZE` | `default_page_size` |
//! | `USUARIOS_SETTLE_DELAY_MS` | all of the `*_settle_delay_ms` fields |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use usuarios_admin_api::{DEFAULT_SECTOR, PAGE_SIZE_OPTIONS, PageSize};
use usuarios_admin_core::debounce::SEARCH_DEBOUNCE;
use usuarios_admin_core::{
    CoreError, CoreResult, MutationSettings, SessionSettings, SettleDelays, StateStorage,
    ValidationRules,
};

pub const ENV_API_BASE_URL: &str = "USUARIOS_API_BASE_URL";
pub const ENV_UPSTREAM_URL: &str = "NEXT_PUBLIC_API_URL";
pub const ENV_SECTOR: &str = "USUARIOS_SECTOR";
pub const ENV_PAGE_SIZE: &str = "USUARIOS_PAGE_SIZE";
pub const ENV_SETTLE_DELAY_MS: &str = "USUARIOS_SETTLE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin serving `/api/usuarios` and `/api/revalidate`.
    pub api_base_url: String,
    /// Upstream store read for the prefetched first page. Prefetch is
    /// skipped when unset.
    pub upstream_url: Option<String>,
    pub sector: i64,
    pub default_page_size: u32,
    pub search_debounce_ms: u64,
    /// Wait between a successful mutation and the table refresh, per operation.
    pub create_settle_delay_ms: u64,
    pub update_settle_delay_ms: u64,
    pub delete_settle_delay_ms: u64,
    pub strict_validation: bool,
    pub revalidate_path: String,
    pub request_timeout_secs: u64,
    pub storage: StateStorage,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            upstream_url: None,
            sector: DEFAULT_SECTOR,
            default_page_size: PageSize::SMALL.get(),
            search_debounce_ms: u64::try_from(SEARCH_DEBOUNCE.as_millis()).unwrap_or(500),
            create_settle_delay_ms: 0,
            update_settle_delay_ms: 0,
            delete_settle_delay_ms: 0,
            strict_validation: false,
            revalidate_path: "/".to_string(),
            request_timeout_secs: 30,
            storage: StateStorage::Memory,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::Config(format!("Invalid TOML: {e}")))
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// File (or defaults) + process environment, validated.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_UPSTREAM_URL) {
            self.upstream_url = Some(url);
        }
        if let Some(sector) = parse_override(&lookup, ENV_SECTOR) {
            self.sector = sector;
        }
        if let Some(size) = parse_override(&lookup, ENV_PAGE_SIZE) {
            self.default_page_size = size;
        }
        if let Some(delay) = parse_override(&lookup, ENV_SETTLE_DELAY_MS) {
            self.create_settle_delay_ms = delay;
            self.update_settle_delay_ms = delay;
            self.delete_settle_delay_ms = delay;
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Config("api_base_url must not be empty".to_string()));
        }
        if self
            .upstream_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(CoreError::Config("upstream_url must not be empty".to_string()));
        }
        if !PAGE_SIZE_OPTIONS.contains(&self.default_page_size) {
            return Err(CoreError::Config(format!(
                "default_page_size must be one of {PAGE_SIZE_OPTIONS:?}, got {}",
                self.default_page_size
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_settings(&self) -> CoreResult<SessionSettings> {
        let default_page_size = PageSize::new(self.default_page_size)
            .map_err(|e| CoreError::Config(e.to_string()))?;
        Ok(SessionSettings {
            default_page_size,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            storage: self.storage,
            validation: if self.strict_validation {
                ValidationRules::strict()
            } else {
                ValidationRules::basic()
            },
            mutation: MutationSettings {
                settle_delays: SettleDelays {
                    create: Duration::from_millis(self.create_settle_delay_ms),
                    update: Duration::from_millis(self.update_settle_delay_ms),
                    delete: Duration::from_millis(self.delete_settle_delay_ms),
                },
                revalidate_path: self.revalidate_path.clone(),
            },
        })
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}
