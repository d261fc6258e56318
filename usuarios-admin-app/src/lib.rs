//! Platform-agnostic application bootstrap for the usuarios administration screen.
//!
//! Provides `AppConfig` (TOML + environment), `AppState` (the page session and
//! its collaborators) and `AppStateBuilder` (adapter injection).

pub mod config;
pub mod prefetch;

use std::sync::Arc;

use usuarios_admin_api::{HttpUsuarioApi, UpstreamClient, UsuarioApi};
use usuarios_admin_core::error::{CoreError, CoreResult};
use usuarios_admin_core::{FetchOutcome, LogNotifier, Notifier, UsuarioSession};

pub use config::AppConfig;
pub use prefetch::{PREFETCH_LIMIT, fallback_page, prefetch_initial_page};

/// What happened during [`AppState::run_startup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupReport {
    /// The prefetched page (or its empty fallback) was installed.
    Hydrated,
    /// No upstream configured; the first page was fetched through the API.
    Fetched(FetchOutcome),
}

/// Platform-agnostic application state.
///
/// Every frontend constructs this once via `AppStateBuilder`.
pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<dyn UsuarioApi>,
    /// Present when `upstream_url` is configured.
    pub upstream: Option<UpstreamClient>,
    pub session: Arc<UsuarioSession>,
}

impl AppState {
    /// Mount the session and load the first page.
    ///
    /// With an upstream store configured the first page is prefetched from it
    /// and installed without going through the API; otherwise it is fetched
    /// through the API.
    pub async fn run_startup(&self) -> StartupReport {
        self.session.mount().await;

        if let Some(upstream) = &self.upstream {
            let page = prefetch_initial_page(upstream).await;
            if self.session.hydrate(page).await {
                log::info!("Startup: initial page installed from prefetch");
            }
        }

        match self.session.load_initial().await {
            None => StartupReport::Hydrated,
            Some(outcome) => {
                log::info!("Startup: initial page fetched ({outcome:?})");
                StartupReport::Fetched(outcome)
            }
        }
    }
}

/// Builder for constructing `AppState`.
///
/// # Optional adapters
/// - `api` — defaults to `HttpUsuarioApi` against `config.api_base_url`
/// - `notifier` — defaults to `LogNotifier`
/// - `http_client` — defaults to a client with `config.request_timeout()`
pub struct AppStateBuilder {
    config: AppConfig,
    api: Option<Arc<dyn UsuarioApi>>,
    notifier: Option<Arc<dyn Notifier>>,
    http_client: Option<reqwest::Client>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            api: None,
            notifier: None,
            http_client: None,
        }
    }

    #[must_use]
    pub fn api(mut self, api: Arc<dyn UsuarioApi>) -> Self {
        self.api = Some(api);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn build(self) -> CoreResult<AppState> {
        let config = self.config;
        config.validate()?;
        let settings = config.session_settings()?;

        let client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.request_timeout())
                .build()
                .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?,
        };

        let upstream = config
            .upstream_url
            .as_deref()
            .map(|url| UpstreamClient::new(client.clone(), url))
            .transpose()?;

        let api = self.api.unwrap_or_else(|| {
            Arc::new(HttpUsuarioApi::with_client(
                client,
                &config.api_base_url,
                config.sector,
            ))
        });
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        let session = Arc::new(UsuarioSession::new(Arc::clone(&api), notifier, settings));

        Ok(AppState {
            config,
            api,
            upstream,
            session,
        })
    }
}
