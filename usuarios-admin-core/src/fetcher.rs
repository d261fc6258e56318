//! Data fetcher for the usuarios listing
//!
//! Holds the page currently on screen. Every fetch is tagged with a sequence
//! number; when several are in flight only the most recently issued one may
//! touch state, so a slow response for an old filter combination can never
//! overwrite a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use usuarios_admin_api::{ListQuery, PageSize, Pagination, Usuario, UsuarioApi, UsuariosPage};

/// Result of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response installed as the current page.
    Applied,
    /// Request failed; the previous page is still shown.
    Failed(String),
    /// A newer fetch was issued meanwhile; response dropped.
    Stale,
}

/// Point-in-time copy of the fetcher state, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherSnapshot {
    pub records: Vec<Usuario>,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<String>,
    pub hydrated: bool,
}

#[derive(Debug)]
struct FetcherState {
    records: Vec<Usuario>,
    pagination: Pagination,
    loading: bool,
    error: Option<String>,
    /// Query of the last applied response.
    last_query: Option<ListQuery>,
    hydrated: bool,
}

/// Fetches pages and owns what is displayed.
pub struct DataFetcher {
    api: Arc<dyn UsuarioApi>,
    state: RwLock<FetcherState>,
    latest_seq: AtomicU64,
}

impl DataFetcher {
    pub fn new(api: Arc<dyn UsuarioApi>, initial_limit: u32) -> Self {
        Self {
            api,
            state: RwLock::new(FetcherState {
                records: Vec::new(),
                pagination: Pagination::empty(initial_limit),
                loading: false,
                error: None,
                last_query: None,
                hydrated: false,
            }),
            latest_seq: AtomicU64::new(0),
        }
    }

    /// Fetch one page.
    ///
    /// On failure the error message is stored and the previously displayed
    /// records are kept. `loading` stays set while a newer fetch is pending.
    pub async fn fetch(&self, query: ListQuery) -> FetchOutcome {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.api.list(&query).await;

        let mut state = self.state.write().await;
        if self.latest_seq.load(Ordering::SeqCst) != seq {
            log::debug!("Dropping stale listing response #{seq}");
            return FetchOutcome::Stale;
        }
        state.loading = false;
        match result {
            Ok(UsuariosPage { data, pagination }) => {
                log::debug!(
                    "Loaded {} usuarios (page {}/{}, total {})",
                    data.len(),
                    pagination.page,
                    pagination.total_pages,
                    pagination.total
                );
                state.records = data;
                state.pagination = pagination;
                state.last_query = Some(query);
                FetchOutcome::Applied
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("Failed to load usuarios: {e}");
                } else {
                    log::error!("Failed to load usuarios: {e}");
                }
                let message = e.to_string();
                state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Re-fetch with `current` filters and sort, on the page/limit of the
    /// last applied response (or `current`'s own when nothing was applied).
    pub async fn refresh(&self, current: ListQuery) -> FetchOutcome {
        let query = match self.state.read().await.last_query.as_ref() {
            Some(last) => ListQuery {
                page: last.page,
                limit: if PageSize::new(last.limit).is_ok() {
                    last.limit
                } else {
                    current.limit
                },
                ..current
            },
            None => current,
        };
        self.fetch(query).await
    }

    /// Install a server-prefetched page. Only the first call has an effect.
    ///
    /// Returns whether the page was installed.
    pub async fn hydrate(&self, page: UsuariosPage) -> bool {
        let mut state = self.state.write().await;
        if state.hydrated {
            log::debug!("Initial data already installed, ignoring");
            return false;
        }
        let pagination = page.pagination.normalized();
        state.records = page.data;
        state.last_query = Some(ListQuery {
            page: pagination.page,
            limit: pagination.limit,
            ..ListQuery::default()
        });
        state.pagination = pagination;
        state.hydrated = true;
        true
    }

    /// First load: skipped when initial data was hydrated.
    pub async fn load_initial(&self, query: ListQuery) -> Option<FetchOutcome> {
        if self.state.read().await.hydrated {
            return None;
        }
        Some(self.fetch(query).await)
    }

    pub async fn snapshot(&self) -> FetcherSnapshot {
        let state = self.state.read().await;
        FetcherSnapshot {
            records: state.records.clone(),
            pagination: state.pagination,
            loading: state.loading,
            error: state.error.clone(),
            hydrated: state.hydrated,
        }
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination
    }
}
