//! Page session
//!
//! [`UsuarioSession`] is the page-level controller of the usuarios screen. It
//! owns the filter and table state, the fetcher, the modal/form pair and the
//! refresh channel, and turns UI events into fetches and mutations:
//!
//! - filter, sort and page-size changes land on page 1 and fetch;
//! - typed search is debounced, explicit submit bypasses the debounce;
//! - successful saves refresh the table through the refresh channel and close
//!   the modal; failed saves keep it open with the edited values.
//!
//! The refresh callback registered on [`mount`](UsuarioSession::mount) holds
//! the view state and the fetcher, not the session, so dropping the session
//! tears everything down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use usuarios_admin_api::{
    ListQuery, PageSize, SortOrder, TablePageEvent, Usuario, UsuarioApi, UsuariosPage,
};

use crate::actions::{MutationActions, MutationOutcome, MutationSettings};
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::fetcher::{DataFetcher, FetchOutcome, FetcherSnapshot};
use crate::filters::{FilterInput, FilterState, Filters, StatusSelection};
use crate::form::{FormErrors, FormField, UsuarioForm, ValidationRules};
use crate::modal::{ModalController, ModalSession};
use crate::notify::Notifier;
use crate::refresh::RefreshChannel;
use crate::table_state::{StateStorage, TablePatch, TableState};

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub default_page_size: PageSize,
    pub search_debounce: Duration,
    pub storage: StateStorage,
    pub validation: ValidationRules,
    pub mutation: MutationSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_page_size: PageSize::SMALL,
            search_debounce: SEARCH_DEBOUNCE,
            storage: StateStorage::Memory,
            validation: ValidationRules::basic(),
            mutation: MutationSettings::default(),
        }
    }
}

/// Result of [`UsuarioSession::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No modal was open.
    NotOpen,
    /// Client-side validation failed; nothing was sent.
    Invalid(FormErrors),
    /// The request was sent.
    Completed(MutationOutcome),
}

/// Everything a frontend needs to render the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub filters: Filters,
    /// Search text as typed, possibly not yet committed.
    pub search_input: String,
    pub table: TableState,
    pub data: FetcherSnapshot,
    pub modal: ModalSession,
    pub form: Option<UsuarioForm>,
    /// Present in URL storage mode.
    pub url_query: Option<String>,
}

#[derive(Debug)]
struct ViewState {
    filters: FilterState,
    table: TableState,
    search_input: String,
}

impl ViewState {
    fn query(&self) -> ListQuery {
        self.table.to_query(&self.filters.params())
    }
}

#[derive(Debug, Default)]
struct ModalState {
    controller: ModalController,
    form: Option<UsuarioForm>,
}

impl ModalState {
    fn close(&mut self) {
        self.controller.close();
        self.form = None;
    }
}

pub struct UsuarioSession {
    view: Arc<RwLock<ViewState>>,
    fetcher: Arc<DataFetcher>,
    refresh: Arc<RefreshChannel>,
    actions: MutationActions,
    modal: RwLock<ModalState>,
    debouncer: Debouncer,
    settings: SessionSettings,
}

impl UsuarioSession {
    pub fn new(
        api: Arc<dyn UsuarioApi>,
        notifier: Arc<dyn Notifier>,
        settings: SessionSettings,
    ) -> Self {
        let refresh = Arc::new(RefreshChannel::new());
        let fetcher = Arc::new(DataFetcher::new(
            Arc::clone(&api),
            settings.default_page_size.get(),
        ));
        let actions = MutationActions::new(
            api,
            Arc::clone(&refresh),
            notifier,
            settings.mutation.clone(),
        );
        Self {
            view: Arc::new(RwLock::new(ViewState {
                filters: FilterState::new(),
                table: TableState::new(settings.default_page_size),
                search_input: String::new(),
            })),
            fetcher,
            refresh,
            actions,
            modal: RwLock::new(ModalState::default()),
            debouncer: Debouncer::new(settings.search_debounce),
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn refresh_channel(&self) -> &Arc<RefreshChannel> {
        &self.refresh
    }

    // ===== Lifecycle =====

    /// Register the table's refresh with the refresh channel.
    pub async fn mount(&self) {
        let view = Arc::clone(&self.view);
        let fetcher = Arc::clone(&self.fetcher);
        self.refresh
            .register(move || {
                let view = Arc::clone(&view);
                let fetcher = Arc::clone(&fetcher);
                async move {
                    let query = view.read().await.query();
                    fetcher.refresh(query).await;
                }
            })
            .await;
    }

    /// Unregister the refresh and drop any pending search.
    pub async fn unmount(&self) {
        self.debouncer.cancel();
        self.refresh.clear().await;
    }

    /// Install server-prefetched data. Only the first call has an effect; the
    /// table adopts the page and limit of the prefetched data.
    pub async fn hydrate(&self, page: UsuariosPage) -> bool {
        let pagination = page.pagination;
        if !self.fetcher.hydrate(page).await {
            return false;
        }
        let limit = PageSize::new(pagination.limit)
            .inspect_err(|e| log::warn!("Keeping table page size after hydrate: {e}"))
            .ok();
        self.view.write().await.table.update(TablePatch {
            page: Some(pagination.page),
            limit,
            ..TablePatch::default()
        });
        true
    }

    /// First client-side load. `None` when hydrated data made it unnecessary.
    pub async fn load_initial(&self) -> Option<FetchOutcome> {
        let query = self.current_query().await;
        self.fetcher.load_initial(query).await
    }

    /// Re-fetch the current view.
    pub async fn refresh(&self) -> FetchOutcome {
        let query = self.current_query().await;
        self.fetcher.refresh(query).await
    }

    pub async fn current_query(&self) -> ListQuery {
        self.view.read().await.query()
    }

    // ===== Filters =====

    /// Record a keystroke in the search box.
    ///
    /// Returns `None` when a newer keystroke superseded this one; otherwise
    /// the value is committed, the table goes back to page 1 and the outcome
    /// of the resulting fetch is returned.
    pub async fn on_search_input(&self, text: impl Into<String>) -> Option<FetchOutcome> {
        let text = text.into();
        self.view.write().await.search_input.clone_from(&text);
        let settled = self.debouncer.settle(text).await?;
        Some(self.commit_search(settled).await)
    }

    /// Commit the typed search now, skipping the debounce.
    pub async fn submit_search(&self) -> FetchOutcome {
        self.debouncer.cancel();
        let text = self.view.read().await.search_input.clone();
        self.commit_search(text).await
    }

    async fn commit_search(&self, text: String) -> FetchOutcome {
        self.update_view(|view| view.filters.set_search(text)).await
    }

    pub async fn set_status_filter(&self, selection: StatusSelection) -> FetchOutcome {
        self.update_view(|view| view.filters.set_status(selection)).await
    }

    /// Route a filter-bar event. Search goes through the debounce.
    pub async fn apply_filter(&self, input: FilterInput) -> Option<FetchOutcome> {
        match input {
            FilterInput::Search(text) => self.on_search_input(text).await,
            FilterInput::Status(selection) => Some(self.set_status_filter(selection).await),
        }
    }

    pub async fn reset_filters(&self) -> FetchOutcome {
        self.debouncer.cancel();
        self.update_view(|view| {
            view.filters.reset();
            view.search_input.clear();
        })
        .await
    }

    // ===== Table =====

    /// Apply a table paginator event. A changed row count lands on page 1.
    pub async fn change_page(&self, event: TablePageEvent) -> FetchOutcome {
        let query = {
            let mut view = self.view.write().await;
            let current = view.table.page_size();
            let (page, limit) = event.to_page_and_limit(current);
            if limit == current {
                view.table.update(TablePatch::page(page));
            } else {
                view.table.reset_to_first_page(TablePatch::limit(limit));
            }
            view.query()
        };
        self.fetcher.fetch(query).await
    }

    pub async fn change_page_size(&self, size: PageSize) -> FetchOutcome {
        self.update_view(|view| view.table.update(TablePatch::limit(size))).await
    }

    pub async fn change_sort(&self, field: impl Into<String>, order: SortOrder) -> FetchOutcome {
        let patch = TablePatch::sort(field, order);
        self.update_view(|view| view.table.update(patch)).await
    }

    /// Mutate the view, go back to page 1 and fetch.
    async fn update_view(&self, change: impl FnOnce(&mut ViewState)) -> FetchOutcome {
        let query = {
            let mut view = self.view.write().await;
            change(&mut *view);
            view.table.reset_to_first_page(TablePatch::default());
            view.query()
        };
        self.fetcher.fetch(query).await
    }

    // ===== URL mirror =====

    /// Current query string, in URL storage mode.
    pub async fn url_query(&self) -> Option<String> {
        if self.settings.storage != StateStorage::Url {
            return None;
        }
        let view = self.view.read().await;
        Some(view.table.to_url_query(view.filters.filters()))
    }

    /// Adopt the state encoded in `query` (back/forward navigation) and fetch.
    pub async fn restore_from_url(&self, query: &str) -> FetchOutcome {
        self.debouncer.cancel();
        let (table, filters) = TableState::from_url_query(query, self.settings.default_page_size);
        let query = {
            let mut view = self.view.write().await;
            view.search_input.clone_from(&filters.search);
            view.filters.replace(filters);
            view.table = table;
            view.query()
        };
        self.fetcher.fetch(query).await
    }

    // ===== Modal and form =====

    pub async fn open_create(&self) {
        let mut modal = self.modal.write().await;
        modal.controller.open_create();
        modal.form = Some(UsuarioForm::new_create(self.settings.validation));
    }

    pub async fn open_edit(&self, usuario: Usuario) {
        let mut modal = self.modal.write().await;
        modal.form = Some(UsuarioForm::new_edit(&usuario, self.settings.validation));
        modal.controller.open_edit(usuario);
    }

    pub async fn close_modal(&self) {
        self.modal.write().await.close();
    }

    /// Change a form field. No-op when no modal is open.
    pub async fn set_form_field(&self, field: FormField, value: impl Into<String>) {
        if let Some(form) = self.modal.write().await.form.as_mut() {
            form.set_field(field, value);
        }
    }

    /// Validate the form and send it.
    ///
    /// Success closes the modal. Failure leaves the modal open with the
    /// values as edited.
    pub async fn save(&self) -> SaveOutcome {
        let (session, draft) = {
            let mut modal = self.modal.write().await;
            let session = modal.controller.session().clone();
            let Some(form) = modal.form.as_mut() else {
                return SaveOutcome::NotOpen;
            };
            match form.submit() {
                Ok(draft) => (session, draft),
                Err(errors) => return SaveOutcome::Invalid(errors),
            }
        };

        let outcome = match &session {
            ModalSession::Closed => return SaveOutcome::NotOpen,
            ModalSession::Create => self.actions.create(&draft).await,
            ModalSession::Edit(usuario) => self.actions.update(&usuario.id, &draft).await,
        };
        if outcome.is_success() {
            let mut modal = self.modal.write().await;
            if modal.controller.session() == &session {
                modal.close();
            }
        }
        SaveOutcome::Completed(outcome)
    }

    /// Delete `usuario` once the user confirmed.
    ///
    /// Returns `None` when the user declined; nothing is sent. On success a
    /// modal editing the same record is closed.
    pub async fn delete(&self, usuario: &Usuario, confirmed: bool) -> Option<MutationOutcome> {
        if !confirmed {
            log::debug!("Delete of usuario {} cancelled", usuario.id);
            return None;
        }
        let outcome = self.actions.delete(usuario).await;
        if outcome.is_success() {
            let mut modal = self.modal.write().await;
            if modal.controller.close_if_editing(&usuario.id) {
                modal.form = None;
            }
        }
        Some(outcome)
    }

    // ===== Snapshot =====

    pub async fn snapshot(&self) -> SessionSnapshot {
        let url_query = self.url_query().await;
        let (filters, search_input, table) = {
            let view = self.view.read().await;
            (
                view.filters.filters().clone(),
                view.search_input.clone(),
                view.table.clone(),
            )
        };
        let (modal, form) = {
            let modal = self.modal.read().await;
            (modal.controller.session().clone(), modal.form.clone())
        };
        SessionSnapshot {
            filters,
            search_input,
            table,
            data: self.fetcher.snapshot().await,
            modal,
            form,
            url_query,
        }
    }
}
