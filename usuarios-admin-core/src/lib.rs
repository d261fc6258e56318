//! Usuarios Admin Core Library
//!
//! State layer of the usuarios administration screen:
//! - Filter state (search text and status)
//! - Table state (page, page size, sort) with an optional query-string mirror
//! - Data fetcher with stale-response discard
//! - Mutation actions (create, update, delete) with notifications
//! - Modal and form controller with client-side validation
//! - Refresh channel connecting the mutation layer to the table
//!
//! [`UsuarioSession`] wires all of them together for one page. The HTTP side
//! is abstracted behind [`usuarios_admin_api::UsuarioApi`], so the layer runs
//! unchanged against the real backend or an in-memory one.

pub mod actions;
pub mod debounce;
pub mod error;
pub mod fetcher;
pub mod filters;
pub mod form;
pub mod modal;
pub mod notify;
pub mod refresh;
pub mod session;
pub mod table_state;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use actions::{MutationActions, MutationOutcome, MutationSettings, SettleDelays};
pub use error::{CoreError, CoreResult};
pub use fetcher::{DataFetcher, FetchOutcome, FetcherSnapshot};
pub use filters::{FilterInput, FilterState, Filters, StatusFilter, StatusSelection};
pub use form::{FormErrors, FormField, FormMode, UsuarioForm, ValidationRules};
pub use modal::{ModalController, ModalSession};
pub use notify::{LogNotifier, Notification, Notifier, Severity};
pub use refresh::RefreshChannel;
pub use session::{SaveOutcome, SessionSettings, SessionSnapshot, UsuarioSession};
pub use table_state::{StateStorage, TablePatch, TableState};
