//! Filter state for the usuarios table

use serde::{Deserialize, Serialize};
use usuarios_admin_api::UserStatus;

/// Status filter. `All` is never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(UserStatus),
}

impl StatusFilter {
    /// Parse a select value.
    ///
    /// Empty strings and the `all`/`todos` sentinels mean "no filter"; so does
    /// anything that is not a known status.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("todos")
        {
            return Self::All;
        }
        match UserStatus::parse(value) {
            Some(status) => Self::Only(status),
            None => {
                log::debug!("Unknown status filter {value:?}, treating as all");
                Self::All
            }
        }
    }

    /// The status to forward, if any.
    pub fn as_status(self) -> Option<UserStatus> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }
}

/// What a status select can hand back.
///
/// Widgets that emit a structured event instead of a value (e.g. the clear
/// button of a dropdown) map to `Cleared`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSelection {
    Value(String),
    Cleared,
}

/// A single change coming from the filter bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    Search(String),
    Status(StatusSelection),
}

/// Current filter values. `search` is stored verbatim and trimmed on read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filters {
    pub search: String,
    pub estado: StatusFilter,
}

/// Filters reduced to what is actually sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterParams {
    pub search: Option<String>,
    pub estado: Option<UserStatus>,
}

/// Filter state. Pure data; owns no side effects.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    filters: Filters,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Store the search text as given.
    pub fn set_search(&mut self, value: impl ToString) {
        self.filters.search = value.to_string();
    }

    /// Store the status selection, coercing cleared selections to `All`.
    pub fn set_status(&mut self, selection: StatusSelection) {
        self.filters.estado = match selection {
            StatusSelection::Value(value) => StatusFilter::parse(&value),
            StatusSelection::Cleared => StatusFilter::All,
        };
    }

    pub fn apply(&mut self, input: FilterInput) {
        match input {
            FilterInput::Search(value) => self.set_search(value),
            FilterInput::Status(selection) => self.set_status(selection),
        }
    }

    pub fn reset(&mut self) {
        self.filters = Filters::default();
    }

    /// Replace all values at once (used when restoring from the URL).
    pub fn replace(&mut self, filters: Filters) {
        self.filters = filters;
    }

    /// Query view: trimmed search and concrete status, empty values omitted.
    pub fn params(&self) -> FilterParams {
        let search = self.filters.search.trim();
        FilterParams {
            search: (!search.is_empty()).then(|| search.to_string()),
            estado: self.filters.estado.as_status(),
        }
    }
}
