//! Pagination/sort state and its query-string mirror

use usuarios_admin_api::{DEFAULT_SORT_FIELD, ListQuery, PageSize, Sort, SortOrder};

use crate::filters::{FilterParams, Filters, StatusFilter};

/// Where the table state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateStorage {
    /// Component memory, lost on navigation.
    #[default]
    Memory,
    /// Mirrored into the page's query string.
    Url,
}

/// Partial update of [`TableState`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePatch {
    pub page: Option<u32>,
    pub limit: Option<PageSize>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl TablePatch {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn limit(limit: PageSize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn sort(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort_field: Some(field.into()),
            sort_order: Some(order),
            ..Self::default()
        }
    }
}

/// Current page, page size and sort of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub page: u32,
    pub limit: u32,
    pub sort: Sort,
    default_limit: PageSize,
}

impl TableState {
    /// Fresh state: page 1, `default_limit` rows, sorted by id ascending.
    pub fn new(default_limit: PageSize) -> Self {
        Self {
            page: 1,
            limit: default_limit.get(),
            sort: Sort::default(),
            default_limit,
        }
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit.get()
    }

    /// Current page size, or the default if `limit` was set to something
    /// outside the paginator options.
    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.limit).unwrap_or(self.default_limit)
    }

    /// Merge a partial patch over the current state.
    pub fn update(&mut self, patch: TablePatch) {
        if let Some(page) = patch.page {
            self.page = page.max(1);
        }
        if let Some(limit) = patch.limit {
            self.limit = limit.get();
        }
        if let Some(field) = patch.sort_field {
            self.sort.field = field;
        }
        if let Some(order) = patch.sort_order {
            self.sort.order = order;
        }
    }

    /// Like [`update`](Self::update), but always lands on page 1.
    pub fn reset_to_first_page(&mut self, patch: TablePatch) {
        self.update(TablePatch {
            page: Some(1),
            ..patch
        });
    }

    /// Listing query for this state and the given filters.
    pub fn to_query(&self, filters: &FilterParams) -> ListQuery {
        ListQuery {
            page: self.page,
            limit: self.limit,
            search: filters.search.clone(),
            estado: filters.estado,
            sort: self.sort.clone(),
        }
    }

    /// Serialize to a query string, writing only non-default values.
    pub fn to_url_query(&self, filters: &Filters) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if self.page != 1 {
            serializer.append_pair("page", &self.page.to_string());
        }
        if self.limit != self.default_limit.get() {
            serializer.append_pair("limit", &self.limit.to_string());
        }
        if self.sort.field != DEFAULT_SORT_FIELD {
            serializer.append_pair("sortField", &self.sort.field);
        }
        if self.sort.order != SortOrder::Asc {
            serializer.append_pair("sortOrder", &self.sort.order.as_signed().to_string());
        }
        if !filters.search.is_empty() {
            serializer.append_pair("search", &filters.search);
        }
        if let Some(status) = filters.estado.as_status() {
            serializer.append_pair("estado", status.as_str());
        }
        serializer.finish()
    }

    /// Parse a query string (with or without the leading `?`).
    ///
    /// Missing or unparseable parameters take their defaults.
    pub fn from_url_query(query: &str, default_limit: PageSize) -> (Self, Filters) {
        let mut state = Self::new(default_limit);
        let mut filters = Filters::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "page" => {
                    if let Ok(page) = value.parse::<u32>() {
                        state.page = page.max(1);
                    }
                }
                "limit" => {
                    if let Some(size) = value.parse::<u32>().ok().and_then(|v| PageSize::new(v).ok())
                    {
                        state.limit = size.get();
                    }
                }
                "sortField" if !value.is_empty() => state.sort.field = value.into_owned(),
                "sortOrder" => {
                    if let Ok(order) = value.parse::<i8>() {
                        state.sort.order = SortOrder::from_signed(order);
                    }
                }
                "search" => filters.search = value.into_owned(),
                "estado" => filters.estado = StatusFilter::parse(&value),
                _ => {}
            }
        }
        (state, filters)
    }
}
