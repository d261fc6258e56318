use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

// ============ Pagination ============

/// Page sizes offered by the table paginator.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 25, 50];

/// A page size restricted to [`PAGE_SIZE_OPTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    /// Smallest page size, used when nothing else is configured.
    pub const SMALL: Self = Self(5);

    /// Validate a raw page size.
    pub fn new(value: u32) -> Result<Self> {
        if PAGE_SIZE_OPTIONS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ApiError::InvalidParameter {
                param: "limit".to_string(),
                detail: format!("{value} is not one of {PAGE_SIZE_OPTIONS:?}"),
            })
        }
    }

    /// Raw value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::SMALL
    }
}

impl TryFrom<u32> for PageSize {
    type Error = ApiError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}

/// Pagination metadata returned with every listing.
///
/// `total_pages` is always derived from `total` and `limit`; construct through
/// [`Pagination::new`] so the two never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of records known to the backend.
    pub total: u64,
    /// `ceil(total / limit)`.
    #[serde(default)]
    pub total_pages: u32,
}

impl Pagination {
    /// Build pagination metadata, computing `total_pages`.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    /// Empty first page, the fallback used when a prefetch fails.
    pub fn empty(limit: u32) -> Self {
        Self::new(1, limit, 0)
    }

    /// Re-derive `total_pages` from a payload that may carry a stale value.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.limit, self.total)
    }

    /// 1-based index range `(start, end)` of the items shown on this page.
    ///
    /// Returns `(0, 0)` when the page is empty.
    pub fn item_range(&self) -> (u64, u64) {
        if self.total == 0 || self.limit == 0 {
            return (0, 0);
        }
        let start = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit) + 1;
        let end = (u64::from(self.page) * u64::from(self.limit)).min(self.total);
        if start > end { (0, 0) } else { (start, end) }
    }

    /// Whether `page` lies within `1..=total_pages`.
    pub fn is_valid_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Previous page, never below 1.
    pub fn previous_page(&self) -> u32 {
        self.page.saturating_sub(1).max(1)
    }

    /// Next page, never beyond the last page (or 1 for an empty listing).
    pub fn next_page(&self) -> u32 {
        self.page.saturating_add(1).min(self.total_pages.max(1))
    }
}

/// `ceil(total / limit)`, with a zero limit yielding zero pages.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

// ============ Usuario ============

/// Status of a usuario. Serialized as `ACTIVO` / `INACTIVO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    #[serde(rename = "ACTIVO")]
    Active,
    #[serde(rename = "INACTIVO")]
    Inactive,
}

impl UserStatus {
    /// All values in display order.
    pub const ALL: [Self; 2] = [Self::Active, Self::Inactive];

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVO",
            Self::Inactive => "INACTIVO",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Activo",
            Self::Inactive => "Inactivo",
        }
    }

    /// Parse a wire or UI value, case-insensitively. Accepts the English
    /// aliases as well.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVO" | "ACTIVE" => Some(Self::Active),
            "INACTIVO" | "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A usuario as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    /// User-supplied identifier, immutable after creation.
    pub id: String,
    /// Display name.
    pub usuario: String,
    /// Status.
    pub estado: UserStatus,
    /// Deployment-wide sector. Read-only on the client.
    #[serde(default)]
    pub sector: i64,
}

/// The editable part of a usuario.
///
/// The sector is not part of this type: it is a deployment constant injected
/// by the client when the request body is built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsuarioDraft {
    /// Identifier. Required on create, ignored on update.
    pub id: Option<String>,
    /// Display name.
    pub usuario: String,
    /// Status.
    pub estado: UserStatus,
}

impl UsuarioDraft {
    /// Draft seeded from an existing usuario.
    pub fn from_usuario(usuario: &Usuario) -> Self {
        Self {
            id: Some(usuario.id.clone()),
            usuario: usuario.usuario.clone(),
            estado: usuario.estado,
        }
    }
}

/// `POST /api/usuarios` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateUsuarioBody<'a> {
    pub id: &'a str,
    pub usuario: &'a str,
    pub estado: UserStatus,
    pub sector: i64,
}

/// `PUT /api/usuarios/{id}` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateUsuarioBody<'a> {
    pub usuario: &'a str,
    pub estado: UserStatus,
    pub sector: i64,
}

/// A page of usuarios with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsuariosPage {
    /// Records on the current page, in backend order.
    pub data: Vec<Usuario>,
    /// Pagination that produced `data`.
    pub pagination: Pagination,
}

impl UsuariosPage {
    /// Empty first page.
    pub fn empty(limit: u32) -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination::empty(limit),
        }
    }
}

/// Response of `POST /api/revalidate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidateResponse {
    /// Confirmation message.
    #[serde(default)]
    pub message: String,
    /// When the cache was invalidated.
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

// ============ Query ============

/// Sort direction. `None` removes sorting from the query entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
    None,
}

impl SortOrder {
    /// `_order` value, or `None` when unsorted.
    pub fn as_query(self) -> Option<&'static str> {
        match self {
            Self::Asc => Some("asc"),
            Self::Desc => Some("desc"),
            Self::None => None,
        }
    }

    /// Numeric form used by table widgets and the URL mirror (`1`, `-1`, `0`).
    pub fn as_signed(self) -> i8 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
            Self::None => 0,
        }
    }

    /// Inverse of [`as_signed`](Self::as_signed). Unknown values fall back to `Asc`.
    pub fn from_signed(value: i8) -> Self {
        match value {
            -1 => Self::Desc,
            0 => Self::None,
            _ => Self::Asc,
        }
    }
}

/// Default sort field.
pub const DEFAULT_SORT_FIELD: &str = "id";

/// Sort descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: DEFAULT_SORT_FIELD.to_string(),
            order: SortOrder::Asc,
        }
    }
}

/// Parameters of one listing request.
///
/// # Default
///
/// `page = 1, limit = 5`, no search, no status filter, sorted by `id` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<UserStatus>,
    pub sort: Sort,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PageSize::SMALL.get(),
            search: None,
            estado: None,
            sort: Sort::default(),
        }
    }
}

impl ListQuery {
    /// Query pairs in wire order.
    ///
    /// Blank searches are dropped and non-blank ones trimmed; `_sort`/`_order`
    /// are omitted when the order is [`SortOrder::None`].
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("_page", self.page.max(1).to_string()),
            ("_limit", self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("q", search.to_string()));
        }
        if let Some(estado) = self.estado {
            pairs.push(("estado", estado.as_str().to_string()));
        }
        if let Some(order) = self.sort.order.as_query()
            && !self.sort.field.is_empty()
        {
            pairs.push(("_sort", self.sort.field.clone()));
            pairs.push(("_order", order.to_string()));
        }
        pairs
    }

    /// URL-encoded query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }
}

/// A page-change event from a table widget that counts pages from 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct TablePageEvent {
    /// 0-based page index, if the event carries one.
    pub page: Option<u32>,
    /// Rows per page, if the event carries one.
    pub rows: Option<u32>,
}

impl TablePageEvent {
    /// Convert to the API's 1-based `(page, limit)`, keeping `current_limit`
    /// when the event has no row count or one outside [`PAGE_SIZE_OPTIONS`].
    pub fn to_page_and_limit(self, current_limit: PageSize) -> (u32, PageSize) {
        let page = self.page.unwrap_or(0).saturating_add(1);
        let limit = match self.rows.map(PageSize::new) {
            Some(Ok(size)) => size,
            Some(Err(e)) => {
                log::warn!("Ignoring table row count: {e}");
                current_limit
            }
            None => current_limit,
        };
        (page, limit)
    }
}
