//! # usuarios-admin-api
//!
//! Typed client for the usuarios administration REST API.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | List | `GET /api/usuarios?_page&_limit&q&estado&_sort&_order` |
//! | Get | `GET /api/usuarios/{id}` |
//! | Create | `POST /api/usuarios` |
//! | Update | `PUT /api/usuarios/{id}` |
//! | Delete | `DELETE /api/usuarios/{id}` |
//! | Invalidate cache | `POST /api/revalidate` |
//!
//! The listing answers `{ data, pagination }`; a body missing either field is
//! reported as [`ApiError::MalformedPayload`].
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)* — Use rustls.
//! - **`native-tls`** — Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use usuarios_admin_api::{ApiClientConfig, HttpUsuarioApi, ListQuery, UsuarioApi, UserStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpUsuarioApi::new(ApiClientConfig::new("http://localhost:3000"))?;
//!
//!     let query = ListQuery {
//!         search: Some("ana".to_string()),
//!         estado: Some(UserStatus::Active),
//!         ..ListQuery::default()
//!     };
//!     let page = api.list(&query).await?;
//!     for usuario in &page.data {
//!         println!("{} {} ({})", usuario.id, usuario.usuario, usuario.estado);
//!     }
//!     println!("page {}/{}", page.pagination.page, page.pagination.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Sector
//!
//! The sector is a deployment constant, not an editable field. Callers pass a
//! [`UsuarioDraft`] and the client writes its configured sector into every
//! create/update body.

mod client;
mod error;
mod http_client;
mod traits;
mod types;
mod upstream;
mod utils;

pub use error::{ApiError, Result};

pub use client::{ApiClientConfig, DEFAULT_SECTOR, HttpUsuarioApi, parse_list_payload};

pub use traits::UsuarioApi;

pub use types::{
    DEFAULT_SORT_FIELD, ListQuery, PAGE_SIZE_OPTIONS, PageSize, Pagination, RevalidateResponse,
    Sort, SortOrder, TablePageEvent, UserStatus, Usuario, UsuarioDraft, UsuariosPage, total_pages,
};

pub use upstream::UpstreamClient;
