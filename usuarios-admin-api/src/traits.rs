use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ListQuery, RevalidateResponse, Usuario, UsuarioDraft, UsuariosPage};

/// Operations offered by the usuarios API.
///
/// [`HttpUsuarioApi`](crate::HttpUsuarioApi) is the production implementation;
/// state-layer tests substitute an in-memory one.
///
/// Implementations are responsible for injecting the deployment sector into
/// outgoing bodies: callers only ever pass a [`UsuarioDraft`].
#[async_trait]
pub trait UsuarioApi: Send + Sync {
    /// `GET /api/usuarios` with pagination, filters and sort.
    ///
    /// Fails with [`ApiError::MalformedPayload`](crate::ApiError::MalformedPayload)
    /// when the body lacks `data` or `pagination`.
    async fn list(&self, query: &ListQuery) -> Result<UsuariosPage>;

    /// `GET /api/usuarios/{id}`.
    async fn get(&self, id: &str) -> Result<Usuario>;

    /// `POST /api/usuarios`. The draft must carry an id.
    async fn create(&self, draft: &UsuarioDraft) -> Result<Usuario>;

    /// `PUT /api/usuarios/{id}`.
    async fn update(&self, id: &str, draft: &UsuarioDraft) -> Result<Usuario>;

    /// `DELETE /api/usuarios/{id}`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// `POST /api/revalidate` for `path`.
    async fn revalidate(&self, path: &str) -> Result<RevalidateResponse>;
}
