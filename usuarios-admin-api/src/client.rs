//! `reqwest` implementation of [`UsuarioApi`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::http_client::{HttpUtils, RawResponse};
use crate::traits::UsuarioApi;
use crate::types::{
    CreateUsuarioBody, ListQuery, Pagination, RevalidateResponse, UpdateUsuarioBody, Usuario,
    UsuarioDraft, UsuariosPage,
};

/// Sector assigned to every usuario in this deployment.
pub const DEFAULT_SECTOR: i64 = 5000;

const USUARIOS_PATH: &str = "/api/usuarios";
const REVALIDATE_PATH: &str = "/api/revalidate";

/// Connection settings for [`HttpUsuarioApi`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Origin serving `/api/usuarios` (e.g. `http://localhost:3000`).
    pub base_url: String,
    /// Sector written into every create/update body.
    pub sector: i64,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sector: DEFAULT_SECTOR,
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the usuarios API.
pub struct HttpUsuarioApi {
    client: reqwest::Client,
    base_url: String,
    sector: i64,
}

impl HttpUsuarioApi {
    /// Build a client with its own connection pool.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::NetworkError {
                detail: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self::with_client(client, &config.base_url, config.sector))
    }

    /// Build on top of an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: &str, sector: i64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sector,
        }
    }

    /// Sector injected into outgoing bodies.
    pub fn sector(&self) -> i64 {
        self.sector
    }

    fn list_url(&self, query: &ListQuery) -> String {
        format!("{}{USUARIOS_PATH}?{}", self.base_url, query.to_query_string())
    }

    fn record_url(&self, id: &str) -> String {
        format!(
            "{}{USUARIOS_PATH}/{}",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
    ) -> Result<RawResponse> {
        let payload = serde_json::to_string(body).map_err(|e| ApiError::SerializationError {
            detail: e.to_string(),
        })?;
        log::debug!("Request Body: {payload}");
        let request = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        let response = HttpUtils::execute_request(request, method.as_str(), url).await?;
        HttpUtils::ensure_success(response)
    }
}

/// Listing body as sent by the proxy; both fields are checked explicitly so a
/// partial payload is reported instead of silently defaulted.
#[derive(Deserialize)]
struct ListPayload {
    data: Option<Vec<Usuario>>,
    pagination: Option<Pagination>,
}

/// Parse a `{ data, pagination }` listing body.
pub fn parse_list_payload(body: &str) -> Result<UsuariosPage> {
    let payload: ListPayload = HttpUtils::parse_json(body)?;
    let data = payload.data.ok_or_else(|| ApiError::MalformedPayload {
        missing: "data".to_string(),
    })?;
    let pagination = payload
        .pagination
        .ok_or_else(|| ApiError::MalformedPayload {
            missing: "pagination".to_string(),
        })?;
    Ok(UsuariosPage {
        data,
        pagination: pagination.normalized(),
    })
}

/// Reject drafts whose id is absent or blank.
fn require_id<'a>(id: Option<&'a str>, operation: &str) -> Result<&'a str> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::InvalidParameter {
            param: "id".to_string(),
            detail: format!("an id is required to {operation} a usuario"),
        }),
    }
}

#[async_trait]
impl UsuarioApi for HttpUsuarioApi {
    async fn list(&self, query: &ListQuery) -> Result<UsuariosPage> {
        let url = self.list_url(query);
        let response =
            HttpUtils::execute_request(self.client.get(&url), "GET", &url).await?;
        let response = HttpUtils::ensure_success(response)?;
        parse_list_payload(&response.body)
    }

    async fn get(&self, id: &str) -> Result<Usuario> {
        let id = require_id(Some(id), "fetch")?;
        let url = self.record_url(id);
        let response =
            HttpUtils::execute_request(self.client.get(&url), "GET", &url).await?;
        if response.status == 404 {
            return Err(ApiError::NotFound { id: id.to_string() });
        }
        let response = HttpUtils::ensure_success(response)?;
        HttpUtils::parse_json(&response.body)
    }

    async fn create(&self, draft: &UsuarioDraft) -> Result<Usuario> {
        let id = require_id(draft.id.as_deref(), "create")?;
        let body = CreateUsuarioBody {
            id,
            usuario: &draft.usuario,
            estado: draft.estado,
            sector: self.sector,
        };
        let url = format!("{}{USUARIOS_PATH}", self.base_url);
        let response = self.send_json(reqwest::Method::POST, &url, &body).await?;
        HttpUtils::parse_json(&response.body)
    }

    async fn update(&self, id: &str, draft: &UsuarioDraft) -> Result<Usuario> {
        let id = require_id(Some(id), "update")?;
        let body = UpdateUsuarioBody {
            usuario: &draft.usuario,
            estado: draft.estado,
            sector: self.sector,
        };
        let url = self.record_url(id);
        let response = self.send_json(reqwest::Method::PUT, &url, &body).await?;
        HttpUtils::parse_json(&response.body)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(Some(id), "delete")?;
        let url = self.record_url(id);
        let response =
            HttpUtils::execute_request(self.client.delete(&url), "DELETE", &url).await?;
        if response.status == 404 {
            return Err(ApiError::NotFound { id: id.to_string() });
        }
        HttpUtils::ensure_success(response)?;
        Ok(())
    }

    async fn revalidate(&self, path: &str) -> Result<RevalidateResponse> {
        #[derive(Serialize)]
        struct RevalidateBody<'a> {
            path: &'a str,
        }

        let url = format!("{}{REVALIDATE_PATH}", self.base_url);
        let response = self
            .send_json(reqwest::Method::POST, &url, &RevalidateBody { path })
            .await?;
        HttpUtils::parse_json(&response.body)
    }
}
