//! Direct access to the upstream usuarios store.
//!
//! The server-side prefetch skips the `/api/usuarios` proxy and talks to the
//! json-server style store itself: the body is a bare array and the total is
//! carried in the `x-total-count` header.

use crate::error::{ApiError, Result};
use crate::http_client::{HttpUtils, RawResponse};
use crate::types::{ListQuery, Pagination, Usuario, UsuariosPage};

/// Client for the upstream store.
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    /// `url` is the collection endpoint, e.g. `http://api.internal/usuarios`.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ApiError::InvalidParameter {
                param: "upstream_url".to_string(),
                detail: "upstream URL is not configured".to_string(),
            });
        }
        Ok(Self { client, url })
    }

    /// Build the request URL. Sorting is not forwarded upstream.
    fn page_url(&self, query: &ListQuery) -> String {
        let unsorted = ListQuery {
            sort: crate::types::Sort {
                order: crate::types::SortOrder::None,
                ..query.sort.clone()
            },
            ..query.clone()
        };
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{}", self.url, unsorted.to_query_string())
    }

    /// Fetch one page, deriving pagination from `x-total-count`.
    pub async fn fetch_page(&self, query: &ListQuery) -> Result<UsuariosPage> {
        let url = self.page_url(query);
        let response = HttpUtils::execute_request(self.client.get(&url), "GET", &url).await?;
        let response = HttpUtils::ensure_success(response)?;
        page_from_upstream(query, &response)
    }
}

/// Assemble a page from a bare-array upstream response.
///
/// A missing or non-numeric `x-total-count` counts as zero, matching the
/// proxy's behaviour.
pub(crate) fn page_from_upstream(query: &ListQuery, response: &RawResponse) -> Result<UsuariosPage> {
    let data: Vec<Usuario> = HttpUtils::parse_json(&response.body)?;
    let total = response.total_count.unwrap_or(0);
    Ok(UsuariosPage {
        data,
        pagination: Pagination::new(query.page, query.limit, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserStatus;

    fn raw(total_count: Option<u64>, body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            total_count,
            body: body.to_string(),
        }
    }

    #[test]
    fn rejects_empty_url() {
        assert!(UpstreamClient::new(reqwest::Client::new(), " ").is_err());
    }

    #[test]
    fn page_url_appends_to_existing_query() {
        let upstream =
            UpstreamClient::new(reqwest::Client::new(), "http://store/usuarios?sector=5000")
                .unwrap_or_else(|e| panic!("{e}"));
        let query = ListQuery {
            limit: 10,
            estado: Some(UserStatus::Active),
            ..ListQuery::default()
        };
        assert_eq!(
            upstream.page_url(&query),
            "http://store/usuarios?sector=5000&_page=1&_limit=10&estado=ACTIVO"
        );
    }

    #[test]
    fn page_from_header_total() {
        let query = ListQuery {
            limit: 10,
            ..ListQuery::default()
        };
        let body = r#"[{"id":"1","usuario":"ana","estado":"ACTIVO","sector":5000}]"#;
        let page = page_from_upstream(&query, &raw(Some(21), body)).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination, Pagination::new(1, 10, 21));
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn missing_header_means_zero_total() {
        let page = page_from_upstream(&ListQuery::default(), &raw(None, "[]"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[test]
    fn non_array_body_is_parse_error() {
        let result = page_from_upstream(&ListQuery::default(), &raw(Some(1), r#"{"data":[]}"#));
        assert!(matches!(result, Err(ApiError::ParseError { .. })));
    }
}
