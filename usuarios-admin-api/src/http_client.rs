//! Shared HTTP plumbing
//!
//! Every client in this crate builds its own `RequestBuilder` and hands it to
//! [`HttpUtils`], which sends it, logs the exchange and turns transport and
//! status failures into [`ApiError`]s. No request is ever retried: a failed
//! call is surfaced and the user re-triggers the action.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Header carrying the total record count on the upstream store.
pub(crate) const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// What is left of a response once the body has been read.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u16,
    /// Parsed `x-total-count`, when present and numeric.
    pub total_count: Option<u64>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP tool function set
pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Send a request and read the whole body.
    ///
    /// Only transport failures are errors here; status codes are left to
    /// [`ensure_success`](Self::ensure_success).
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<RawResponse, ApiError> {
        log::debug!("{method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ApiError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("Response Status: {status}");

        let total_count = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkError {
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("Response Body: {}", truncate_for_log(&body));

        Ok(RawResponse {
            status,
            total_count,
            body,
        })
    }

    /// Map a non-2xx response to [`ApiError::HttpStatus`].
    pub fn ensure_success(response: RawResponse) -> Result<RawResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        let raw_message = error_message(&response.body);
        let err = ApiError::HttpStatus {
            status: response.status,
            raw_message,
        };
        if err.is_expected() {
            log::warn!("{err}");
        } else {
            log::error!("{err}");
        }
        Err(err)
    }

    /// Parse a JSON body.
    pub fn parse_json<T>(body: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!("JSON parse failed: {e}");
            log::error!("Raw response: {}", truncate_for_log(body));
            ApiError::ParseError {
                detail: e.to_string(),
            }
        })
    }
}

/// Pull a human message out of an error body.
///
/// The proxy answers `{ "error": ".." }`, some upstreams `{ "message": ".." }`;
/// anything else is returned verbatim when non-empty.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(serde_json::Value::as_str) {
                return Some(msg.to_string());
            }
        }
    }
    Some(truncate_for_log(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            total_count: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"duplicado","error":"x"}"#).as_deref(),
            Some("duplicado")
        );
    }

    #[test]
    fn error_message_falls_back_to_error_field() {
        assert_eq!(
            error_message(r#"{"error":"Error al crear el usuario"}"#).as_deref(),
            Some("Error al crear el usuario")
        );
    }

    #[test]
    fn error_message_plain_text_and_empty() {
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("   "), None);
    }

    #[test]
    fn ensure_success_passes_2xx() {
        assert!(HttpUtils::ensure_success(raw(201, "{}")).is_ok());
        assert!(HttpUtils::ensure_success(raw(204, "")).is_ok());
    }

    #[test]
    fn ensure_success_maps_status() {
        let result = HttpUtils::ensure_success(raw(500, r#"{"error":"boom"}"#));
        assert!(
            matches!(
                &result,
                Err(ApiError::HttpStatus { status: 500, raw_message: Some(m) }) if m == "boom"
            ),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn parse_json_invalid() {
        let result: Result<Vec<u32>, ApiError> = HttpUtils::parse_json("not json");
        assert!(
            matches!(&result, Err(ApiError::ParseError { .. })),
            "unexpected parse result: {result:?}"
        );
    }
}
