use crate::errors::{ExtractionError, ExtractionResult};
use crate::models::config::ClientConfig;
use crate::models::payload::{ConnectionTestResponse, ErrorBody, ExtractionResponse};
use crate::models::request::ExtractionRequest;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use url::Url;

pub const EXTRACT_AND_SEPARATE_PATH: &str = "biserver/extract-and-separate";
pub const TEST_CONNECTION_PATH: &str = "biserver/test-connection";

/// Bearer token of the logged-in session
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Result of the BiServer connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected { mock: bool, message: Option<String> },
    Failed(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

/// The backend endpoints the tracker talks to
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Extract, separate and save one facility/period in a single call
    ///
    /// HTTP-level failures come back as [`ExtractionError::Backend`]; a 2xx
    /// body is returned as-is, including `success: false`.
    async fn extract_and_separate(
        &self,
        request: &ExtractionRequest,
        credential: &Credential,
    ) -> ExtractionResult<ExtractionResponse>;

    async fn test_connection(&self, credential: &Credential) -> ExtractionResult<ConnectionTestResponse>;
}

/// [`ExtractionBackend`] over the REST API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ExtractionResult<Self> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> ExtractionResult<Self> {
        Ok(Self {
            client,
            base_url: config.base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ExtractionResult<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl ExtractionBackend for HttpBackend {
    async fn extract_and_separate(
        &self,
        request: &ExtractionRequest,
        credential: &Credential,
    ) -> ExtractionResult<ExtractionResponse> {
        let url = self.endpoint(EXTRACT_AND_SEPARATE_PATH)?;
        log::debug!("POST {} cnes={} competencia={}", url, request.cnes, request.competencia);

        let response = self
            .client
            .post(url)
            .query(&request.query_pairs())
            .bearer_auth(credential.token())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        log::debug!("extract-and-separate answered {} ({} bytes)", status, body.len());
        decode_response(status, &body)
    }

    async fn test_connection(&self, credential: &Credential) -> ExtractionResult<ConnectionTestResponse> {
        let url = self.endpoint(TEST_CONNECTION_PATH)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(credential.token())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        decode_response(status, &body)
    }
}

/// Decode a 2xx body, or turn a non-2xx one into [`ExtractionError::Backend`]
/// carrying its `detail`
pub fn decode_response<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> ExtractionResult<T> {
    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail);
        return Err(ExtractionError::backend(Some(status.as_u16()), detail));
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EXTRACTION_FALLBACK_MESSAGE;

    #[test]
    fn test_decode_error_detail() {
        let err = decode_response::<ExtractionResponse>(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"detail": "timeout upstream"}"#,
        )
        .unwrap_err();
        match err {
            ExtractionError::Backend { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "timeout upstream");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_without_json_body() {
        let err = decode_response::<ExtractionResponse>(StatusCode::BAD_GATEWAY, b"<html>502</html>")
            .unwrap_err();
        assert_eq!(err.user_message(), EXTRACTION_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_decode_success_keeps_success_false_body() {
        let response: ExtractionResponse = decode_response(
            StatusCode::OK,
            br#"{"success": false, "message": "Interrompido", "errors": ["a"]}"#,
        )
        .unwrap();
        assert!(!response.success);
        assert_eq!(response.errors, vec!["a".to_string()]);
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let err = decode_response::<ExtractionResponse>(StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, ExtractionError::SerdeJson(_)));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::bearer("abc.def.ghi");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.token(), "abc.def.ghi");
    }

    #[test]
    fn test_endpoint_join() {
        let backend = HttpBackend::new(&ClientConfig::new("http://localhost:8000/api")).unwrap();
        assert_eq!(
            backend.endpoint(EXTRACT_AND_SEPARATE_PATH).unwrap().as_str(),
            "http://localhost:8000/api/biserver/extract-and-separate"
        );
    }
}
