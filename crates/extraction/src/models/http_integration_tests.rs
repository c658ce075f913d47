use crate::errors::CONNECTION_FALLBACK_MESSAGE;
use crate::models::backend::{ConnectionStatus, Credential, ExtractionBackend, HttpBackend};
use crate::models::config::ClientConfig;
use crate::models::delay::NoDelay;
use crate::models::log_entry::Severity;
use crate::models::orchestrator::ExtractionOrchestrator;
use crate::models::phase::Phase;
use crate::models::request::{Cnes, Competencia, ExtractionRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// Loopback tests against the real reqwest client: a one-shot server answers
// with a canned response and hands back the raw request it received

async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
            if received.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&received).to_string()
    });

    (format!("http://{}/api", addr), handle)
}

fn backend_for(api_url: &str) -> HttpBackend {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpBackend::with_client(client, &ClientConfig::new(api_url)).unwrap()
}

fn request() -> ExtractionRequest {
    ExtractionRequest::new(
        Cnes::parse("2467968").unwrap(),
        Competencia::parse("202501").unwrap(),
    )
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_extraction_over_http() {
        let body = r#"{"success": true, "message": "ok", "stats": {"extracted": {"total": 500, "removed": 20}, "saved": {"bpa_i": 300, "bpa_c": 180}, "valores": {"total": 45230.50}}, "errors": []}"#;
        let (api_url, server) = serve_once("200 OK", body).await;
        let mut tracker = ExtractionOrchestrator::with_delay(backend_for(&api_url), NoDelay);

        let result = tracker.run(&request(), &Credential::bearer("tok")).await;

        assert!(result.success);
        assert_eq!(result.saved_count, 480);
        assert!(result.errors.is_empty());
        assert_eq!(tracker.state().current_phase(), Some(Phase::Complete));

        let raw = server.await.unwrap();
        let request_line = raw.lines().next().unwrap_or_default();
        assert_eq!(
            request_line,
            "POST /api/biserver/extract-and-separate?cnes=2467968&competencia=202501 HTTP/1.1"
        );
        assert!(raw.to_lowercase().contains("authorization: bearer tok"));
        assert!(!raw.to_lowercase().contains("content-type"));
    }

    #[tokio::test]
    async fn test_http_500_routes_to_error_phase() {
        let (api_url, server) =
            serve_once("500 Internal Server Error", r#"{"detail": "timeout upstream"}"#).await;
        let mut tracker = ExtractionOrchestrator::with_delay(backend_for(&api_url), NoDelay);

        let result = tracker.run(&request(), &Credential::bearer("tok")).await;
        server.await.unwrap();

        assert!(!result.success);
        assert_eq!(result.summary_message, "timeout upstream");
        assert_eq!(tracker.state().current_phase(), Some(Phase::Error));
        assert_eq!(
            tracker.state().ledger().last().map(|e| e.severity),
            Some(Severity::Error)
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_transport_failure() {
        // bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut tracker =
            ExtractionOrchestrator::with_delay(backend_for(&format!("http://{}/api", addr)), NoDelay);
        let result = tracker.run(&request(), &Credential::bearer("tok")).await;

        assert!(!result.success);
        assert_eq!(result.summary_message, CONNECTION_FALLBACK_MESSAGE);
        assert_eq!(tracker.state().current_phase(), Some(Phase::Error));
        let last = tracker.state().ledger().last().unwrap();
        assert_eq!(last.message, "Falha na extração");
        assert!(last.details.as_deref().unwrap_or_default().starts_with("Transport error"));
    }

    #[tokio::test]
    async fn test_connection_check_over_http() {
        let (api_url, server) = serve_once(
            "200 OK",
            r#"{"success": true, "mock": true, "message": "Modo mock ativo"}"#,
        )
        .await;
        let backend = backend_for(&api_url);

        let raw_response = backend.test_connection(&Credential::bearer("tok")).await.unwrap();
        assert!(raw_response.mock);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /api/biserver/test-connection HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_connection_check_unauthorized() {
        let (api_url, server) = serve_once("401 Unauthorized", r#"{"detail": "Token inválido"}"#).await;
        let tracker = ExtractionOrchestrator::with_delay(backend_for(&api_url), NoDelay);

        let status = tracker.check_connection(&Credential::bearer("expired")).await;
        server.await.unwrap();

        assert_eq!(status, ConnectionStatus::Failed("Token inválido".to_string()));
    }
}
