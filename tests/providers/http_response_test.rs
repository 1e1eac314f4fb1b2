//! HTTP response sanitization and truncation tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use outreach::providers::{check_http_response, ProviderError};

/// Serve a single canned HTTP response and return the base URL.
pub async fn serve_once(status_line: &str, content_type: &str, body: &str) -> String {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) => panic!("listener should bind: {err}"),
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(err) => panic!("listener should expose local addr: {err}"),
    };

    let status_line_owned = status_line.to_owned();
    let content_type_owned = content_type.to_owned();
    let body_owned = body.to_owned();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut read_buf = [0_u8; 8192];
            let _ = socket.read(&mut read_buf).await;

            let response = format!(
                "HTTP/1.1 {status_line_owned}\r\nContent-Type: {content_type_owned}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body_owned}",
                body_owned.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn check_http_response_redacts_key_like_values() {
    let raw_key = "AIzaSyA1234567890abcdefghijklmnopqrstu";
    let body = format!("API key not valid: {raw_key}");
    let url = serve_once("400 Bad Request", "text/plain", &body).await;

    let response = match reqwest::get(format!("{url}/")).await {
        Ok(response) => response,
        Err(err) => panic!("request should complete: {err}"),
    };

    match check_http_response(response).await {
        Err(ProviderError::HttpStatus { status, body }) => {
            assert_eq!(status, 400);
            assert!(!body.contains(raw_key));
            assert!(body.contains("[REDACTED]"));
        }
        other => panic!("expected http status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn check_http_response_truncates_long_error_body() {
    let body = "x".repeat(400);
    let url = serve_once("500 Internal Server Error", "text/plain", &body).await;

    let response = match reqwest::get(format!("{url}/")).await {
        Ok(response) => response,
        Err(err) => panic!("request should complete: {err}"),
    };

    match check_http_response(response).await {
        Err(ProviderError::HttpStatus { body, .. }) => {
            assert!(body.ends_with("...[truncated]"));
            assert!(body.len() < 300);
        }
        other => panic!("expected http status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn check_http_response_passes_success_body_through() {
    let url = serve_once("200 OK", "application/json", "{\"ok\":true}").await;

    let response = match reqwest::get(format!("{url}/")).await {
        Ok(response) => response,
        Err(err) => panic!("request should complete: {err}"),
    };

    let body = check_http_response(response).await.expect("success body");
    assert_eq!(body, "{\"ok\":true}");
}
