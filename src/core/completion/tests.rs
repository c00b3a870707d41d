use super::*;
use crate::core::constants::NO_RESPONSE_TEXT;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

struct CapturedRequest {
    head: String,
    body: String,
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk).await.expect("read request");
        assert!(read > 0, "client closed before sending a full request");
        buffer.extend_from_slice(&chunk[..read]);

        if let Some(header_end) = find_header_end(&buffer) {
            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let body_start = header_end + 4;
            let body_end = body_start + content_length(&head);
            if buffer.len() >= body_end {
                let body = String::from_utf8_lossy(&buffer[body_start..body_end]).to_string();
                return CapturedRequest { head, body };
            }
        }
    }
}

/// Serves exactly one HTTP exchange and reports what the client sent.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut stream).await;
        let _ = tx.send(request);
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = stream.shutdown().await;
    });

    (format!("http://{addr}"), rx)
}

fn client_for(base_url: &str, timeout: Option<Duration>) -> GeminiClient {
    let http = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("http client");
    GeminiClient::with_http_client(
        http,
        ApiKey::new("secret-key"),
        GeminiSettings {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            system_instruction: "You are a test.".to_string(),
            timeout,
        },
    )
}

#[tokio::test]
async fn successful_reply_is_extracted() {
    let (base_url, captured) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hi there"}]}}]}"#,
    )
    .await;
    let client = client_for(&base_url, Some(Duration::from_secs(5)));

    let reply = client.complete("hello", &[]).await;
    assert_eq!(reply, Ok("Hi there".to_string()));

    let request = captured.await.expect("request captured");
    let request_line = request.head.lines().next().unwrap_or_default();
    assert!(
        request_line.starts_with("POST /models/test-model:generateContent "),
        "unexpected request line: {request_line}"
    );
    assert!(!request_line.contains("secret-key"));
    assert!(request
        .head
        .to_ascii_lowercase()
        .contains("x-goog-api-key: secret-key"));

    let body: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(
        body,
        serde_json::json!({
            "contents": [
                {"role": "user", "parts": [{"text": "You are a test."}]},
                {"role": "user", "parts": [{"text": "hello"}]}
            ]
        })
    );
}

#[tokio::test]
async fn history_is_not_transmitted() {
    let (base_url, captured) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"again"}]}}]}"#,
    )
    .await;
    let client = client_for(&base_url, None);
    let history = vec![
        Turn::user(crate::core::message::TurnId(0), "earlier question"),
        Turn::pending_assistant(crate::core::message::TurnId(1)),
    ];

    let reply = client.complete("next", &history).await;
    assert_eq!(reply, Ok("again".to_string()));

    let request = captured.await.expect("request captured");
    assert!(!request.body.contains("earlier question"));
}

#[tokio::test]
async fn empty_candidates_degrade_to_no_response() {
    let (base_url, _captured) = serve_once("200 OK", r#"{"candidates":[]}"#).await;
    let client = client_for(&base_url, Some(Duration::from_secs(5)));

    let reply = client.complete("hello", &[]).await;
    assert_eq!(reply, Ok(NO_RESPONSE_TEXT.to_string()));
}

#[tokio::test]
async fn failure_status_is_a_provider_error() {
    let (base_url, _captured) = serve_once(
        "403 Forbidden",
        r#"{"error":{"code":403,"message":"API key not valid.   Please pass a valid key.","status":"PERMISSION_DENIED"}}"#,
    )
    .await;
    let client = client_for(&base_url, Some(Duration::from_secs(5)));

    let reply = client.complete("hello", &[]).await;
    assert_eq!(
        reply,
        Err(CompletionError::ProviderError {
            status: Some(403),
            message: "API key not valid. Please pass a valid key.".to_string(),
        })
    );
}

#[tokio::test]
async fn malformed_success_body_is_a_provider_error() {
    let (base_url, _captured) = serve_once("200 OK", "<html>gateway</html>").await;
    let client = client_for(&base_url, Some(Duration::from_secs(5)));

    match client.complete("hello", &[]).await {
        Err(CompletionError::ProviderError { status, message }) => {
            assert_eq!(status, Some(200));
            assert!(message.starts_with("malformed response body"), "{message}");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = client_for(&format!("http://{addr}"), Some(Duration::from_secs(5)));
    match client.complete("hello", &[]).await {
        Err(CompletionError::NetworkFailure(_)) => {}
        other => panic!("expected network failure, got {other:?}"),
    }
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let limit = Duration::from_millis(150);
    let client = client_for(&format!("http://{addr}"), Some(limit));
    let reply = client.complete("hello", &[]).await;
    assert_eq!(reply, Err(CompletionError::Timeout(limit)));
    server.abort();
}

#[test]
fn api_key_debug_is_redacted() {
    let key = ApiKey::new("super-secret");
    assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");

    let client = client_for("https://example.invalid", None);
    assert!(!format!("{client:?}").contains("secret-key"));
}

#[test]
fn error_bodies_are_summarized() {
    assert_eq!(summarize_error_body("  "), "<empty body>");
    assert_eq!(
        summarize_error_body(r#"{"error":"quota exceeded"}"#),
        "quota exceeded"
    );
    assert_eq!(
        summarize_error_body(r#"{"message":"bad\n  request"}"#),
        "bad request"
    );
    assert_eq!(summarize_error_body("upstream\nconnect error"), "upstream connect error");

    let long = "x".repeat(500);
    let summary = summarize_error_body(&long);
    assert_eq!(summary.chars().count(), 201);
    assert!(summary.ends_with('…'));
}

#[test]
fn errors_render_for_logs() {
    assert_eq!(
        CompletionError::ProviderError {
            status: Some(500),
            message: "boom".into()
        }
        .to_string(),
        "Provider error (500): boom"
    );
    assert_eq!(
        CompletionError::Timeout(Duration::from_millis(1500)).to_string(),
        "Timed out after 1.5s"
    );
    assert_eq!(
        CompletionError::NetworkFailure("refused".into()).to_string(),
        "Network failure: refused"
    );
}
