//! `ReqwestTransport` against a local HTTP server
//!
//! Checks which calls the per-request timeout applies to. The server
//! answers each path after a configurable delay.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use filety_core::api::transcriptions::{HEALTH_PATH, START_PATH, STATUS_PATH};
use filety_core::models::AnonymousIdentity;
use filety_core::{ApiClient, ClientConfig, Error, TranscriptionWorkflow, UploadFile};

#[derive(Clone)]
struct Reply {
    delay: Duration,
    body: &'static str,
}

/// Serve `routes` on an ephemeral port and return the base URL
async fn serve(routes: HashMap<&'static str, Reply>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let _ = handle(stream, &routes).await;
            });
        }
    });

    format!("http://{}", addr)
}

async fn handle(mut stream: TcpStream, routes: &HashMap<&'static str, Reply>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .split('?')
        .next()
        .unwrap_or("/")
        .to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() - header_end < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let (status, reply) = match routes.get(path.as_str()) {
        Some(reply) => ("200 OK", reply.clone()),
        None => (
            "404 Not Found",
            Reply {
                delay: Duration::ZERO,
                body: r#"{"detail":"Not Found"}"#,
            },
        ),
    };
    tokio::time::sleep(reply.delay).await;

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply.body.len(),
        reply.body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn config(base_url: String) -> ClientConfig {
    ClientConfig {
        request_timeout: Duration::from_secs(1),
        poll_interval: Duration::from_millis(100),
        deadline: Duration::from_secs(30),
        ..ClientConfig::with_base_url(base_url)
    }
}

fn identity() -> AnonymousIdentity {
    AnonymousIdentity {
        id: "anon-1".to_string(),
        created_at: chrono::Utc::now(),
        used_seconds: 0,
        limit_seconds: 600,
    }
}

// ============================================================================
// Timeouts
// ============================================================================

#[tokio::test]
async fn test_slow_upload_outlives_request_timeout() {
    let base_url = serve(HashMap::from([
        (
            START_PATH,
            Reply {
                delay: Duration::from_millis(1500),
                body: r#"{"task_id":"t-1"}"#,
            },
        ),
        (
            STATUS_PATH,
            Reply {
                delay: Duration::from_millis(1200),
                body: r#"{"status":"done","transcription":"long recording"}"#,
            },
        ),
    ]))
    .await;

    let config = config(base_url);
    let client = ApiClient::new(&config).unwrap();
    let workflow = TranscriptionWorkflow::new(client, &config);

    let outcome = workflow
        .run(UploadFile::new("lecture.mp3", vec![1u8; 64 * 1024]), &identity())
        .await
        .unwrap();

    assert_eq!(outcome.task_id, "t-1");
    assert_eq!(outcome.transcription.as_deref(), Some("long recording"));
    assert_eq!(outcome.polls, 1);
}

#[tokio::test]
async fn test_slow_health_hits_request_timeout() {
    let base_url = serve(HashMap::from([(
        HEALTH_PATH,
        Reply {
            delay: Duration::from_millis(1500),
            body: r#"{"status":"ok"}"#,
        },
    )]))
    .await;

    let client = ApiClient::new(&config(base_url)).unwrap();
    let err = client.health().await.unwrap_err();

    assert_eq!(err, Error::Transport("Request timed out".to_string()));
}

#[tokio::test]
async fn test_fast_health_within_timeout() {
    let base_url = serve(HashMap::from([(
        HEALTH_PATH,
        Reply {
            delay: Duration::ZERO,
            body: r#"{"status":"ok"}"#,
        },
    )]))
    .await;

    let client = ApiClient::new(&config(base_url)).unwrap();
    assert_eq!(client.health().await.unwrap().status, "ok");
}
