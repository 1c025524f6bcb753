//! Exercises `NpmRegistry` against a canned local HTTP server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use depsnap_core::config::RegistryConfig;
use depsnap_registry::npm::NpmRegistry;
use depsnap_registry::oracle::VersionOracle;
use depsnap_util::errors::DepsnapError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `routes` (path → (status, body)) until the test ends.
async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, s, b)| (p.to_string(), (s, b.to_string())))
            .collect(),
    );

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, "{\"error\":\"Not found\"}".to_string()));
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Answer every request with the next of `responses`, repeating the last one.
/// The counter records how many requests arrived.
async fn serve_sequence(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let (status, body) = responses[n.min(responses.len() - 1)];
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), hits)
}

fn registry(url: &str) -> NpmRegistry {
    registry_with_retries(url, 0)
}

fn registry_with_retries(url: &str, retries: u32) -> NpmRegistry {
    NpmRegistry::new(&RegistryConfig {
        url: url.to_string(),
        timeout_secs: 5,
        retries,
        token: None,
    })
    .unwrap()
}

#[tokio::test]
async fn direct_dependencies_of_pinned_version() {
    let url = serve(vec![(
        "/app/1.0.0",
        200,
        r#"{"name":"app","version":"1.0.0","dependencies":{"lib-a":"^1.0.0"}}"#,
    )])
    .await;
    let deps = registry(&url)
        .direct_dependencies("app", Some("1.0.0"))
        .await
        .unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps["lib-a"], "^1.0.0");
}

#[tokio::test]
async fn name_only_query_hits_latest() {
    let url = serve(vec![(
        "/lib-a/latest",
        200,
        r#"{"name":"lib-a","version":"1.2.0","dependencies":{"lib-b":"^2.0.0"}}"#,
    )])
    .await;
    let deps = registry(&url)
        .direct_dependencies("lib-a", None)
        .await
        .unwrap();
    assert_eq!(deps["lib-b"], "^2.0.0");
}

#[tokio::test]
async fn missing_dependencies_field_is_empty() {
    let url = serve(vec![("/leaf/latest", 200, r#"{"name":"leaf","version":"1.0.0"}"#)]).await;
    let deps = registry(&url)
        .direct_dependencies("leaf", None)
        .await
        .unwrap();
    assert!(deps.is_empty());
}

#[tokio::test]
async fn published_versions_from_packument() {
    let url = serve(vec![(
        "/lib-b",
        200,
        r#"{"name":"lib-b","dist-tags":{"latest":"2.3.0"},"versions":{"2.0.0":{},"2.3.0":{},"3.0.0-rc.1":{}}}"#,
    )])
    .await;
    let mut versions = registry(&url).published_versions("lib-b").await.unwrap();
    versions.sort();
    assert_eq!(versions, vec!["2.0.0", "2.3.0", "3.0.0-rc.1"]);
}

#[tokio::test]
async fn scoped_package_path_is_escaped() {
    let url = serve(vec![(
        "/@types%2fnode",
        200,
        r#"{"name":"@types/node","versions":{"20.1.0":{}}}"#,
    )])
    .await;
    let versions = registry(&url)
        .published_versions("@types/node")
        .await
        .unwrap();
    assert_eq!(versions, vec!["20.1.0"]);
}

#[tokio::test]
async fn not_found_is_oracle_error() {
    let url = serve(vec![]).await;
    let err = registry(&url)
        .published_versions("ghost")
        .await
        .unwrap_err();
    match err {
        DepsnapError::Oracle { package, message } => {
            assert_eq!(package, "ghost");
            assert!(message.contains("not found"), "got: {message}");
        }
        other => panic!("expected oracle error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_oracle_error_after_retries() {
    let url = serve(vec![("/flaky", 500, "{}")]).await;
    let err = registry(&url).published_versions("flaky").await.unwrap_err();
    assert!(matches!(err, DepsnapError::Oracle { .. }));
    assert!(err.to_string().contains("Failed after 1 attempts"), "got: {err}");
}

#[tokio::test]
async fn malformed_body_is_oracle_error() {
    let url = serve(vec![("/broken/latest", 200, "not json")]).await;
    let err = registry(&url)
        .direct_dependencies("broken", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid JSON"), "got: {err}");
}

#[tokio::test]
async fn server_error_then_success_is_retried() {
    let (url, hits) = serve_sequence(vec![
        (500, "{}"),
        (200, r#"{"name":"lib","versions":{"1.0.0":{}}}"#),
    ])
    .await;
    let versions = registry_with_retries(&url, 1)
        .published_versions("lib")
        .await
        .unwrap();
    assert_eq!(versions, vec!["1.0.0"]);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistent_server_error_exhausts_retries() {
    let (url, hits) = serve_sequence(vec![(503, "{}")]).await;
    let err = registry_with_retries(&url, 2)
        .published_versions("lib")
        .await
        .unwrap_err();
    assert!(matches!(err, DepsnapError::Oracle { .. }));
    assert!(err.to_string().contains("Failed after 3 attempts"), "got: {err}");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let (url, hits) = serve_sequence(vec![(404, "{}")]).await;
    let err = registry_with_retries(&url, 2)
        .published_versions("ghost")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "got: {err}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
