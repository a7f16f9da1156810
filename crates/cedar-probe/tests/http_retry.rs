//! Retry controller over a real socket.
//!
//! A local listener answers with a scripted sequence of statuses, one
//! connection per request.

use std::time::Duration;

use cedar_probe::{CurlError, CurlTracker, HttpProber, RetryPolicy};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn serve_sequence(responses: Vec<(u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status} Scripted\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        backoff: Duration::from_millis(10),
        max_attempts: None,
    }
}

#[tokio::test]
async fn retries_over_http_until_ok() {
    let base = serve_sequence(vec![(503, "starting"), (404, "no route"), (200, "ready")]).await;
    let mut tracker = CurlTracker::new(5, fast_policy());

    let body = tracker.curl(&HttpProber::new(), &base).await.unwrap();
    assert_eq!(body, "ready");
    assert_eq!(tracker.attempted(), 3);
    assert_eq!(tracker.failed(), 2);
}

#[tokio::test]
async fn permanent_status_over_http() {
    let base = serve_sequence(vec![(500, "internal")]).await;
    let mut tracker = CurlTracker::new(5, fast_policy());

    let err = tracker
        .curl(&HttpProber::new(), &format!("{base}/stress"))
        .await
        .unwrap_err();
    match err {
        CurlError::Status { url, status, body } => {
            assert_eq!(url, format!("{base}/stress"));
            assert_eq!(status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn refused_connection_is_not_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let mut tracker = CurlTracker::new(5, fast_policy());

    let err = tracker
        .curl(&HttpProber::new(), &format!("http://{addr}"))
        .await
        .unwrap_err();
    assert!(matches!(err, CurlError::Transport { .. }));
    assert_eq!(tracker.attempted(), 1);
    assert_eq!(tracker.failed(), 0);
}
