//! Single-shot HTTP GET probe.
//!
//! A probe returns `(status, body)` for any response the server sends,
//! including non-2xx. `ProbeError` is reserved for the case where no
//! response was obtained at all.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HOST, USER_AGENT};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::ProbeError;

/// Status code and fully-read body of a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

/// Issues a single GET against a URL.
pub trait Prober: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<ProbeResponse, ProbeError>> + Send;
}

/// Plain HTTP/1.1 prober over hyper.
#[derive(Debug, Clone, Default)]
pub struct HttpProber {
    timeout: Option<Duration>,
}

impl HttpProber {
    /// A prober with no timeout beyond what the OS imposes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound each request, turning expiry into `ProbeError::Timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Prober for HttpProber {
    async fn get(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch(url))
                .await
                .map_err(|_| ProbeError::Timeout(timeout))?,
            None => fetch(url).await,
        }
    }
}

async fn fetch(url: &str) -> Result<ProbeResponse, ProbeError> {
    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| invalid_url(url, e.to_string()))?;
    if uri.scheme_str() != Some("http") {
        return Err(invalid_url(url, "only http:// urls are supported"));
    }
    let host = uri.host().ok_or_else(|| invalid_url(url, "missing host"))?;
    let port = uri.port_u16().unwrap_or(80);
    let addr = format!("{host}:{port}");

    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ProbeError::Connect {
            addr: addr.clone(),
            source,
        })?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(ProbeError::Handshake)?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "probe connection closed with error");
        }
    });

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let authority = uri.authority().map(|a| a.as_str()).unwrap_or(host);
    let req = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(HOST, authority)
        .header(USER_AGENT, "cedar/0.1")
        .body(Empty::<Bytes>::new())
        .map_err(|e| invalid_url(url, e.to_string()))?;

    let resp = sender.send_request(req).await.map_err(ProbeError::Request)?;
    let status = resp.status().as_u16();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(ProbeError::Body)?
        .to_bytes();

    debug!(%url, status, bytes = body.len(), "probe response");

    Ok(ProbeResponse {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn invalid_url(url: &str, reason: impl Into<String>) -> ProbeError {
    ProbeError::InvalidUrl {
        url: url.to_string(),
        reason: reason.into(),
    }
}
