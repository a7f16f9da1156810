//! In-memory prober that replays a scripted sequence of responses.
//!
//! Intended for tests only. Used across this workspace to drive the retry
//! controller and the deployment lifecycle without a network.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ProbeError;
use crate::prober::{ProbeResponse, Prober};

type Scripted = Result<ProbeResponse, ProbeError>;

#[derive(Default)]
struct Script {
    queue: VecDeque<Scripted>,
    fallback: Option<ProbeResponse>,
    requests: Vec<String>,
}

/// Replays queued responses in order, then the fallback if one is set.
///
/// Clones share the same script and request log.
#[derive(Clone, Default)]
pub struct ScriptedProber {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses with the given status codes and `"status {code}"` bodies.
    pub fn with_statuses(statuses: &[u16]) -> Self {
        let queue = statuses
            .iter()
            .map(|&status| {
                Ok(ProbeResponse {
                    status,
                    body: format!("status {status}"),
                })
            })
            .collect();
        Self {
            script: Arc::new(Mutex::new(Script {
                queue,
                ..Script::default()
            })),
        }
    }

    pub async fn push_response(&self, status: u16, body: &str) {
        self.script.lock().await.queue.push_back(Ok(ProbeResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub async fn push_error(&self, error: ProbeError) {
        self.script.lock().await.queue.push_back(Err(error));
    }

    /// Response returned once the queue is drained.
    pub async fn set_fallback(&self, status: u16, body: &str) {
        self.script.lock().await.fallback = Some(ProbeResponse {
            status,
            body: body.to_string(),
        });
    }

    /// Every URL requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.script.lock().await.requests.clone()
    }
}

impl Prober for ScriptedProber {
    async fn get(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let mut script = self.script.lock().await;
        script.requests.push(url.to_string());
        match script.queue.pop_front() {
            Some(next) => next,
            None => match &script.fallback {
                Some(resp) => Ok(resp.clone()),
                None => Err(ProbeError::Connect {
                    addr: url.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotConnected,
                        "probe script exhausted",
                    ),
                }),
            },
        }
    }
}
