use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use std::error::Error as _;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::MonitorConfig;
use crate::models::Outcome;

/// Something the monitor can poll for the next up/down observation.
pub trait Probe {
    fn next_outcome(&mut self) -> impl Future<Output = Outcome>;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("{0}")]
    Connect(String),
    #[error("HTTP Error {}: {}", .0.as_u16(), .0.canonical_reason().unwrap_or(""))]
    Status(StatusCode),
    #[error("read failed: {0}")]
    Read(String),
    #[error("No chunk was downloaded!")]
    EmptyChunk,
}

/// Reads a live HTTP stream one bounded chunk at a time.
///
/// The response is kept between calls so each chunk counts as a fresh
/// success. Any failure drops the connection; the next call reconnects.
pub struct HttpProbe {
    client: Client,
    url: String,
    timeout: Duration,
    chunk_size: usize,
    capture_path: Option<PathBuf>,
    session: Option<Session>,
}

struct Session {
    response: Response,
    capture: Option<File>,
}

impl HttpProbe {
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout: config.timeout(),
            chunk_size: config.chunk_size,
            capture_path: config.capture_file.clone(),
            session: None,
        })
    }

    async fn connect(&self) -> Result<Session, ProbeError> {
        debug!(url = %self.url, "opening stream");
        let response = tokio::time::timeout(self.timeout, self.client.get(&self.url).send())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| ProbeError::Connect(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }

        let capture = match &self.capture_path {
            Some(path) => match File::create(path).await {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("Chunk capture disabled, cannot create {}: {}", path.display(), e);
                    None
                }
            },
            None => None,
        };

        Ok(Session { response, capture })
    }

    async fn read_chunk(&mut self) -> Result<usize, ProbeError> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => self.connect().await?,
        };

        let mut received = 0;
        while received < self.chunk_size {
            let bytes = match tokio::time::timeout(self.timeout, session.response.chunk()).await {
                Err(_) if received > 0 => break,
                Err(_) => return Err(ProbeError::Timeout(self.timeout)),
                Ok(Err(e)) => return Err(ProbeError::Read(describe(&e))),
                Ok(Ok(Some(bytes))) if !bytes.is_empty() => bytes,
                Ok(Ok(_)) if received > 0 => break,
                Ok(Ok(_)) => return Err(ProbeError::EmptyChunk),
            };
            received += bytes.len();

            if let Some(file) = session.capture.as_mut() {
                let written = async {
                    file.write_all(&bytes).await?;
                    file.flush().await
                };
                if let Err(e) = written.await {
                    warn!("Chunk capture stopped: {}", e);
                    session.capture = None;
                }
            }
        }

        self.session = Some(session);
        Ok(received)
    }
}

impl Probe for HttpProbe {
    async fn next_outcome(&mut self) -> Outcome {
        match self.read_chunk().await {
            Ok(bytes_read) => {
                debug!(bytes_read, "chunk received");
                Outcome::Success { bytes_read }
            }
            Err(e) => Outcome::Failure { reason: e.to_string() },
        }
    }
}

// reqwest's top-level message hides the cause ("error sending request"), so
// fold the source chain into the reason.
fn describe(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
