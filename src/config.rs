use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://live.str3am.com:3010/live";
pub const LOG_FILE_NAME: &str = "rv_stream_tester_log.txt";

#[derive(Debug, Clone, Parser)]
#[command(name = "stream-watchdog", version, about = "Watch a live stream and log when it goes up or down")]
pub struct MonitorConfig {
    /// Stream URL to monitor.
    #[arg(long, env = "STREAM_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Seconds to wait for a connection or a chunk before calling the stream down.
    #[arg(long, env = "STREAM_TIMEOUT", default_value_t = 1.0)]
    pub timeout: f64,

    /// Log file; defaults to rv_stream_tester_log.txt next to the executable.
    #[arg(long, env = "STREAM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Bytes to read per chunk.
    #[arg(long, default_value_t = default_chunk_size())]
    pub chunk_size: usize,

    /// Milliseconds to pause after a failed probe.
    #[arg(long, default_value_t = default_retry_delay_ms())]
    pub retry_delay: u64,

    /// Keep the bytes of the current connection in this file.
    #[arg(long)]
    pub capture_file: Option<PathBuf>,
}

fn default_chunk_size() -> usize { 50 * 1024 }
fn default_retry_delay_ms() -> u64 { 1000 }

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.timeout.is_finite() && self.timeout > 0.0) {
            bail!("timeout must be a positive number of seconds, got {}", self.timeout);
        }
        Duration::try_from_secs_f64(self.timeout)
            .with_context(|| format!("timeout of {} seconds is out of range", self.timeout))?;
        if self.chunk_size == 0 {
            bail!("chunk size must be at least one byte");
        }
        reqwest::Url::parse(&self.url).with_context(|| format!("Invalid stream URL {}", self.url))?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::MAX)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe().context("Failed to locate executable")?;
        let dir = exe
            .parent()
            .context("Executable has no parent directory")?;
        Ok(dir.join(LOG_FILE_NAME))
    }
}
