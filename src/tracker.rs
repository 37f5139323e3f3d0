use chrono::{DateTime, Local};

use crate::duration::format_elapsed;
use crate::models::{Outcome, Status, Verdict};

/// Running availability totals for the watched stream.
///
/// Time between two outcomes is booked against the status the stream held
/// during that gap, which is the status of the earlier outcome. The gap
/// before the very first outcome is booked against that first outcome.
/// Only whole seconds are booked; the remainder rolls into the next gap so
/// uptime plus downtime always equals the whole seconds since `started_at`.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub total_uptime_secs: u64,
    pub total_downtime_secs: u64,
    pub total_outages: u64,
    pub total_bytes: u64,
    pub last_result_time: DateTime<Local>,
    pub last_result: Option<Status>,
    pub last_success_time: DateTime<Local>,
    pub first_run: bool,
}

impl MonitorState {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            total_uptime_secs: 0,
            total_downtime_secs: 0,
            total_outages: 0,
            total_bytes: 0,
            last_result_time: started_at,
            last_result: None,
            last_success_time: started_at,
            first_run: true,
        }
    }

    pub fn record_outcome(&mut self, outcome: &Outcome, now: DateTime<Local>) -> Verdict {
        let elapsed = (now - self.last_result_time).num_seconds().max(0);
        self.last_result_time += chrono::Duration::seconds(elapsed);

        let status = outcome.status();
        match self.last_result.unwrap_or(status) {
            Status::Up => self.total_uptime_secs += elapsed as u64,
            Status::Down => self.total_downtime_secs += elapsed as u64,
        }

        let previous = self.last_result.replace(status);
        let message = match outcome {
            Outcome::Success { bytes_read } => {
                self.total_bytes += *bytes_read as u64;
                let message = if previous == Some(Status::Down) {
                    let down_for = (now - self.last_success_time).num_seconds().max(0);
                    format!("Up after {}", format_elapsed(down_for as u64))
                } else {
                    "Stream is up!".to_string()
                };
                self.last_success_time = now;
                message
            }
            Outcome::Failure { reason } => {
                if previous != Some(Status::Down) {
                    self.total_outages += 1;
                }
                format!("Down (#{}) ({})", self.total_outages, reason)
            }
        };

        Verdict {
            status,
            message,
            transition: previous != Some(status),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} uptime / {} downtime",
            format_elapsed(self.total_uptime_secs),
            format_elapsed(self.total_downtime_secs)
        )
    }
}
