use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::models::{LogKind, Outcome, Status};
use crate::probe::Probe;
use crate::report::Reporter;
use crate::tracker::MonitorState;

pub struct Monitor<P, C, W: Write, L: Write> {
    probe: P,
    clock: C,
    reporter: Reporter<W, L>,
    state: MonitorState,
    retry_delay: Duration,
}

impl<P: Probe, C: Clock, W: Write, L: Write> Monitor<P, C, W, L> {
    pub fn new(probe: P, clock: C, reporter: Reporter<W, L>, retry_delay: Duration) -> Self {
        let state = MonitorState::new(clock.now());
        Self {
            probe,
            clock,
            reporter,
            state,
            retry_delay,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Write the startup lines that name the target and the log file.
    pub fn announce(&mut self, url: &str, timeout: Duration, log_path: &str) {
        let banner = format!(
            "Monitoring {} with a timeout of {} seconds",
            url,
            timeout.as_secs_f64()
        );
        self.emit(&banner, LogKind::Log, true, false);
        self.emit(&format!("Logging to {}", log_path), LogKind::Notice, false, false);
    }

    /// Probe until `shutdown` resolves, then write the closing line.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        info!("Stream monitor active, pausing {:?} after failures", self.retry_delay);

        loop {
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                outcome = self.probe.next_outcome() => outcome,
            };

            if self.process_outcome(outcome) == Status::Down {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = self.clock.sleep(self.retry_delay) => {}
                }
            }
        }

        info!("Shutdown signal received. Closing stream monitor...");
        let summary = self.state.summary();
        self.emit("Done logging.", LogKind::Log, false, true);
        info!(
            outages = self.state.total_outages,
            bytes = self.state.total_bytes,
            "Final totals: {}",
            summary
        );
    }

    /// Fold one probe outcome into the totals and report it.
    pub fn process_outcome(&mut self, outcome: Outcome) -> Status {
        let now = self.clock.now();
        let verdict = self.state.record_outcome(&outcome, now);

        if verdict.transition {
            match verdict.status {
                Status::Up => info!("[CHANGE] stream -> Up"),
                Status::Down => warn!("[CHANGE] stream -> Down: {}", verdict.message),
            }
        }

        let spacer = verdict.status == Status::Down && verdict.transition;
        let summary = !self.state.first_run;
        self.emit(&verdict.message, verdict.status.into(), spacer, summary);
        self.state.first_run = false;

        verdict.status
    }

    fn emit(&mut self, message: &str, kind: LogKind, spacer: bool, summary: bool) {
        let summary = summary.then(|| self.state.summary());
        let at = self.clock.now();
        if let Err(e) = self.reporter.report(at, message, kind, spacer, summary.as_deref()) {
            error!("Failed to write status line: {}", e);
        }
    }

    #[cfg(test)]
    pub fn into_reporter(self) -> Reporter<W, L> {
        self.reporter
    }
}
