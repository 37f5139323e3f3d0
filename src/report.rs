use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::Path;
use tracing::debug;

use crate::models::LogKind;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes status lines to the console and the log file, skipping lines whose
/// kind repeats the previous report.
pub struct Reporter<C: Write, L: Write> {
    console: C,
    log: L,
    last_kind: Option<LogKind>,
}

impl Reporter<Stdout, File> {
    pub fn open(path: &Path) -> Result<Self> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self::new(io::stdout(), log))
    }
}

impl<C: Write, L: Write> Reporter<C, L> {
    pub fn new(console: C, log: L) -> Self {
        Self {
            console,
            log,
            last_kind: None,
        }
    }

    /// Returns whether the line was written.
    pub fn report(
        &mut self,
        at: DateTime<Local>,
        message: &str,
        kind: LogKind,
        spacer: bool,
        summary: Option<&str>,
    ) -> io::Result<bool> {
        let emit = kind == LogKind::Log || self.last_kind != Some(kind);
        self.last_kind = Some(kind);
        if !emit {
            debug!(%kind, line = message, "repeated status suppressed");
            return Ok(false);
        }

        let mut output = format!("{}: {}", at.format(TIMESTAMP_FORMAT), message);
        if let Some(summary) = summary {
            output.push_str(&format!(" ({})", summary));
        }
        if spacer {
            output.insert_str(0, "\r\n");
        }

        // Log file first; a failing console must not cost a log line.
        let logged = write!(self.log, "{}\r\n", output).and_then(|_| self.log.flush());
        let shown = writeln!(self.console, "{}", output).and_then(|_| self.console.flush());
        logged.and(shown)?;
        Ok(true)
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (C, L) {
        (self.console, self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 5, 4, 21, 7, 3).unwrap()
    }

    fn reporter() -> Reporter<Vec<u8>, Vec<u8>> {
        Reporter::new(Vec::new(), Vec::new())
    }

    fn log_text(reporter: Reporter<Vec<u8>, Vec<u8>>) -> String {
        String::from_utf8(reporter.into_parts().1).unwrap()
    }

    #[test]
    fn repeated_kinds_are_collapsed() {
        let mut r = reporter();
        let kinds = [LogKind::Success, LogKind::Success, LogKind::Success, LogKind::Error];
        let emitted: Vec<bool> = kinds
            .iter()
            .map(|kind| r.report(at(), "status", *kind, false, None).unwrap())
            .collect();

        assert_eq!(emitted, vec![true, false, false, true]);
        assert_eq!(log_text(r).matches("\r\n").count(), 2);
    }

    #[test]
    fn log_kind_always_emits() {
        let mut r = reporter();
        assert!(r.report(at(), "one", LogKind::Log, false, None).unwrap());
        assert!(r.report(at(), "two", LogKind::Log, false, None).unwrap());
        assert!(r.report(at(), "three", LogKind::Log, false, None).unwrap());
    }

    #[test]
    fn suppressed_call_still_updates_last_kind() {
        let mut r = reporter();
        assert!(r.report(at(), "up", LogKind::Success, false, None).unwrap());
        assert!(!r.report(at(), "up", LogKind::Success, false, None).unwrap());
        assert!(r.report(at(), "mark", LogKind::Log, false, None).unwrap());
        assert!(r.report(at(), "up", LogKind::Success, false, None).unwrap());
    }

    #[test]
    fn line_layout_with_summary_and_spacer() {
        let mut r = reporter();
        r.report(at(), "Down (#1) (refused)", LogKind::Error, true, Some("5 seconds uptime / 0 seconds downtime"))
            .unwrap();
        let (console, log) = r.into_parts();

        assert_eq!(
            String::from_utf8(log).unwrap(),
            "\r\n2020-05-04 21:07:03: Down (#1) (refused) (5 seconds uptime / 0 seconds downtime)\r\n"
        );
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "\r\n2020-05-04 21:07:03: Down (#1) (refused) (5 seconds uptime / 0 seconds downtime)\n"
        );
    }

    struct ClosedConsole;

    impl Write for ClosedConsole {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn broken_console_still_reaches_log_file() {
        let mut r = Reporter::new(ClosedConsole, Vec::new());
        let err = r.report(at(), "Down (#1) (refused)", LogKind::Error, false, None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let (_, log) = r.into_parts();
        assert_eq!(
            String::from_utf8(log).unwrap(),
            "2020-05-04 21:07:03: Down (#1) (refused)\r\n"
        );
    }

    #[test]
    fn open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream_log.txt");
        std::fs::write(&path, "earlier run\r\n").unwrap();

        let mut r = Reporter::open(&path).unwrap();
        r.report(at(), "Logging to somewhere", LogKind::Notice, false, None).unwrap();
        drop(r);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "earlier run\r\n2020-05-04 21:07:03: Logging to somewhere\r\n");
    }
}
