use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Up,
    Down,
}

/// Result of a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { bytes_read: usize },
    Failure { reason: String },
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Success { .. } => Status::Up,
            Outcome::Failure { .. } => Status::Down,
        }
    }
}

/// Tag used by the reporter to collapse repeated lines.
///
/// `Log` lines are always written; every other kind is written only when it
/// differs from the kind of the previous report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Log,
    Notice,
    Success,
    Error,
}

impl From<Status> for LogKind {
    fn from(status: Status) -> Self {
        match status {
            Status::Up => LogKind::Success,
            Status::Down => LogKind::Error,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogKind::Log => "log",
            LogKind::Notice => "log2",
            LogKind::Success => "success",
            LogKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// What the tracker decided about one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub message: String,
    pub transition: bool,
}
