use chrono::{DateTime, Local};
use std::future::Future;
use std::time::Duration;

/// Source of wall-clock time and pauses for the monitor loop.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
pub mod manual {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    /// Clock that only moves when told to. Sleeping advances it instantly.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<DateTime<Local>>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            let start = Local.with_ymd_and_hms(2020, 5, 4, 12, 0, 0).unwrap();
            Self { now: Arc::new(Mutex::new(start)) }
        }

        pub fn advance(&self, duration: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(duration).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
            self.advance(duration);
            std::future::ready(())
        }
    }
}
