//! Fixed-time daily scheduler.
//!
//! One worker thread sleeps until the next wall-clock fire time, runs the
//! job, and re-arms for the following day. `stop()` wakes the worker and
//! joins it promptly, so embedding processes control the lifecycle
//! explicitly instead of leaning on process teardown.

use chrono::{Local, NaiveDateTime, TimeDelta};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Local wall-clock time at which the daily job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireTime {
    hour: u32,
    minute: u32,
}

impl FireTime {
    /// # Errors
    ///
    /// Returns `None` for an out-of-range hour/minute.
    #[must_use]
    pub const fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }
}

/// Time until the next occurrence of `fire` after `now`: today's slot if it
/// is still ahead, otherwise tomorrow's.
#[must_use]
pub fn next_fire_delay(now: NaiveDateTime, fire: FireTime) -> Duration {
    let candidate = now
        .date()
        .and_hms_opt(fire.hour, fire.minute, 0)
        .unwrap_or(now);
    let target = if candidate > now {
        candidate
    } else {
        candidate + TimeDelta::days(1)
    };
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

struct Shared {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// A recurring daily job bound to a fixed local fire time.
pub struct DailyScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl DailyScheduler {
    /// Spawn the worker thread. The job runs once per day at `fire`; a run
    /// interrupted by shutdown is simply re-evaluated from scratch the next
    /// day.
    pub fn start<F>(fire: FireTime, mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);

        let worker = thread::spawn(move || {
            loop {
                let delay = next_fire_delay(Local::now().naive_local(), fire);
                debug!(?delay, "scheduler armed");
                if wait_or_stop(&worker_shared, delay) {
                    return;
                }
                info!("daily fire time reached; running job");
                job();
            }
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    fn signal_stop(&self) {
        let mut stopped = self
            .shared
            .stopped
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *stopped = true;
        self.shared.wake.notify_all();
    }

    /// Stop the worker and wait for it to exit.
    pub fn stop(mut self) {
        self.signal_stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("scheduler worker panicked during shutdown");
            }
        }
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        self.signal_stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Block until `delay` has elapsed or a stop was signalled. Returns `true`
/// on stop.
fn wait_or_stop(shared: &Shared, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    let mut stopped = shared
        .stopped
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    loop {
        if *stopped {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let (guard, _timeout) = shared
            .wake
            .wait_timeout(stopped, deadline - now)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        stopped = guard;
    }
}

#[cfg(test)]
mod tests {
    use super::{DailyScheduler, FireTime, next_fire_delay};
    use chrono::{Local, NaiveDate, TimeDelta};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn at(hour: u32, minute: u32, second: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .expect("valid date")
            .and_hms_opt(hour, minute, second)
            .expect("valid time")
    }

    #[test]
    fn fire_time_validates_ranges() {
        assert!(FireTime::new(18, 0).is_some());
        assert!(FireTime::new(23, 59).is_some());
        assert!(FireTime::new(24, 0).is_none());
        assert!(FireTime::new(0, 60).is_none());
    }

    #[test]
    fn delay_targets_today_when_still_ahead() {
        let fire = FireTime::new(18, 0).expect("valid fire time");
        let delay = next_fire_delay(at(17, 0, 0), fire);
        assert_eq!(delay, Duration::from_secs(3600));
    }

    #[test]
    fn delay_rolls_to_tomorrow_at_or_after_the_slot() {
        let fire = FireTime::new(18, 0).expect("valid fire time");
        assert_eq!(
            next_fire_delay(at(18, 0, 0), fire),
            Duration::from_secs(24 * 3600)
        );
        assert_eq!(
            next_fire_delay(at(19, 30, 0), fire),
            Duration::from_secs(22 * 3600 + 1800)
        );
    }

    #[test]
    fn stop_joins_promptly_without_firing() {
        // Aim half a day away so the job cannot fire during the test.
        use chrono::Timelike as _;
        let far_hour = (Local::now().naive_local() + TimeDelta::hours(12)).hour();
        let fire = FireTime::new(far_hour, 0).expect("valid fire time");

        let (tx, rx) = mpsc::channel();
        let scheduler = DailyScheduler::start(fire, move || {
            let _ = tx.send(());
        });

        let started = Instant::now();
        scheduler.stop();
        assert!(started.elapsed() < Duration::from_secs(2), "stop must not wait for the slot");
        assert!(rx.try_recv().is_err(), "job must not have fired");
    }
}
