//! Process supervisor
//!
//! Keeps the chat session running during the configured active hours. A
//! crashed session is restarted after a cooldown; outside the window the
//! supervisor only sleeps and re-checks.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use tracing::{error, info};

use crate::error::{TrackerError, TrackerResult};

/// Local time-of-day window, start inclusive, end exclusive
///
/// A window whose start is after its end wraps past midnight. Equal bounds
/// mean the bot is always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ActiveWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse `HH:MM` bounds
    pub fn parse(start: &str, end: &str) -> TrackerResult<Self> {
        Ok(Self::new(parse_time(start)?, parse_time(end)?))
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start < self.end {
            self.start <= time && time < self.end
        } else if self.start > self.end {
            time >= self.start || time < self.end
        } else {
            true
        }
    }
}

impl fmt::Display for ActiveWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn parse_time(value: &str) -> TrackerResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
        TrackerError::Config(format!("Invalid time '{}' (expected HH:MM): {}", value, e))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Active,
    Sleeping,
}

/// Active/Sleeping loop around the chat session
#[derive(Debug, Clone)]
pub struct Supervisor {
    window: ActiveWindow,
    crash_cooldown: Duration,
    idle_sleep: Duration,
}

impl Supervisor {
    pub fn new(window: ActiveWindow, crash_cooldown: Duration, idle_sleep: Duration) -> Self {
        Self {
            window,
            crash_cooldown,
            idle_sleep,
        }
    }

    pub fn state_at(&self, now: NaiveTime) -> SupervisorState {
        if self.window.contains(now) {
            SupervisorState::Active
        } else {
            SupervisorState::Sleeping
        }
    }

    /// One pass of the loop; returns how long to wait before the next
    pub async fn run_cycle<F, Fut>(&self, now: NaiveTime, session: F) -> Duration
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TrackerResult<()>>,
    {
        match self.state_at(now) {
            SupervisorState::Sleeping => {
                info!(window = %self.window, "outside active hours, sleeping");
                self.idle_sleep
            }
            SupervisorState::Active => match session().await {
                Ok(()) => Duration::ZERO,
                Err(e) => {
                    error!(error = %e, cooldown_secs = self.crash_cooldown.as_secs(), "chat session crashed, restarting after cooldown");
                    self.crash_cooldown
                }
            },
        }
    }

    /// Supervise forever; only process termination stops this
    pub async fn run<F, Fut>(&self, mut session: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TrackerResult<()>>,
    {
        info!(window = %self.window, "supervisor started");
        loop {
            let pause = self.run_cycle(Local::now().time(), &mut session).await;
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn supervisor(start: &str, end: &str) -> Supervisor {
        Supervisor::new(
            ActiveWindow::parse(start, end).unwrap(),
            Duration::from_secs(60),
            Duration::from_secs(600),
        )
    }

    #[test]
    fn test_same_day_window() {
        let window = ActiveWindow::parse("09:00", "17:30").unwrap();
        assert!(window.contains(at(9, 0)));
        assert!(window.contains(at(17, 29)));
        assert!(!window.contains(at(17, 30)));
        assert!(!window.contains(at(8, 59)));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let window = ActiveWindow::parse("22:00", "02:00").unwrap();
        assert!(window.contains(at(23, 0)));
        assert!(window.contains(at(0, 30)));
        assert!(!window.contains(at(2, 0)));
        assert!(!window.contains(at(12, 0)));
    }

    #[test]
    fn test_default_window_ends_at_midnight() {
        let window = ActiveWindow::parse("10:00", "00:00").unwrap();
        assert!(window.contains(at(10, 0)));
        assert!(window.contains(at(23, 59)));
        assert!(!window.contains(at(0, 0)));
        assert!(!window.contains(at(9, 59)));
    }

    #[test]
    fn test_equal_bounds_always_active() {
        let window = ActiveWindow::parse("06:00", "06:00").unwrap();
        assert!(window.contains(at(5, 0)));
        assert!(window.contains(at(6, 0)));
        assert!(window.contains(at(13, 13)));
    }

    #[test]
    fn test_invalid_time() {
        assert!(ActiveWindow::parse("25:00", "10:00").is_err());
        assert!(ActiveWindow::parse("ten", "10:00").is_err());
    }

    #[test]
    fn test_display() {
        let window = ActiveWindow::parse("10:00", "00:00").unwrap();
        assert_eq!(window.to_string(), "10:00-00:00");
    }

    #[tokio::test]
    async fn test_sleeping_does_not_start_session() {
        let supervisor = supervisor("10:00", "00:00");
        let started = Cell::new(false);
        let flag = &started;

        let pause = supervisor
            .run_cycle(at(3, 0), move || async move {
                flag.set(true);
                Ok(())
            })
            .await;

        assert_eq!(supervisor.state_at(at(3, 0)), SupervisorState::Sleeping);
        assert_eq!(pause, Duration::from_secs(600));
        assert!(!started.get());
    }

    #[tokio::test]
    async fn test_crash_triggers_cooldown() {
        let supervisor = supervisor("10:00", "00:00");

        let pause = supervisor
            .run_cycle(at(12, 0), || async {
                Err(TrackerError::Transport("connection reset".into()))
            })
            .await;

        assert_eq!(pause, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_clean_stop_rechecks_immediately() {
        let supervisor = supervisor("10:00", "00:00");
        let started = Cell::new(false);
        let flag = &started;

        let pause = supervisor
            .run_cycle(at(12, 0), move || async move {
                flag.set(true);
                Ok(())
            })
            .await;

        assert_eq!(supervisor.state_at(at(12, 0)), SupervisorState::Active);
        assert_eq!(pause, Duration::ZERO);
        assert!(started.get());
    }
}
