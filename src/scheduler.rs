use crate::monitor::ContentMonitor;
use crate::types::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Named recurring interval governing scheduled runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Hourly,
    EveryTwoHours,
    EverySixHours,
    Daily,
    TwiceDaily,
    Weekly,
}

impl Cadence {
    /// Parse the configured spelling; unrecognized input falls back to
    /// daily with a warning, never an error.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "hourly" => Cadence::Hourly,
            "every_2_hours" => Cadence::EveryTwoHours,
            "every_6_hours" => Cadence::EverySixHours,
            "daily" => Cadence::Daily,
            "twice_daily" => Cadence::TwiceDaily,
            "weekly" => Cadence::Weekly,
            other => {
                warn!("Unknown schedule interval: {}, defaulting to daily", other);
                Cadence::Daily
            }
        }
    }

    pub fn interval(&self) -> ChronoDuration {
        match self {
            Cadence::Hourly => ChronoDuration::hours(1),
            Cadence::EveryTwoHours => ChronoDuration::hours(2),
            Cadence::EverySixHours => ChronoDuration::hours(6),
            Cadence::Daily => ChronoDuration::hours(24),
            Cadence::TwiceDaily => ChronoDuration::hours(12),
            Cadence::Weekly => ChronoDuration::days(7),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Hourly => "hourly",
            Cadence::EveryTwoHours => "every_2_hours",
            Cadence::EverySixHours => "every_6_hours",
            Cadence::Daily => "daily",
            Cadence::TwiceDaily => "twice_daily",
            Cadence::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives the monitor on a recurring cadence. Owns its own job state (next
/// run timestamp, poll interval, failure cool-down) — no process-wide
/// registry. Runs never overlap: the loop blocks on each run's completion
/// before checking for the next due job.
pub struct MonitorScheduler {
    monitor: ContentMonitor,
    cadence: Cadence,
    poll_interval: Duration,
    cooldown: Duration,
    next_run: DateTime<Utc>,
    stop: Arc<AtomicBool>,
}

impl MonitorScheduler {
    pub fn new(monitor: ContentMonitor, cadence: Cadence) -> Self {
        Self {
            monitor,
            cadence,
            poll_interval: Duration::from_secs(60),
            cooldown: Duration::from_secs(300),
            next_run: Utc::now(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shorter poll/cool-down intervals, used by tests.
    pub fn with_intervals(mut self, poll_interval: Duration, cooldown: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.cooldown = cooldown;
        self
    }

    /// Handle for cooperative shutdown: set the flag and the loop exits
    /// after its current sleep/check cycle. In-flight runs always finish.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn next_run(&self) -> DateTime<Utc> {
        self.next_run
    }

    /// Run one pass immediately, then loop until the stop flag is set.
    /// A failed run is logged and followed by a cool-down wait; the
    /// scheduler itself never exits on a single run's failure.
    pub async fn start(&mut self) -> Result<()> {
        info!("Content monitor scheduler started (cadence: {})", self.cadence);

        info!("Running initial monitoring check");
        self.run_guarded().await;

        while !self.stop.load(Ordering::SeqCst) {
            if Utc::now() >= self.next_run {
                self.run_guarded().await;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        info!("Content monitor scheduler stopped");
        Ok(())
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    async fn run_guarded(&mut self) {
        let started_at = Utc::now();
        info!("Starting scheduled monitoring run at {}", started_at);
        match self.monitor.run_once().await {
            Ok(stats) => {
                info!(
                    "Completed scheduled monitoring run: {}/{} relevant articles",
                    stats.total_relevant, stats.total_found
                );
            }
            Err(e) => {
                error!("Error during scheduled monitoring run: {}", e);
                // Cool down before resuming the normal polling cadence.
                tokio::time::sleep(self.cooldown).await;
            }
        }
        self.next_run = Utc::now() + self.cadence.interval();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_cadences_parse() {
        assert_eq!(Cadence::parse("hourly"), Cadence::Hourly);
        assert_eq!(Cadence::parse("every_2_hours"), Cadence::EveryTwoHours);
        assert_eq!(Cadence::parse("every_6_hours"), Cadence::EverySixHours);
        assert_eq!(Cadence::parse("daily"), Cadence::Daily);
        assert_eq!(Cadence::parse("twice_daily"), Cadence::TwiceDaily);
        assert_eq!(Cadence::parse("weekly"), Cadence::Weekly);
    }

    #[test]
    fn unknown_cadence_defaults_to_daily() {
        assert_eq!(Cadence::parse("fortnightly"), Cadence::Daily);
        assert_eq!(Cadence::parse(""), Cadence::Daily);
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(Cadence::parse(" Hourly "), Cadence::Hourly);
        assert_eq!(Cadence::parse("WEEKLY"), Cadence::Weekly);
    }

    #[test]
    fn intervals_match_cadence() {
        assert_eq!(Cadence::Hourly.interval(), ChronoDuration::hours(1));
        assert_eq!(Cadence::TwiceDaily.interval(), ChronoDuration::hours(12));
        assert_eq!(Cadence::Weekly.interval(), ChronoDuration::days(7));
    }
}
