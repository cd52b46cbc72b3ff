//! Daily relationship reset
//!
//! Clears the whole relationship table once a day at a fixed local
//! wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};
use tokio::task::JoinHandle;
use waifu_common::ResetTime;

use super::relationship::RelationshipTable;

/// Daily reset schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyReset {
    time: ResetTime,
}

impl DailyReset {
    pub fn new(time: ResetTime) -> Self {
        Self { time }
    }

    pub fn time(&self) -> ResetTime {
        self.time
    }

    /// First reset strictly after `now`
    ///
    /// A reset time that falls into a DST gap moves to the next day.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let mut date = now.date_naive();

        // At most one skipped day for a DST gap, one for "already passed"
        for _ in 0..3 {
            if let Some(candidate) = self.at(&tz, date) {
                if candidate > *now {
                    return candidate;
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        now.clone() + TimeDelta::days(1)
    }

    /// Time left from `now` until the next reset
    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        (self.next_after(now) - now.clone())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    fn at<Tz: TimeZone>(&self, tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
        let naive = date.and_hms_opt(self.time.hour, self.time.minute, 0)?;
        tz.from_local_datetime(&naive).earliest()
    }

    /// Clear the table now; returns how many entries were dropped
    pub fn fire(table: &RelationshipTable) -> usize {
        let cleared = table.clear();
        tracing::info!(cleared, "Relationship table reset");
        cleared
    }

    /// Run the reset loop on the local clock until the task is aborted
    pub fn spawn(self, table: Arc<RelationshipTable>) -> JoinHandle<()> {
        tracing::info!(at = %self.time, "Daily reset scheduled");
        tokio::spawn(async move {
            loop {
                let delay = self.delay_from(&Local::now());
                tracing::debug!(secs = delay.as_secs(), "Sleeping until next reset");
                tokio::time::sleep(delay).await;
                Self::fire(&table);
            }
        })
    }
}
