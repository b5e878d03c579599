//! Usage Analysis Engine
//!
//! This module folds every session transcript on disk into usage totals for two windows:
//!
//! - **5-hour cycle**: a fixed grid of 5-hour buckets counted from the Unix epoch, the same
//!   for every user regardless of when they started working
//! - **Week**: Monday 00:00 local time to the following Monday
//!
//! ## Processing Pipeline
//!
//! 1. **Discovery**: [`FileDiscovery`] lists every `*.jsonl` under the projects directory
//! 2. **Parsing**: [`FileParser`] turns each file into a [`SessionSummary`]
//! 3. **Aggregation**: sessions are attributed whole to the windows their start time falls in
//! 4. **Limits**: the requested tier is resolved through [`get_tier_limits`]
//!
//! Each calculation is independent; nothing is cached between calls.
//!
//! ## Usage Example
//!
//! ```no_run
//! use vibe_monitor::analyzer::{format_reset_time, UsageTracker};
//!
//! # fn example() -> anyhow::Result<()> {
//! let tracker = UsageTracker::new("max_5x");
//! let usage = tracker.calculate()?;
//!
//! println!(
//!     "{} prompts this cycle, resets in {}",
//!     usage.cycle_prompts,
//!     format_reset_time(usage.cycle_reset_in)
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Session files are parsed sequentially unless the `parallel` feature is enabled, in
//! which case parsing runs on the rayon pool and only the final fold is sequential.

use crate::file_discovery::FileDiscovery;
use crate::models::{SessionSummary, UsageData};
use crate::parser::FileParser;
use crate::tier::{get_tier_limits, TierLimits};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};
use uuid::Uuid;

/// Length of one usage cycle
pub const CYCLE_HOURS: i64 = 5;
const CYCLE_SECONDS: i64 = CYCLE_HOURS * 3600;

pub struct UsageTracker {
    tier: TierLimits,
    tier_name: String,
    discovery: FileDiscovery,
    parser: FileParser,
}

impl UsageTracker {
    /// Tracker reading sessions from the configured Claude home
    pub fn new(tier_name: &str) -> Self {
        Self::with_discovery(tier_name, FileDiscovery::from_config())
    }

    pub fn with_discovery(tier_name: &str, discovery: FileDiscovery) -> Self {
        Self {
            tier: get_tier_limits(tier_name),
            tier_name: tier_name.to_string(),
            discovery,
            parser: FileParser::new(),
        }
    }

    /// Compute usage as of the current wall-clock time in the local time zone.
    pub fn calculate(&self) -> Result<UsageData> {
        self.calculate_at(&Local::now())
    }

    /// Compute usage as of `now`. The week boundary is taken in `now`'s time zone.
    ///
    /// Only a failure to list the projects directory is returned as an error; unreadable
    /// or empty sessions are left out of the totals.
    pub fn calculate_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<UsageData> {
        let run_id = Uuid::new_v4();
        let span = info_span!("calculate", %run_id, tier = %self.tier_name);
        let _enter = span.enter();

        let now_utc = now.with_timezone(&Utc);
        let week_start = week_start(now);
        let cycle_start = cycle_start(now);

        let session_paths = self
            .discovery
            .find_session_files()
            .context("Failed to find session files")?;

        let mut usage = UsageData {
            cycle_prompts: 0,
            cycle_start_time: cycle_start,
            weekly_sonnet_hours: 0.0,
            weekly_opus_hours: 0.0,
            weekly_prompts: 0,
            weekly_start_time: week_start,
            cycle_reset_in: Duration::zero(),
            weekly_reset_in: Duration::zero(),
            tier: self.tier,
            tier_name: self.tier_name.clone(),
            last_updated: now_utc,
            sessions_count: 0,
        };

        for session in self.parse_sessions(&session_paths) {
            accumulate(&mut usage, &session);
        }

        usage.cycle_reset_in = clamp_non_negative(cycle_start + Duration::hours(CYCLE_HOURS) - now_utc);
        usage.weekly_reset_in = clamp_non_negative(week_start + Duration::days(7) - now_utc);

        info!(
            files = session_paths.len(),
            sessions = usage.sessions_count,
            cycle_prompts = usage.cycle_prompts,
            weekly_prompts = usage.weekly_prompts,
            weekly_hours = usage.total_weekly_hours(),
            "Usage calculated"
        );

        Ok(usage)
    }

    #[cfg(not(feature = "parallel"))]
    fn parse_sessions(&self, paths: &[PathBuf]) -> Vec<SessionSummary> {
        paths.iter().filter_map(|path| self.parse_session(path)).collect()
    }

    #[cfg(feature = "parallel")]
    fn parse_sessions(&self, paths: &[PathBuf]) -> Vec<SessionSummary> {
        use rayon::prelude::*;

        paths
            .par_iter()
            .filter_map(|path| self.parse_session(path))
            .collect()
    }

    /// Parse one file, dropping it if unreadable or without activity.
    fn parse_session(&self, path: &Path) -> Option<SessionSummary> {
        match self.parser.parse_session_file(path) {
            Ok(session) if session.has_activity() => Some(session),
            Ok(_) => {
                debug!(path = %path.display(), "Skipping session without activity");
                None
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unreadable session");
                None
            }
        }
    }
}

/// Add one session to the totals. Sessions without any timestamp are counted but fall
/// in neither window.
fn accumulate(usage: &mut UsageData, session: &SessionSummary) {
    usage.sessions_count += 1;

    let Some(start) = session.start_time else {
        return;
    };

    if start >= usage.cycle_start_time {
        usage.cycle_prompts += session.prompt_count;
    }

    if start >= usage.weekly_start_time {
        usage.weekly_prompts += session.prompt_count;

        let (sonnet_hours, opus_hours) = session.model_hours();
        usage.weekly_sonnet_hours += sonnet_hours;
        usage.weekly_opus_hours += opus_hours;
    }
}

fn clamp_non_negative(d: Duration) -> Duration {
    d.max(Duration::zero())
}

/// Monday 00:00:00 of the week containing `now`, in `now`'s time zone.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let monday = (now.date_naive() - Duration::days(days_since_monday)).and_time(NaiveTime::MIN);
    let tz = now.timezone();

    // Zones that start DST at midnight have no local 00:00 on that day
    tz.from_local_datetime(&monday)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(monday + Duration::hours(1))).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| tz.from_utc_datetime(&monday).with_timezone(&Utc))
}

/// Start of the current 5-hour bucket on the epoch-aligned grid.
pub fn cycle_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let start = now.timestamp().div_euclid(CYCLE_SECONDS) * CYCLE_SECONDS;
    DateTime::from_timestamp(start, 0).unwrap_or_default()
}

/// Format a countdown as `"<h>h <m>m"` or `"<m>m"`; non-positive durations read `"resetting..."`.
pub fn format_reset_time(d: Duration) -> String {
    if d <= Duration::zero() {
        return "resetting...".to_string();
    }

    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
