//! Vibe Monitor Library
//!
//! Tracks Claude Code usage against subscription rate limits by reading the session
//! transcripts Claude Code stores under `~/.claude/projects/`.
//!
//! ## Core Features
//!
//! - **Two usage windows**: a fixed 5-hour cycle on a global epoch-aligned grid and a
//!   Monday-to-Monday week in local time
//! - **Per-model hours**: session time split between Sonnet and Opus by response ratio
//! - **Tier limits**: built-in limits for Free, Pro, Max 5x and Max 20x, with billing-code
//!   aliases and automatic detection from the credentials file
//! - **Robust parsing**: live-appended, partially written or mixed-format transcripts are
//!   read line by line and malformed lines are skipped
//!
//! ## Architecture Overview
//!
//! - [`file_discovery`] - Finds session files below the projects directory
//! - [`parser`] - Summarizes one session file
//! - [`tier`] - Static tier catalog
//! - [`analyzer`] - Window boundaries and the usage fold
//! - [`credentials`] - Tier detection from the credentials file
//! - [`display`] - Terminal and JSON output
//! - [`config`] - Configuration with file and environment overrides
//! - [`logging`] - Structured logging setup
//!
//! ## Main Entry Point
//!
//! ```no_run
//! use vibe_monitor::UsageTracker;
//!
//! # fn example() -> anyhow::Result<()> {
//! let usage = UsageTracker::new("pro").calculate()?;
//! println!("{:.1}% of the weekly allowance used", usage.weekly_percentage());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod config;
pub mod credentials;
pub mod display;
pub mod file_discovery;
pub mod logging;
pub mod models;
pub mod parser;
pub mod tier;
pub mod timestamp_parser;

pub use analyzer::{format_reset_time, UsageTracker};
pub use models::*;
pub use tier::{get_tier_limits, TierLimits};
