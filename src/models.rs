//! Core Data Models
//!
//! This module defines the data structures that flow through the usage engine, from raw
//! session lines to the aggregated window totals.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`SessionMessage`] - One JSON object per line of a session file
//! 2. **Per Session**: [`SessionSummary`] - Prompt/response counts and time span of one file
//! 3. **Aggregate**: [`UsageData`] - Cycle and weekly totals for "now" against a tier
//! 4. **Output**: [`UsageReport`] - Serializable view for JSON output
//!
//! Everything here is recomputed on every calculation; nothing is persisted.

use crate::tier::TierLimits;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Marker substrings that identify a wrapped local command rather than a typed prompt.
pub const COMMAND_MARKERS: [&str; 2] = ["<command-name>", "<local-command-stdout>"];

/// One line of a session transcript. Every field is optional; the files are written by an
/// external process and their schema drifts between client versions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionMessage {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(rename = "isMeta", default, deserialize_with = "null_as_default")]
    pub is_meta: bool,
    #[serde(rename = "userType", default, deserialize_with = "null_as_default")]
    pub user_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: MessageBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

// Explicit nulls are treated like missing fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SessionMessage {
    /// True for a prompt typed by the user: not meta, not tool-synthesized and not a
    /// local slash command echoed into the transcript.
    pub fn is_user_prompt(&self) -> bool {
        self.kind == "user"
            && self.message.role == "user"
            && !self.is_meta
            && self.user_type == "external"
            && !self.message.is_command()
    }

    /// Model family of an assistant response, if it belongs to one we track.
    pub fn response_model(&self) -> Option<ModelFamily> {
        if self.kind != "assistant" {
            return None;
        }
        ModelFamily::from_model_id(&self.message.model)
    }
}

impl MessageBody {
    /// Detects `<command-name>` / `<local-command-stdout>` blocks in either string content
    /// or the `text` field of content blocks.
    pub fn is_command(&self) -> bool {
        let has_marker = |text: &str| COMMAND_MARKERS.iter().any(|m| text.contains(m));

        match &self.content {
            serde_json::Value::String(text) => has_marker(text),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                .any(has_marker),
            _ => false,
        }
    }
}

/// The two model families tracked against weekly limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Primary model, the bulk of the weekly allowance
    Sonnet,
    /// Secondary model, only available on the Max tiers
    Opus,
}

impl ModelFamily {
    pub fn from_model_id(model: &str) -> Option<Self> {
        let model = model.to_lowercase();
        if model.contains("opus") {
            Some(Self::Opus)
        } else if model.contains("sonnet") {
            Some(Self::Sonnet)
        } else {
            None
        }
    }
}

/// Summary of a single session file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub project: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_hours: f64,
    pub prompt_count: u32,
    pub sonnet_responses: u32,
    pub opus_responses: u32,
}

impl SessionSummary {
    pub fn new(session_id: String, project: String) -> Self {
        Self {
            session_id,
            project,
            ..Default::default()
        }
    }

    /// Widen the session span to include `ts`.
    pub fn observe_timestamp(&mut self, ts: DateTime<Utc>) {
        self.start_time = Some(self.start_time.map_or(ts, |start| start.min(ts)));
        self.end_time = Some(self.end_time.map_or(ts, |end| end.max(ts)));
    }

    pub fn record_response(&mut self, family: ModelFamily) {
        match family {
            ModelFamily::Sonnet => self.sonnet_responses += 1,
            ModelFamily::Opus => self.opus_responses += 1,
        }
    }

    /// Recompute `duration_hours` from the observed span.
    pub fn finalize(&mut self) {
        self.duration_hours = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                let millis = (end - start).num_milliseconds().max(0);
                millis as f64 / 3_600_000.0
            }
            _ => 0.0,
        };
    }

    /// Sessions with no measurable span and no prompts carry no usage.
    pub fn has_activity(&self) -> bool {
        self.duration_hours > 0.0 || self.prompt_count > 0
    }

    /// Split the session duration into (sonnet, opus) hours by response ratio.
    /// Sessions without tagged responses count fully against Sonnet.
    pub fn model_hours(&self) -> (f64, f64) {
        let total = self.sonnet_responses + self.opus_responses;
        if total == 0 {
            return (self.duration_hours, 0.0);
        }
        let total = f64::from(total);
        (
            self.duration_hours * f64::from(self.sonnet_responses) / total,
            self.duration_hours * f64::from(self.opus_responses) / total,
        )
    }
}

/// Usage totals for the current 5-hour cycle and the current week.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageData {
    // 5-hour cycle
    pub cycle_prompts: u32,
    pub cycle_start_time: DateTime<Utc>,

    // Week window
    pub weekly_sonnet_hours: f64,
    pub weekly_opus_hours: f64,
    pub weekly_prompts: u32,
    pub weekly_start_time: DateTime<Utc>,

    pub cycle_reset_in: Duration,
    pub weekly_reset_in: Duration,

    pub tier: TierLimits,
    pub tier_name: String,

    pub last_updated: DateTime<Utc>,
    pub sessions_count: usize,
}

impl UsageData {
    pub fn total_weekly_hours(&self) -> f64 {
        self.weekly_sonnet_hours + self.weekly_opus_hours
    }

    /// Weekly hours as a percentage of the tier's combined weekly maximum.
    pub fn weekly_percentage(&self) -> f64 {
        let max = self.tier.total_weekly_max();
        if max <= 0.0 {
            return 0.0;
        }
        self.total_weekly_hours() / max * 100.0
    }

    pub fn to_report(&self) -> UsageReport {
        UsageReport {
            tier: self.tier_name.clone(),
            resolved_tier: self.tier.tier.to_string(),
            cycle_prompts: self.cycle_prompts,
            cycle_prompt_limit: self.tier.cycle_5h_max,
            cycle_start_time: self.cycle_start_time,
            cycle_reset_in_seconds: self.cycle_reset_in.num_seconds(),
            weekly_prompts: self.weekly_prompts,
            weekly_sonnet_hours: self.weekly_sonnet_hours,
            weekly_opus_hours: self.weekly_opus_hours,
            weekly_sonnet_limit: self.tier.weekly_sonnet_max,
            weekly_opus_limit: self.tier.weekly_opus_max,
            weekly_percentage: self.weekly_percentage(),
            weekly_start_time: self.weekly_start_time,
            weekly_reset_in_seconds: self.weekly_reset_in.num_seconds(),
            sessions_count: self.sessions_count,
            last_updated: self.last_updated,
        }
    }
}

/// JSON shape of [`UsageData`].
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub tier: String,
    #[serde(rename = "resolvedTier")]
    pub resolved_tier: String,
    #[serde(rename = "cyclePrompts")]
    pub cycle_prompts: u32,
    #[serde(rename = "cyclePromptLimit")]
    pub cycle_prompt_limit: u32,
    #[serde(rename = "cycleStartTime")]
    pub cycle_start_time: DateTime<Utc>,
    #[serde(rename = "cycleResetInSeconds")]
    pub cycle_reset_in_seconds: i64,
    #[serde(rename = "weeklyPrompts")]
    pub weekly_prompts: u32,
    #[serde(rename = "weeklySonnetHours")]
    pub weekly_sonnet_hours: f64,
    #[serde(rename = "weeklyOpusHours")]
    pub weekly_opus_hours: f64,
    #[serde(rename = "weeklySonnetLimit")]
    pub weekly_sonnet_limit: f64,
    #[serde(rename = "weeklyOpusLimit")]
    pub weekly_opus_limit: f64,
    #[serde(rename = "weeklyPercentage")]
    pub weekly_percentage: f64,
    #[serde(rename = "weeklyStartTime")]
    pub weekly_start_time: DateTime<Utc>,
    #[serde(rename = "weeklyResetInSeconds")]
    pub weekly_reset_in_seconds: i64,
    #[serde(rename = "sessionsCount")]
    pub sessions_count: usize,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}
