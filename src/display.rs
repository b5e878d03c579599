//! Output Formatting
//!
//! Turns a [`UsageData`] into terminal output:
//!
//! - **Full view**: per-model weekly hours, cycle prompts and a weekly progress bar
//! - **Compact view**: a single line suited to status bars
//! - **JSON**: the [`UsageReport`](crate::models::UsageReport) shape for scripts
//!
//! Colors follow the usage level: green below 50%, yellow below 80%, red above.

use crate::analyzer::format_reset_time;
use crate::models::UsageData;
use anyhow::Result;
use colored::Colorize;

const MIN_WIDTH: usize = 20;
const DEFAULT_WIDTH: usize = 42;
const INDENT: &str = "    ";

const ORANGE: (u8, u8, u8) = (204, 85, 0);
const GREEN: (u8, u8, u8) = (34, 197, 94);
const YELLOW: (u8, u8, u8) = (234, 179, 8);
const RED: (u8, u8, u8) = (239, 68, 68);
const GRAY: (u8, u8, u8) = (156, 163, 175);

pub struct DisplayManager {
    no_color: bool,
    width: usize,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(false, DEFAULT_WIDTH)
    }
}

impl DisplayManager {
    pub fn new(no_color: bool, width: usize) -> Self {
        let width = if width < MIN_WIDTH { DEFAULT_WIDTH } else { width };
        Self { no_color, width }
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.truecolor(r, g, b).to_string()
        }
    }

    fn usage_color(percentage: f64) -> (u8, u8, u8) {
        if percentage >= 80.0 {
            RED
        } else if percentage >= 50.0 {
            YELLOW
        } else {
            GREEN
        }
    }

    /// Multi-line summary
    pub fn render(&self, usage: &UsageData) -> String {
        let mut lines = Vec::new();
        let tier = &usage.tier;

        let title = format!("Claude Code ({})", tier.tier);
        lines.push(if self.no_color {
            title
        } else {
            title.bold().to_string()
        });
        lines.push(String::new());

        lines.push(format!(
            "{INDENT}Sonnet: {} / {:.1}h",
            self.paint(&format!("{:.1}", usage.weekly_sonnet_hours), ORANGE),
            tier.weekly_sonnet_max
        ));
        if tier.has_opus() {
            lines.push(format!(
                "{INDENT}Opus:   {} / {:.1}h",
                self.paint(&format!("{:.1}", usage.weekly_opus_hours), ORANGE),
                tier.weekly_opus_max
            ));
        }
        lines.push(format!(
            "{INDENT}Cycle:  {} / {} prompts (resets in {})",
            self.paint(&usage.cycle_prompts.to_string(), ORANGE),
            tier.cycle_5h_max,
            format_reset_time(usage.cycle_reset_in)
        ));
        lines.push(String::new());
        lines.push(self.render_progress_bar(usage));

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Weekly progress bar: `[████░░░░] 12% | 3d resets in ...`
    fn render_progress_bar(&self, usage: &UsageData) -> String {
        let percentage = usage.weekly_percentage();
        let inner = self.width - 2;
        let filled = ((inner as f64) * percentage.clamp(0.0, 100.0) / 100.0) as usize;
        let filled = filled.min(inner);

        let bar = format!(
            "[{}{}]",
            self.paint(&"█".repeat(filled), Self::usage_color(percentage)),
            self.paint(&"░".repeat(inner - filled), GRAY)
        );

        format!(
            "{bar} {:.0}% | {:.1}/{:.1}h | resets in {}",
            percentage,
            usage.total_weekly_hours(),
            usage.tier.total_weekly_max(),
            format_reset_time(usage.weekly_reset_in)
        )
    }

    /// Single-line summary for status bars
    pub fn render_compact(&self, usage: &UsageData) -> String {
        let percentage = usage.weekly_percentage();
        let line = format!(
            "Claude: {:.1}/{:.1}h ({:.0}%) | {}",
            usage.total_weekly_hours(),
            usage.tier.total_weekly_max(),
            percentage,
            format_reset_time(usage.weekly_reset_in)
        );
        self.paint(&line, Self::usage_color(percentage))
    }

    pub fn render_json(&self, usage: &UsageData) -> Result<String> {
        Ok(serde_json::to_string_pretty(&usage.to_report())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::get_tier_limits;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_usage(tier: &str) -> UsageData {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap();
        UsageData {
            cycle_prompts: 12,
            cycle_start_time: Utc.with_ymd_and_hms(2024, 1, 17, 9, 0, 0).unwrap(),
            weekly_sonnet_hours: 63.0,
            weekly_opus_hours: 0.0,
            weekly_prompts: 120,
            weekly_start_time: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            cycle_reset_in: Duration::minutes(135),
            weekly_reset_in: Duration::hours(108),
            tier: get_tier_limits(tier),
            tier_name: tier.to_string(),
            last_updated: now,
            sessions_count: 4,
        }
    }

    #[test]
    fn test_render_compact_plain() {
        let display = DisplayManager::new(true, 42);
        assert_eq!(
            display.render_compact(&sample_usage("max_5x")),
            "Claude: 63.0/315.0h (20%) | 108h 0m"
        );
    }

    #[test]
    fn test_render_hides_opus_without_access() {
        let display = DisplayManager::new(true, 42);

        let output = display.render(&sample_usage("pro"));
        assert!(output.contains("Sonnet: 63.0 / 80.0h"));
        assert!(!output.contains("Opus:"));
        assert!(output.contains("Cycle:  12 / 40 prompts (resets in 2h 15m)"));

        let output = display.render(&sample_usage("max_5x"));
        assert!(output.contains("Opus:   0.0 / 35.0h"));
    }

    #[test]
    fn test_progress_bar_is_capped() {
        let display = DisplayManager::new(true, 22);
        // 63h of an 80h allowance, then well over it
        let mut usage = sample_usage("pro");
        let bar = display.render_progress_bar(&usage);
        assert!(bar.starts_with(&format!("[{}{}]", "█".repeat(15), "░".repeat(5))));

        usage.weekly_sonnet_hours = 200.0;
        let bar = display.render_progress_bar(&usage);
        assert!(bar.starts_with(&format!("[{}]", "█".repeat(20))));
        assert!(bar.contains("250%"));
    }

    #[test]
    fn test_narrow_width_falls_back_to_default() {
        let display = DisplayManager::new(true, 5);
        assert_eq!(display.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_render_json() {
        let display = DisplayManager::new(true, 42);
        let json = display.render_json(&sample_usage("max5")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tier"], "max5");
        assert_eq!(value["resolvedTier"], "max_5x");
        assert_eq!(value["cyclePrompts"], 12);
        assert_eq!(value["weeklyResetInSeconds"], 108 * 3600);
    }
}
