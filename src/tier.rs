//! Subscription Tier Catalog
//!
//! Static usage limits per Claude subscription tier. Lookup accepts canonical tier names,
//! the `rate_limit_tier` codes found in the credentials file and a handful of spelling
//! variants. Anything unrecognised resolves to the Pro limits, so lookup never fails.

use serde::Serialize;

/// Usage limits for one subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierLimits {
    pub tier: &'static str,
    /// Prompts per 5-hour cycle
    pub cycle_5h_min: u32,
    pub cycle_5h_max: u32,
    /// Weekly Sonnet hours
    pub weekly_sonnet_min: f64,
    pub weekly_sonnet_max: f64,
    /// Weekly Opus hours, zero when the tier has no Opus access
    pub weekly_opus_min: f64,
    pub weekly_opus_max: f64,
}

impl TierLimits {
    pub fn has_opus(&self) -> bool {
        self.weekly_opus_max > 0.0
    }

    /// Combined Sonnet + Opus weekly hour maximum.
    pub fn total_weekly_max(&self) -> f64 {
        self.weekly_sonnet_max + self.weekly_opus_max
    }
}

pub const DEFAULT_TIER: &str = "pro";

pub const TIERS: &[TierLimits] = &[
    TierLimits {
        tier: "free",
        cycle_5h_min: 10,
        cycle_5h_max: 40,
        weekly_sonnet_min: 40.0,
        weekly_sonnet_max: 80.0,
        weekly_opus_min: 0.0,
        weekly_opus_max: 0.0,
    },
    TierLimits {
        tier: "pro",
        cycle_5h_min: 10,
        cycle_5h_max: 40,
        weekly_sonnet_min: 40.0,
        weekly_sonnet_max: 80.0,
        weekly_opus_min: 0.0,
        weekly_opus_max: 0.0,
    },
    TierLimits {
        tier: "max_5x",
        cycle_5h_min: 50,
        cycle_5h_max: 200,
        weekly_sonnet_min: 140.0,
        weekly_sonnet_max: 280.0,
        weekly_opus_min: 15.0,
        weekly_opus_max: 35.0,
    },
    TierLimits {
        tier: "max_20x",
        cycle_5h_min: 200,
        cycle_5h_max: 800,
        weekly_sonnet_min: 240.0,
        weekly_sonnet_max: 480.0,
        weekly_opus_min: 24.0,
        weekly_opus_max: 40.0,
    },
];

/// Billing-side tier codes and spelling variants, keyed in lowercase.
const TIER_ALIASES: &[(&str, &str)] = &[
    ("free", "free"),
    ("pro", "pro"),
    ("max5", "max_5x"),
    ("max5x", "max_5x"),
    ("max_5x", "max_5x"),
    ("max20", "max_20x"),
    ("max20x", "max_20x"),
    ("max_20x", "max_20x"),
    // Team and enterprise plans map onto the nearest Max tier
    ("team", "max_5x"),
    ("enterprise", "max_20x"),
];

/// Prefixes used by the OAuth `rateLimitTier` codes, e.g. `default_claude_max_5x`.
const BILLING_PREFIXES: &[&str] = &["default_claude_", "claude_"];

fn canonical(tier: &str) -> Option<TierLimits> {
    TIERS.iter().find(|limits| limits.tier == tier).copied()
}

fn alias(tier: &str) -> Option<&'static str> {
    TIER_ALIASES
        .iter()
        .find(|(code, _)| *code == tier)
        .map(|(_, name)| *name)
}

/// Resolve a tier name or billing code to its limits, falling back to Pro.
pub fn get_tier_limits(tier: &str) -> TierLimits {
    if let Some(limits) = canonical(tier) {
        return limits;
    }

    let normalized = tier.trim().to_lowercase();
    let code = BILLING_PREFIXES
        .iter()
        .find_map(|prefix| normalized.strip_prefix(prefix))
        .unwrap_or(normalized.as_str());

    alias(code)
        .and_then(canonical)
        .unwrap_or_else(default_limits)
}

fn default_limits() -> TierLimits {
    // DEFAULT_TIER is a row of TIERS
    TIERS[1]
}
