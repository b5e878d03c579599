//! Tier detection from the Claude Code credentials file.
//!
//! Failures here are never fatal: callers fall back to the default tier.

use crate::config::get_config;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct Credentials {
    #[serde(default)]
    rate_limit_tier: Option<String>,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    plan: Option<String>,
    #[serde(rename = "claudeAiOauth", default)]
    claude_ai_oauth: Option<OAuthCredentials>,
}

#[derive(Debug, Default, Deserialize)]
struct OAuthCredentials {
    #[serde(rename = "rateLimitTier", default)]
    rate_limit_tier: Option<String>,
    #[serde(rename = "subscriptionType", default)]
    subscription_type: Option<String>,
}

impl Credentials {
    /// First non-empty tier field, top-level fields before the OAuth block.
    fn tier(self) -> Option<String> {
        let oauth = self.claude_ai_oauth.unwrap_or_default();
        [
            self.rate_limit_tier,
            self.tier,
            self.plan,
            oauth.rate_limit_tier,
            oauth.subscription_type,
        ]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
    }
}

/// Read the subscription tier from `<claude_home>/.credentials.json`.
pub fn detect_tier() -> Result<String> {
    detect_tier_from(&get_config().credentials_path())
}

pub fn detect_tier_from(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
    parse_tier(&content)
}

fn parse_tier(content: &str) -> Result<String> {
    let credentials: Credentials =
        serde_json::from_str(content.trim()).context("Failed to parse credentials JSON")?;

    credentials
        .tier()
        .context("No tier found in credentials")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_empty_field_wins() {
        let tier = parse_tier(r#"{"rate_limit_tier":"","tier":"max5","plan":"pro"}"#).unwrap();
        assert_eq!(tier, "max5");

        let tier = parse_tier(r#"{"rate_limit_tier":"max_20x","tier":"max5"}"#).unwrap();
        assert_eq!(tier, "max_20x");

        let tier = parse_tier(r#"{"plan":"pro"}"#).unwrap();
        assert_eq!(tier, "pro");
    }

    #[test]
    fn test_oauth_block_fallback() {
        let tier = parse_tier(
            r#"{"claudeAiOauth":{"accessToken":"x","rateLimitTier":"default_claude_max_5x","subscriptionType":"max"}}"#,
        )
        .unwrap();
        assert_eq!(tier, "default_claude_max_5x");
    }

    #[test]
    fn test_missing_tier_is_error() {
        assert!(parse_tier(r#"{"claudeAiOauth":{"accessToken":"x"}}"#).is_err());
        assert!(parse_tier("not json").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(detect_tier_from(&temp_dir.path().join(".credentials.json")).is_err());
    }
}
