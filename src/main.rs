use anyhow::Result;
use clap::Parser;
use std::process;
use tracing::{debug, info};

use vibe_monitor::analyzer::UsageTracker;
use vibe_monitor::config::try_get_config;
use vibe_monitor::credentials::detect_tier;
use vibe_monitor::display::DisplayManager;
use vibe_monitor::logging::init_logging;
use vibe_monitor::tier::DEFAULT_TIER;

#[derive(Parser)]
#[command(name = "vibe-monitor")]
#[command(about = "Track Claude Code usage against your subscription limits")]
#[command(version)]
struct Cli {
    /// Subscription tier (free, pro, max_5x, max_20x, auto)
    #[arg(long)]
    tier: Option<String>,
    /// Single-line compact format
    #[arg(long)]
    compact: bool,
    /// Output in JSON format
    #[arg(long, conflicts_with = "compact")]
    json: bool,
    /// Disable colored output
    #[arg(long)]
    no_color: bool,
    /// Progress bar width (20-100)
    #[arg(long, value_parser = clap::value_parser!(u16).range(20..=100))]
    width: Option<u16>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match try_get_config() {
        Ok(config) => config,
        Err(e) => handle_error(e.context("Invalid configuration"), cli.json),
    };
    let _log_guard = init_logging();

    let no_color = cli.no_color || config.display.no_color;
    if no_color {
        colored::control::set_override(false);
    }
    let width = cli.width.map_or(config.display.width, usize::from);

    let tier_name = resolve_tier(cli.tier.as_deref().unwrap_or(&config.tracker.tier));
    info!(tier = %tier_name, "Starting usage calculation");

    let tracker = UsageTracker::new(&tier_name);
    let usage = match tracker.calculate() {
        Ok(usage) => usage,
        Err(e) => handle_error(e, cli.json),
    };

    let display = DisplayManager::new(no_color, width);

    if cli.json {
        println!("{}", display.render_json(&usage)?);
        return Ok(());
    }

    if usage.sessions_count == 0 {
        println!("No Claude Code usage data found.");
        println!("Session files: {}", config.projects_dir().display());
        return Ok(());
    }

    if cli.compact {
        println!("{}", display.render_compact(&usage));
    } else {
        print!("{}", display.render(&usage));
    }

    Ok(())
}

/// Empty or "auto" reads the tier from the credentials file, falling back to Pro.
fn resolve_tier(requested: &str) -> String {
    let requested = requested.trim();
    if !requested.is_empty() && requested != "auto" {
        return requested.to_string();
    }

    match detect_tier() {
        Ok(tier) => {
            debug!(tier = %tier, "Detected tier from credentials");
            tier
        }
        Err(e) => {
            debug!(error = %e, "No tier detected, using default");
            DEFAULT_TIER.to_string()
        }
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
