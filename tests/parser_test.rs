//! Parsing of whole session files as Claude Code writes them

use std::fs;
use vibe_monitor::parser::{parse_session_file, FileParser};

mod common;
use common::*;

#[test]
fn test_parse_mixed_session() -> anyhow::Result<()> {
    let home = setup_claude_home()?;
    let lines = vec![
        r#"{"type":"summary","summary":"Fix flaky test","leafUuid":"abc"}"#.to_string(),
        user_prompt("2024-01-15T10:00:00.000Z", "why is this test flaky?"),
        assistant_reply("2024-01-15T10:00:05.000Z", SONNET),
        meta_prompt("2024-01-15T10:05:00.000Z"),
        user_prompt("2024-01-15T10:06:00.000Z", "<command-name>/clear</command-name>"),
        "{broken json line that should be skipped}".to_string(),
        user_prompt("2024-01-15T11:00:00Z", "now run it again"),
        assistant_reply("2024-01-15T11:30:00.000Z", OPUS),
        assistant_reply("2024-01-15T11:31:00.000Z", "claude-3-5-haiku-20241022"),
    ];
    let path = write_session(home.path(), "-home-dev-app", "0b7e.jsonl", &lines)?;

    let summary = parse_session_file(&path)?;

    assert_eq!(summary.session_id, "0b7e.jsonl");
    assert_eq!(summary.project, "-home-dev-app");
    assert_eq!(summary.prompt_count, 2);
    assert_eq!(summary.sonnet_responses, 1);
    assert_eq!(summary.opus_responses, 1);
    assert!((summary.duration_hours - 1.5166666).abs() < 1e-4);

    Ok(())
}

#[test]
fn test_out_of_order_timestamps_use_min_and_max() -> anyhow::Result<()> {
    let home = setup_claude_home()?;
    let lines = vec![
        user_prompt("2024-01-15T12:00:00Z", "b"),
        user_prompt("2024-01-15T09:00:00Z", "a"),
        user_prompt("2024-01-15T10:00:00Z", "c"),
    ];
    let path = write_session(home.path(), "p", "s.jsonl", &lines)?;

    let summary = parse_session_file(&path)?;
    assert_eq!(summary.start_time.unwrap().to_rfc3339(), "2024-01-15T09:00:00+00:00");
    assert_eq!(summary.end_time.unwrap().to_rfc3339(), "2024-01-15T12:00:00+00:00");
    assert!((summary.duration_hours - 3.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_session_without_timestamps() -> anyhow::Result<()> {
    let home = setup_claude_home()?;
    let lines = vec![
        user_prompt("not a timestamp", "hello"),
        r#"{"type":"user","userType":"external","message":{"role":"user","content":"no ts"}}"#
            .to_string(),
    ];
    let path = write_session(home.path(), "p", "s.jsonl", &lines)?;

    let summary = parse_session_file(&path)?;
    assert_eq!(summary.prompt_count, 2);
    assert_eq!(summary.start_time, None);
    assert_eq!(summary.end_time, None);
    assert_eq!(summary.duration_hours, 0.0);

    Ok(())
}

#[test]
fn test_long_lines_and_partial_trailing_line() -> anyhow::Result<()> {
    let home = setup_claude_home()?;
    let big_prompt = "x".repeat(2 * 1024 * 1024);
    let path = home.path().join("projects").join("p").join("s.jsonl");
    fs::create_dir_all(path.parent().unwrap())?;

    // The trailing line is cut off mid-write and has no newline
    let content = format!(
        "{}\r\n\n   \n{}\n{{\"type\":\"assistant\",\"timestamp\":\"2024-01-15T1",
        user_prompt("2024-01-15T10:00:00Z", &big_prompt),
        assistant_reply("2024-01-15T10:30:00Z", SONNET),
    );
    fs::write(&path, content)?;

    let summary = FileParser::new().parse_session_file(&path)?;
    assert_eq!(summary.prompt_count, 1);
    assert_eq!(summary.sonnet_responses, 1);
    assert!((summary.duration_hours - 0.5).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_missing_file_is_error() {
    let home = setup_claude_home().unwrap();
    let result = parse_session_file(&home.path().join("projects").join("missing.jsonl"));
    assert!(result.is_err());
}

#[test]
fn test_empty_file_has_no_activity() -> anyhow::Result<()> {
    let home = setup_claude_home()?;
    let path = home.path().join("projects").join("empty.jsonl");
    fs::write(&path, "")?;

    let summary = parse_session_file(&path)?;
    assert!(!summary.has_activity());
    assert_eq!(summary.project, "projects");

    Ok(())
}
