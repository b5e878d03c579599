#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway Claude home with a `projects/` directory
pub fn setup_claude_home() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    fs::create_dir_all(temp_dir.path().join("projects"))?;
    Ok(temp_dir)
}

pub fn create_test_jsonl(dir: &Path, filename: &str, lines: &[String]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let file_path = dir.join(filename);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Write a session file under `<home>/projects/<project>/`
pub fn write_session(home: &Path, project: &str, session: &str, lines: &[String]) -> Result<PathBuf> {
    create_test_jsonl(&home.join("projects").join(project), session, lines)
}

pub fn user_prompt(timestamp: &str, text: &str) -> String {
    serde_json::json!({
        "type": "user",
        "timestamp": timestamp,
        "userType": "external",
        "message": { "role": "user", "content": text }
    })
    .to_string()
}

pub fn meta_prompt(timestamp: &str) -> String {
    serde_json::json!({
        "type": "user",
        "timestamp": timestamp,
        "isMeta": true,
        "userType": "external",
        "message": { "role": "user", "content": "Caveat: generated by a local command" }
    })
    .to_string()
}

pub fn assistant_reply(timestamp: &str, model: &str) -> String {
    serde_json::json!({
        "type": "assistant",
        "timestamp": timestamp,
        "message": {
            "role": "assistant",
            "model": model,
            "content": [{ "type": "text", "text": "Done." }]
        }
    })
    .to_string()
}

pub const SONNET: &str = "claude-sonnet-4-20250514";
pub const OPUS: &str = "claude-opus-4-1-20250805";
