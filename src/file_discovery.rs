use crate::config::get_config;
use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Session transcripts are line-delimited JSON files
const SESSION_FILE_PATTERN: &str = "**/*.jsonl";

/// Handles file system traversal and discovery of session transcript files
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    projects_dir: PathBuf,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::from_config()
    }
}

impl FileDiscovery {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    /// Discovery rooted at `<claude_home>/projects` (respects CLAUDE_HOME)
    pub fn from_config() -> Self {
        Self::new(get_config().projects_dir())
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Find every session file below the projects directory.
    ///
    /// A missing projects directory is a fresh install and yields no files. Any other
    /// failure to open the directory is returned. Unreadable entries deeper in the tree
    /// are skipped.
    pub fn find_session_files(&self) -> Result<Vec<PathBuf>> {
        match std::fs::read_dir(&self.projects_dir) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(projects_dir = %self.projects_dir.display(), "No projects directory yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "Failed to read projects directory: {}",
                        self.projects_dir.display()
                    )
                });
            }
        }

        // Project directory names may contain glob metacharacters
        let root = Pattern::escape(&self.projects_dir.to_string_lossy());
        let pattern = Path::new(&root).join(SESSION_FILE_PATTERN);
        let entries = glob(&pattern.to_string_lossy())
            .with_context(|| format!("Invalid session file pattern: {}", pattern.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!(path = %e.path().display(), error = %e.error(), "Skipping unreadable entry");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        debug!(count = files.len(), "Discovered session files");
        Ok(files)
    }
}
