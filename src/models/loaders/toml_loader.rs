//! Batch file loader.
//!
//! A batch file is a TOML document describing one submission run: which user
//! it belongs to, which project it targets, and the bug reports themselves.
//! Each `[[bugs]]` entry is either a structured report or a `text` block that
//! still needs to be expanded by the text-generation chain.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::error::{AppError, Result};
use crate::models::bug_report::BugReport;

/// One `[[bugs]]` entry of a batch file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BugEntry {
    /// Fully structured report, inserted as-is.
    Structured(BugReport),
    /// Free text, expanded into a structured report before submission.
    FreeText { text: String },
}

/// One pending batch file.
#[derive(Debug, Deserialize)]
pub struct BatchFile {
    /// Owner of the batch; used to look up stored credentials and projects.
    pub user: Option<String>,
    /// Target project; falls back to the user's selected project.
    pub project_url: Option<String>,
    #[serde(default)]
    pub bugs: Vec<BugEntry>,
    /// Where the file was loaded from, for cleanup after processing.
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

/// Loads a single batch file.
pub async fn load_batch_file(path: &Path) -> Result<BatchFile> {
    let content = fs::read_to_string(path).await.map_err(|e| AppError::Storage {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut batch: BatchFile = toml::from_str(&content).map_err(|e| AppError::Toml {
        path: path.display().to_string(),
        source: e,
    })?;

    batch.file_path = Some(path.to_path_buf());
    Ok(batch)
}

/// Scans a folder for `.toml` batch files. Unparseable files are skipped with
/// a warning so one bad file cannot block the rest of the queue.
pub async fn load_all_batch_files(folder_path: &str) -> Result<Vec<BatchFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::Config(format!(
            "report folder does not exist: {}",
            folder_path
        )));
    }

    let mut batches = Vec::new();
    let mut entries = fs::read_dir(&folder).await.map_err(|e| AppError::Storage {
        path: folder_path.to_string(),
        source: e,
    })?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "loading batch file: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_batch_file(&path).await {
                Ok(batch) => {
                    tracing::info!("loaded {} bug entries", batch.bugs.len());
                    batches.push(batch);
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_structured_and_free_text_entries() {
        let dir = std::env::temp_dir().join("bug_report_submit_loader_test");
        fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("batch.toml");
        fs::write(
            &path,
            r#"
user = "42"
project_url = "https://netronic.worksection.com/project/123/"

[[bugs]]
title = "Кнопка не работает"
steps = "1. Нажать кнопку"

[[bugs]]
text = "при входе в приложение экран мигает"
"#,
        )
        .await
        .unwrap();

        let batch = load_batch_file(&path).await.unwrap();
        assert_eq!(batch.user.as_deref(), Some("42"));
        assert_eq!(batch.bugs.len(), 2);
        assert!(matches!(&batch.bugs[0], BugEntry::Structured(b) if b.title == "Кнопка не работает"));
        assert!(matches!(&batch.bugs[1], BugEntry::FreeText { .. }));
        assert_eq!(batch.file_path.as_deref(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn missing_folder_is_a_config_error() {
        let result = load_all_batch_files("definitely_not_a_folder_xyz").await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
