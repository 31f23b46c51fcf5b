use std::path::Path;

use anyhow::{Context, Result};

use crate::core::document::SourceFile;

/// Read user-selected files into plain-text records. An unreadable path is
/// a hard error (there is nothing to draft from); an empty file is kept
/// as-is and produces an empty section in the composed prompt.
pub async fn read_source_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_text_plain()
            .essence_str()
            .to_string();
        files.push(SourceFile {
            name,
            content,
            mime_type,
        });
    }
    Ok(files)
}
