//! The query file: hand-off between the harvester and the playlist builder.
//!
//! One [`SearchQuery`] per line, UTF-8, newline-terminated. Writes go to a
//! temporary sibling first and are renamed into place, so a failed harvest
//! never leaves a truncated file behind.

use std::path::{Path, PathBuf};

use crate::model::SearchQuery;

/// Query file errors
#[derive(Debug, thiserror::Error)]
pub enum QueryFileError {
    #[error("Failed to read query file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to write query file {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

/// Write queries to `path`, replacing any previous file atomically.
pub fn write(path: &Path, queries: &[SearchQuery]) -> Result<(), QueryFileError> {
    let mut contents = String::with_capacity(queries.len() * 48);
    for query in queries {
        contents.push_str(query.as_str());
        contents.push('\n');
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| QueryFileError::Write(dir.to_path_buf(), e))?;
    }

    let temp_path = temp_path_for(path);
    std::fs::write(&temp_path, contents).map_err(|e| QueryFileError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| QueryFileError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::debug!(path = %path.display(), count = queries.len(), "Query file written");
    Ok(())
}

/// Read queries from `path` in file order. Blank lines are skipped.
pub fn read(path: &Path) -> Result<Vec<SearchQuery>, QueryFileError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| QueryFileError::Read(path.to_path_buf(), e))?;
    Ok(parse(&contents))
}

/// Parse file contents into queries.
pub fn parse(contents: &str) -> Vec<SearchQuery> {
    contents
        .lines()
        .filter_map(|line| {
            let query = SearchQuery::from_line(line)?;
            if query.parts().is_none() {
                tracing::warn!(line = %query, "Query line is not in track/artist form, searching verbatim");
            }
            Some(query)
        })
        .collect()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "tracks.txt".into());
    name.push(".tmp");
    path.with_file_name(name)
}
