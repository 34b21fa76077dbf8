use crate::utils::error::{Result, SyntheticsError};
use std::path::{Path, PathBuf};

/// Expands a leading `~` to the current user's home directory.
///
/// Paths that do not start with `~` (including the empty path) are returned
/// unchanged. `~user` forms are rejected.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    expand_home_with(path, dirs::home_dir().as_deref())
}

pub(crate) fn expand_home_with(path: &str, home: Option<&Path>) -> Result<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    if !rest.is_empty() && !rest.starts_with('/') && !rest.starts_with('\\') {
        return Err(SyntheticsError::UserHomeExpansion {
            path: path.to_string(),
        });
    }

    let home = home.ok_or_else(|| SyntheticsError::HomeDirUnavailable {
        path: path.to_string(),
    })?;

    let relative = rest.trim_start_matches(['/', '\\']);
    if relative.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(relative))
    }
}

/// Reads the whole file at `path` after home-directory expansion.
pub fn load_file_content(path: &str) -> Result<Vec<u8>> {
    let filename = expand_home(path)?;
    tracing::debug!("Loading file content from {}", filename.display());

    std::fs::read(&filename).map_err(|source| SyntheticsError::FileReadError {
        path: filename,
        source,
    })
}
