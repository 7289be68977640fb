//! Tracked file enumeration
//!
//! The audit only needs a list of repository-relative paths. Where that list
//! comes from is up to the caller: `git ls-files`, a directory walk, or a
//! fixed list in tests.

use crate::error::{AuditError, Result};
use ignore::WalkBuilder;
use std::path::{Component, Path};
use std::process::Command;
use tracing::debug;

/// Source of repository-relative, `/`-separated file paths
pub trait TrackedFiles {
    fn list(&self, root: &Path) -> Result<Vec<String>>;
}

/// `git ls-files` run inside the root
#[derive(Debug, Clone, Default)]
pub struct GitLsFiles;

impl TrackedFiles for GitLsFiles {
    fn list(&self, root: &Path) -> Result<Vec<String>> {
        let output = Command::new("git")
            .arg("ls-files")
            .current_dir(root)
            .output()
            .map_err(|e| AuditError::command("git ls-files", e.to_string()))?;
        if !output.status.success() {
            return Err(AuditError::command(
                "git ls-files",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let files: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        debug!("git ls-files listed {} files", files.len());
        Ok(files)
    }
}

/// Directory walk honouring `.gitignore`, for trees without a git checkout
#[derive(Debug, Clone, Default)]
pub struct WalkedFiles;

impl TrackedFiles for WalkedFiles {
    fn list(&self, root: &Path) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false)
            .build()
        {
            let entry = entry.map_err(|e| AuditError::command("directory walk", e.to_string()))?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(to_repo_path(relative));
            }
        }
        files.sort();
        debug!("walk of {} found {} files", root.display(), files.len());
        Ok(files)
    }
}

/// A fixed list of paths
#[derive(Debug, Clone, Default)]
pub struct FixedFiles(pub Vec<String>);

impl TrackedFiles for FixedFiles {
    fn list(&self, _root: &Path) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// `/`-joined form of a relative path, whatever the host separator
fn to_repo_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_walk_lists_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("api/audio")).unwrap();
        fs::write(dir.path().join("api/audio/a.h"), "").unwrap();
        fs::write(dir.path().join("top.h"), "").unwrap();
        fs::write(dir.path().join("x.cc"), "").unwrap();

        let files = WalkedFiles.list(dir.path()).unwrap();
        assert_eq!(files, vec!["api/audio/a.h", "top.h", "x.cc"]);
    }

    #[test]
    fn test_fixed_files() {
        let files = FixedFiles(vec!["a.h".into()]).list(Path::new("/nonexistent")).unwrap();
        assert_eq!(files, vec!["a.h"]);
    }

    #[test]
    fn test_repo_path_separator() {
        let path: std::path::PathBuf = ["modules", "include", "m.h"].iter().collect();
        assert_eq!(to_repo_path(&path), "modules/include/m.h");
    }
}
