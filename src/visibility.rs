//! Build visibility: which headers the build system exports
//!
//! The build description is the JSON produced by `gn desc --format=json
//! <out_dir> '*'`: an object keyed by target label, each target carrying
//! `public`, `sources` and `visibility`. Only those three keys are read.

use crate::error::{AuditError, Result};
use crate::types::HeaderId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

const WILDCARD: &str = "*";
const SOURCE_ROOT_PREFIX: &str = "//";

/// Build targets keyed by label
pub type BuildGraph = BTreeMap<String, TargetDescription>;

/// The parts of a build target the audit cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescription {
    #[serde(default)]
    pub public: PublicFiles,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_visibility")]
    pub visibility: Vec<String>,
}

/// A target's `public` value: `"*"` or an explicit file list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicFiles {
    Listed(Vec<String>),
    Pattern(String),
}

impl Default for PublicFiles {
    fn default() -> Self {
        PublicFiles::Pattern(WILDCARD.to_string())
    }
}

fn default_visibility() -> Vec<String> {
    vec![WILDCARD.to_string()]
}

impl TargetDescription {
    /// Split the target's files into (public, private).
    ///
    /// `public = "*"` makes every source public and nothing private.
    pub fn public_private_files(&self, target: &str) -> Result<(Vec<String>, Vec<String>)> {
        match &self.public {
            PublicFiles::Pattern(p) if p == WILDCARD => Ok((self.sources.clone(), Vec::new())),
            PublicFiles::Pattern(p) => Err(AuditError::config(format!(
                "target {}: unsupported `public` value {:?}",
                target, p
            ))),
            PublicFiles::Listed(files) => Ok((files.clone(), self.sources.clone())),
        }
    }

    /// Whether the target may be depended on from anywhere.
    ///
    /// A list made only of `//` label patterns is restricted; a list holding
    /// `*` is public; anything else cannot be interpreted.
    pub fn is_publicly_visible(&self, target: &str) -> Result<bool> {
        if self
            .visibility
            .iter()
            .all(|v| v.starts_with(SOURCE_ROOT_PREFIX))
        {
            return Ok(false);
        }
        if self.visibility.iter().any(|v| v == WILDCARD) {
            return Ok(true);
        }
        Err(AuditError::config(format!(
            "target {}: can't handle visibility value {:?}",
            target, self.visibility
        )))
    }
}

/// Public headers of every publicly visible target, as repository paths
pub fn derive_visibility_set(graph: &BuildGraph) -> Result<BTreeSet<HeaderId>> {
    let mut visible = BTreeSet::new();
    for (target, props) in graph {
        let (public_files, _private_files) = props.public_private_files(target)?;
        if !props.is_publicly_visible(target)? {
            continue;
        }
        for file in public_files {
            let Some(path) = file.strip_prefix(SOURCE_ROOT_PREFIX) else {
                return Err(AuditError::config(format!(
                    "target {}: public file `{}` is not source-absolute",
                    target, file
                )));
            };
            if HeaderId::is_header(path) {
                visible.insert(HeaderId::from(path));
            }
        }
    }
    debug!(
        "{} build targets yielded {} visible headers",
        graph.len(),
        visible.len()
    );
    Ok(visible)
}

/// Source of the build description for an output directory
pub trait BuildGraphQuery {
    fn query(&self, out_dir: &Path) -> Result<BuildGraph>;
}

/// Runs `gn desc --format=json <out_dir> *`
#[derive(Debug, Clone)]
pub struct GnDesc {
    binary: String,
}

impl GnDesc {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for GnDesc {
    fn default() -> Self {
        Self::new("gn")
    }
}

impl BuildGraphQuery for GnDesc {
    fn query(&self, out_dir: &Path) -> Result<BuildGraph> {
        let command = format!("{} desc --format=json {} *", self.binary, out_dir.display());
        info!("Querying build graph: {}", command);
        let output = Command::new(&self.binary)
            .arg("desc")
            .arg("--format=json")
            .arg(out_dir)
            .arg(WILDCARD)
            .output()
            .map_err(|e| AuditError::command(&command, e.to_string()))?;
        if !output.status.success() {
            return Err(AuditError::command(
                &command,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// A saved build description; the output directory is ignored
#[derive(Debug, Clone)]
pub struct JsonBuildGraph {
    path: PathBuf,
}

impl JsonBuildGraph {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BuildGraphQuery for JsonBuildGraph {
    fn query(&self, _out_dir: &Path) -> Result<BuildGraph> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| AuditError::missing_file(&self.path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// In-memory build description
#[derive(Debug, Clone, Default)]
pub struct StaticBuildGraph(pub BuildGraph);

impl BuildGraphQuery for StaticBuildGraph {
    fn query(&self, _out_dir: &Path) -> Result<BuildGraph> {
        Ok(self.0.clone())
    }
}
