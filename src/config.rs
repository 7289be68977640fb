//! Configuration for the header audit

use crate::error::{AuditError, Result};
use crate::types::HeaderId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Root-level API directory, matched by path prefix
pub const ROOT_API_DIR: &str = "api";

const ROOT_API_PREFIX: &str = "api/";

/// Main configuration for the audit process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directories whose headers are public API by convention
    pub api_dirs: ApiDirs,
    /// Where the build visibility data comes from
    pub build: BuildConfig,
    /// Limits used by `check`
    pub check: CheckThresholds,
    /// List tracked files with `git ls-files` (otherwise walk the tree)
    pub use_git: bool,
    /// Parse headers on the rayon thread pool
    pub parallel: bool,
}

/// Configured API directory names.
///
/// `api/` is always an API directory and is matched by prefix; every other
/// entry must equal a header's parent directory exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiDirs(BTreeSet<String>);

/// Build description source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build output directory handed to `gn desc`
    pub out_dir: Option<PathBuf>,
    /// `gn` executable
    pub gn_binary: String,
    /// Saved `gn desc --format=json` output, used instead of running `gn`
    pub build_graph_file: Option<PathBuf>,
}

/// Thresholds for the `check` command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckThresholds {
    /// Maximum acceptable number of leaked private headers
    pub max_leaked_headers: Option<usize>,
    /// Maximum acceptable number of visible headers outside API directories
    pub max_visible_outside_api: Option<usize>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            api_dirs: ApiDirs::default(),
            build: BuildConfig::default(),
            check: CheckThresholds::default(),
            use_git: true,
            parallel: true,
        }
    }
}

impl Default for ApiDirs {
    fn default() -> Self {
        [
            "media/base",
            "media/engine",
            "modules/audio_device/include",
            "pc",
            "common_audio/include",
            "modules/audio_coding/include",
            "modules/audio_processing/include",
            "modules/congestion_controller/include",
            "modules/include",
            "modules/remote_bitrate_estimator/include",
            "modules/rtp_rtcp/include",
            "modules/rtp_rtcp/source",
            "modules/utility/include",
            "modules/video_coding/codecs/h264/include",
            "modules/video_coding/codecs/vp8/include",
            "modules/video_coding/codecs/vp9/include",
            "modules/video_coding/include",
            "rtc_base",
            "system_wrappers/include",
        ]
        .into_iter()
        .collect()
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: None,
            gn_binary: "gn".to_string(),
            build_graph_file: None,
        }
    }
}

impl ApiDirs {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, dir: impl Into<String>) {
        self.0.insert(dir.into());
    }

    /// Configured names, without the implicit root `api` bucket
    pub fn configured(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str).filter(|d| *d != ROOT_API_DIR)
    }

    /// Every report bucket: the root `api` bucket plus the configured names
    pub fn buckets(&self) -> BTreeSet<&str> {
        let mut buckets: BTreeSet<&str> = self.configured().collect();
        buckets.insert(ROOT_API_DIR);
        buckets
    }

    /// Reject names that are empty or shadow the `api/` prefix rule
    pub fn validate(&self) -> Result<()> {
        for dir in &self.0 {
            if dir.is_empty() {
                return Err(AuditError::config("API directory names must not be empty"));
            }
            if dir.starts_with(ROOT_API_PREFIX) {
                return Err(AuditError::config(format!(
                    "API directory `{}` overlaps the `{}` prefix, which is always an API directory",
                    dir, ROOT_API_PREFIX
                )));
            }
            if dir.starts_with('/') || dir.ends_with('/') {
                return Err(AuditError::config(format!(
                    "API directory `{}` must be a repository-relative path without leading or trailing `/`",
                    dir
                )));
            }
        }
        Ok(())
    }

    /// The API directory `header` lives in, if any
    pub fn dir_of<'a>(&'a self, header: &HeaderId) -> Option<&'a str> {
        if header.as_str().starts_with(ROOT_API_PREFIX) {
            return Some(ROOT_API_DIR);
        }
        let parent = header.parent_dir()?;
        self.0
            .get(parent)
            .map(String::as_str)
            .filter(|d| *d != ROOT_API_DIR)
    }

    pub fn contains(&self, header: &HeaderId) -> bool {
        self.dir_of(header).is_some()
    }
}

impl<S: Into<String>> FromIterator<S> for ApiDirs {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl AuditConfig {
    /// Create a new builder for AuditConfig
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Parse a TOML configuration document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AuditConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that must hold before any analysis starts
    pub fn validate(&self) -> Result<()> {
        self.api_dirs.validate()
    }
}

/// Builder for AuditConfig
#[derive(Default)]
pub struct AuditConfigBuilder {
    api_dirs: Option<ApiDirs>,
    extra_api_dirs: Vec<String>,
    build: Option<BuildConfig>,
    check: Option<CheckThresholds>,
    use_git: Option<bool>,
    parallel: Option<bool>,
}

impl AuditConfigBuilder {
    /// Replace the default API directory list
    pub fn api_dirs(mut self, dirs: ApiDirs) -> Self {
        self.api_dirs = Some(dirs);
        self
    }

    /// Add one API directory on top of the list
    pub fn api_dir(mut self, dir: impl Into<String>) -> Self {
        self.extra_api_dirs.push(dir.into());
        self
    }

    pub fn build(mut self, build: BuildConfig) -> Self {
        self.build = Some(build);
        self
    }

    pub fn check(mut self, thresholds: CheckThresholds) -> Self {
        self.check = Some(thresholds);
        self
    }

    pub fn use_git(mut self, use_git: bool) -> Self {
        self.use_git = Some(use_git);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn build_config(self) -> Result<AuditConfig> {
        let defaults = AuditConfig::default();
        let mut api_dirs = self.api_dirs.unwrap_or(defaults.api_dirs);
        for dir in self.extra_api_dirs {
            api_dirs.insert(dir);
        }
        let config = AuditConfig {
            api_dirs,
            build: self.build.unwrap_or(defaults.build),
            check: self.check.unwrap_or(defaults.check),
            use_git: self.use_git.unwrap_or(defaults.use_git),
            parallel: self.parallel.unwrap_or(defaults.parallel),
        };
        config.validate()?;
        Ok(config)
    }
}
