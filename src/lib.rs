//! # header_surface_audit
//!
//! Include-graph and API-surface audit for C/C++ header trees:
//! - **Header parsing**: local `#include` edges and per-namespace declaration activity
//! - **Internal-only detection**: headers that only declare `impl`/`internal` namespaces
//! - **Transitive closure**: every header reachable from every header
//! - **API surface hygiene**: API directory counts, build-visible headers outside
//!   API directories, and private headers leaked through public ones
//!
//! ## Quick Start
//!
//! ```no_run
//! use header_surface_audit::{audit_project, AuditConfig};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AuditConfig::default();
//! let report = audit_project(Path::new("."), &config)?;
//!
//! print!("{}", report.render_text());
//! for header in &report.leaked_private {
//!     println!("leaked: {}", header);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## In-memory analysis
//!
//! ```
//! use header_surface_audit::{analyze_sources, build_report, ApiDirs};
//! use std::collections::BTreeSet;
//!
//! let analysis = analyze_sources([
//!     ("api/a.h", "#include \"impl/b.h\"\nnamespace ns {\nclass A;\n}\n"),
//!     ("impl/b.h", "namespace ns {\nclass B;\n}\n"),
//! ])
//! .unwrap();
//! let report = build_report(".", &analysis, &BTreeSet::new(), &ApiDirs::empty());
//! assert_eq!(report.leaked_private[0].as_str(), "impl/b.h");
//! ```

mod audit;
mod classify;
mod closure;
mod config;
mod error;
mod internal;
mod parser;
mod report;
mod sanitize;
mod tracked;
mod types;
mod visibility;

// Re-export public API
pub use audit::{analyze_headers, analyze_sources, audit_project, audit_tree, build_report, HeaderAnalysis};
pub use classify::{directory_counts, is_public, leaked_private_headers, visible_outside_api};
pub use closure::{IncludeGraph, TransitiveClosure};
pub use config::{ApiDirs, AuditConfig, AuditConfigBuilder, BuildConfig, CheckThresholds, ROOT_API_DIR};
pub use error::{AuditError, Result};
pub use internal::{is_internal_namespace, is_internal_only};
pub use parser::{parse_header_file, parse_source, HeaderParser};
pub use report::{ApiSurfaceReport, DirectoryCount, DirectoryTable, IgnoredHeader, ReportSummary};
pub use sanitize::{sanitize_line, sanitize_lines, SanitizedLines};
pub use tracked::{FixedFiles, GitLsFiles, TrackedFiles, WalkedFiles};
pub use types::{ActivityKey, HeaderId, NamespaceActivity, NamespacePath, ParsedHeader, Segment};
pub use visibility::{
    derive_visibility_set, BuildGraph, BuildGraphQuery, GnDesc, JsonBuildGraph, PublicFiles,
    StaticBuildGraph, TargetDescription,
};
