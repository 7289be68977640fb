//! Main audit orchestration logic

use crate::classify::{directory_counts, leaked_private_headers, visible_outside_api};
use crate::closure::{IncludeGraph, TransitiveClosure};
use crate::config::{ApiDirs, AuditConfig};
use crate::error::Result;
use crate::internal::is_internal_only;
use crate::parser::{parse_header_file, parse_source};
use crate::report::{ApiSurfaceReport, IgnoredHeader, ReportSummary};
use crate::tracked::{GitLsFiles, TrackedFiles, WalkedFiles};
use crate::types::{HeaderId, ParsedHeader};
use crate::visibility::{derive_visibility_set, BuildGraphQuery, GnDesc, JsonBuildGraph};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Parsed headers with their include graph, closure and internal-only set
#[derive(Debug, Clone, Default)]
pub struct HeaderAnalysis {
    pub parsed: BTreeMap<HeaderId, ParsedHeader>,
    /// Direct includes restricted to tracked headers
    pub graph: IncludeGraph,
    pub internal_only: BTreeSet<HeaderId>,
    pub closure: TransitiveClosure,
}

impl HeaderAnalysis {
    /// Build graph, internal-only set and closure from parsed headers
    pub fn from_parsed(parsed: BTreeMap<HeaderId, ParsedHeader>) -> Self {
        let graph: IncludeGraph = parsed
            .iter()
            .map(|(header, p)| {
                let direct: BTreeSet<HeaderId> = p
                    .includes
                    .iter()
                    .filter(|inc| parsed.contains_key(inc.as_str()))
                    .map(|inc| HeaderId::from(inc.as_str()))
                    .collect();
                (header.clone(), direct)
            })
            .collect();

        let internal_only: BTreeSet<HeaderId> = parsed
            .iter()
            .filter(|(_, p)| is_internal_only(&p.namespace_activity))
            .map(|(header, _)| header.clone())
            .collect();

        let closure = graph.transitive_closure();
        debug!(
            "Include graph: {} headers, {} edges",
            graph.len(),
            graph.edge_count()
        );

        Self {
            parsed,
            graph,
            internal_only,
            closure,
        }
    }

    /// Internal-only headers with the keys that made them so
    pub fn ignored_headers(&self) -> Vec<IgnoredHeader> {
        self.internal_only
            .iter()
            .map(|header| IgnoredHeader {
                header: header.clone(),
                namespaces: self
                    .parsed
                    .get(header)
                    .map(|p| p.namespace_activity.keys().map(|k| k.to_string()).collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Parse the given tracked headers from disk
pub fn analyze_headers(root: &Path, headers: &[HeaderId], parallel: bool) -> Result<HeaderAnalysis> {
    let parse_one = |header: &HeaderId| -> Result<(HeaderId, ParsedHeader)> {
        let parsed = parse_header_file(root, header)?;
        Ok((header.clone(), parsed))
    };

    let parsed: Vec<(HeaderId, ParsedHeader)> = if parallel {
        headers.par_iter().map(parse_one).collect::<Result<_>>()?
    } else {
        headers.iter().map(parse_one).collect::<Result<_>>()?
    };

    Ok(HeaderAnalysis::from_parsed(parsed.into_iter().collect()))
}

/// Parse headers held in memory, keyed by repository path
pub fn analyze_sources<K, V>(sources: impl IntoIterator<Item = (K, V)>) -> Result<HeaderAnalysis>
where
    K: Into<String>,
    V: AsRef<str>,
{
    let mut parsed = BTreeMap::new();
    for (header, text) in sources {
        let header = HeaderId::new(header);
        let result = parse_source(header.as_str(), text.as_ref())?;
        parsed.insert(header, result);
    }
    Ok(HeaderAnalysis::from_parsed(parsed))
}

/// Fold an analysis and a visibility set into the final report
pub fn build_report(
    root: impl Into<String>,
    analysis: &HeaderAnalysis,
    visible: &BTreeSet<HeaderId>,
    api_dirs: &ApiDirs,
) -> ApiSurfaceReport {
    let mut report = ApiSurfaceReport::new(root);

    for ignored in analysis.ignored_headers() {
        debug!("{} ignored as internal-only", ignored.header);
        report.ignored.push(ignored);
    }

    report.api_directories =
        directory_counts(analysis.graph.headers(), &analysis.internal_only, api_dirs);

    let outside = visible_outside_api(&analysis.graph, visible, api_dirs);
    report.leaked_private = leaked_private_headers(
        &analysis.closure,
        &outside,
        &analysis.internal_only,
        api_dirs,
    )
    .into_iter()
    .collect();
    report.visible_outside_api = outside.into_iter().collect();

    report.summary = ReportSummary {
        tracked_headers: analysis.graph.len(),
        include_edges: analysis.graph.edge_count(),
        internal_only_headers: analysis.internal_only.len(),
        api_headers: report.api_directories.total,
        visible_outside_api: report.visible_outside_api.len(),
        leaked_private: report.leaked_private.len(),
    };

    report
}

/// Audit a source tree with explicit collaborators.
///
/// `build` supplies the build description; without one the visibility set
/// is empty and only the API directory convention marks headers public.
pub fn audit_tree(
    root: &Path,
    config: &AuditConfig,
    tracked: &dyn TrackedFiles,
    build: Option<&dyn BuildGraphQuery>,
) -> Result<ApiSurfaceReport> {
    config.validate()?;
    info!("Starting header audit of: {}", root.display());

    let headers: Vec<HeaderId> = tracked
        .list(root)?
        .into_iter()
        .filter(|path| HeaderId::is_header(path))
        .map(HeaderId::from)
        .collect();
    info!("Found {} tracked headers", headers.len());

    let analysis = analyze_headers(root, &headers, config.parallel)?;

    let visible = match build {
        Some(query) => {
            let out_dir = config.build.out_dir.as_deref().unwrap_or(Path::new("out"));
            derive_visibility_set(&query.query(out_dir)?)?
        }
        None => {
            warn!("No build description configured; visibility set is empty");
            BTreeSet::new()
        }
    };

    let report = build_report(root.display().to_string(), &analysis, &visible, &config.api_dirs);

    info!(
        "Audit complete: {} API headers, {} visible outside API directories, {} leaked private headers",
        report.summary.api_headers,
        report.summary.visible_outside_api,
        report.summary.leaked_private,
    );

    Ok(report)
}

/// Audit a source tree using the collaborators named in `config`
pub fn audit_project(root: &Path, config: &AuditConfig) -> Result<ApiSurfaceReport> {
    let tracked: Box<dyn TrackedFiles> = if config.use_git {
        Box::new(GitLsFiles)
    } else {
        Box::new(WalkedFiles)
    };

    let build: Option<Box<dyn BuildGraphQuery>> = match (&config.build.build_graph_file, &config.build.out_dir) {
        (Some(file), _) => Some(Box::new(JsonBuildGraph::new(file))),
        (None, Some(_)) => Some(Box::new(GnDesc::new(config.build.gn_binary.clone()))),
        (None, None) => None,
    };

    audit_tree(root, config, tracked.as_ref(), build.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracked::FixedFiles;
    use crate::visibility::{BuildGraph, PublicFiles, StaticBuildGraph, TargetDescription};
    use std::fs;

    fn names(headers: &[HeaderId]) -> Vec<&str> {
        headers.iter().map(HeaderId::as_str).collect()
    }

    #[test]
    fn test_end_to_end_leak() {
        let analysis = analyze_sources([
            ("api/a.h", "#include \"impl/b.h\"\nnamespace ns {\nclass A;\n}\n"),
            (
                "impl/b.h",
                "#include \"impl/c.h\"\nnamespace ns {\nnamespace impl {\nclass B;\n}\n}\n",
            ),
            ("impl/c.h", "namespace ns {\nclass C;\n}\n"),
        ])
        .unwrap();

        let report = build_report(".", &analysis, &BTreeSet::new(), &ApiDirs::empty());
        assert_eq!(names(&report.leaked_private), vec!["impl/c.h"]);
        assert_eq!(report.ignored.len(), 1);
        assert_eq!(report.ignored[0].header.as_str(), "impl/b.h");
        assert_eq!(report.ignored[0].namespaces, vec!["ns::impl"]);
        assert_eq!(report.api_directories.total, 1);
    }

    #[test]
    fn test_untracked_includes_dropped() {
        let analysis = analyze_sources([
            ("a/x.h", "#include \"a/y.h\"\n#include \"third_party/z.h\"\n"),
            ("a/y.h", ""),
        ])
        .unwrap();
        let direct = analysis.graph.get("a/x.h").unwrap();
        assert_eq!(direct.len(), 1);
        assert!(direct.contains("a/y.h"));
        assert_eq!(analysis.closure.len(), 2);
    }

    #[test]
    fn test_audit_tree_with_fixed_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::create_dir_all(root.join("media")).unwrap();
        fs::write(root.join("api/a.h"), "#include \"media/m.h\"\nint a;\n").unwrap();
        fs::write(root.join("media/m.h"), "#include \"media/p.h\"\nint m;\n").unwrap();
        fs::write(root.join("media/p.h"), "int p;\n").unwrap();
        fs::write(root.join("media/m.cc"), "int x;\n").unwrap();

        let tracked = FixedFiles(vec![
            "api/a.h".into(),
            "media/m.h".into(),
            "media/p.h".into(),
            "media/m.cc".into(),
        ]);
        let mut graph = BuildGraph::new();
        graph.insert(
            "//media:m".into(),
            TargetDescription {
                public: PublicFiles::Listed(vec!["//media/m.h".into()]),
                sources: vec!["//media/m.cc".into(), "//media/p.h".into()],
                visibility: vec!["*".into()],
            },
        );
        let build = StaticBuildGraph(graph);

        let config = AuditConfig::builder()
            .api_dirs(ApiDirs::empty())
            .parallel(false)
            .build_config()
            .unwrap();
        let report = audit_tree(root, &config, &tracked, Some(&build)).unwrap();

        assert_eq!(report.summary.tracked_headers, 3);
        assert_eq!(names(&report.visible_outside_api), vec!["media/m.h"]);
        assert_eq!(names(&report.leaked_private), vec!["media/p.h"]);
    }

    #[test]
    fn test_missing_tracked_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tracked = FixedFiles(vec!["gone.h".into()]);
        let config = AuditConfig::default();
        let err = audit_tree(dir.path(), &config, &tracked, None).unwrap_err();
        assert!(matches!(err, crate::error::AuditError::MissingFile { .. }));
    }

    #[test]
    fn test_invalid_config_rejected_before_listing() {
        let config = AuditConfig {
            api_dirs: ["api/oops"].into_iter().collect(),
            ..AuditConfig::default()
        };
        let tracked = FixedFiles(vec!["never/read.h".into()]);
        let err = audit_tree(Path::new("/nonexistent"), &config, &tracked, None).unwrap_err();
        assert!(matches!(err, crate::error::AuditError::ConfigError(_)));
    }
}
