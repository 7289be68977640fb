//! API surface classification
//!
//! Three read-only views over the parsed tree: how many headers sit in each
//! API directory, which build-visible headers live outside those directories,
//! and which private headers public headers drag in transitively.

use crate::closure::{IncludeGraph, TransitiveClosure};
use crate::config::ApiDirs;
use crate::report::{DirectoryCount, DirectoryTable};
use crate::types::HeaderId;
use std::collections::{BTreeMap, BTreeSet};

/// Count non-internal headers per API directory bucket.
///
/// Every bucket gets a row, empty or not. Rows are sorted ascending by
/// count, then name; the total is the sum of all rows.
pub fn directory_counts<'a>(
    headers: impl IntoIterator<Item = &'a HeaderId>,
    internal_only: &BTreeSet<HeaderId>,
    api_dirs: &ApiDirs,
) -> DirectoryTable {
    let mut counts: BTreeMap<&str, usize> =
        api_dirs.buckets().into_iter().map(|d| (d, 0)).collect();
    for header in headers {
        if internal_only.contains(header) {
            continue;
        }
        if let Some(dir) = api_dirs.dir_of(header) {
            *counts.entry(dir).or_insert(0) += 1;
        }
    }

    let total: usize = counts.values().sum();
    let mut rows: Vec<DirectoryCount> = counts
        .into_iter()
        .map(|(dir, count)| DirectoryCount::new(dir, count, total))
        .collect();
    rows.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.directory.cmp(&b.directory)));

    DirectoryTable { rows, total }
}

/// Build-visible tracked headers that are not in any API directory
pub fn visible_outside_api(
    graph: &IncludeGraph,
    visible: &BTreeSet<HeaderId>,
    api_dirs: &ApiDirs,
) -> BTreeSet<HeaderId> {
    visible
        .iter()
        .filter(|h| graph.contains(h.as_str()) && !api_dirs.contains(h))
        .cloned()
        .collect()
}

/// Public means build-visible or inside an API directory
pub fn is_public(header: &HeaderId, visible: &BTreeSet<HeaderId>, api_dirs: &ApiDirs) -> bool {
    visible.contains(header) || api_dirs.contains(header)
}

/// Non-public, non-internal headers reachable from any public header
pub fn leaked_private_headers(
    closure: &TransitiveClosure,
    visible: &BTreeSet<HeaderId>,
    internal_only: &BTreeSet<HeaderId>,
    api_dirs: &ApiDirs,
) -> BTreeSet<HeaderId> {
    let mut leaked = BTreeSet::new();
    for (header, reach) in closure.iter() {
        if !is_public(header, visible, api_dirs) {
            continue;
        }
        leaked.extend(
            reach
                .iter()
                .filter(|h| !is_public(h, visible, api_dirs) && !internal_only.contains(*h))
                .cloned(),
        );
    }
    leaked
}
