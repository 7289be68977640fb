//! Include graph and transitive include closure

use crate::types::HeaderId;
use std::collections::{BTreeMap, BTreeSet};

/// Direct local includes of every tracked header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeGraph(BTreeMap<HeaderId, BTreeSet<HeaderId>>);

impl IncludeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `header` with its direct includes, replacing any previous entry
    pub fn insert(&mut self, header: HeaderId, includes: BTreeSet<HeaderId>) {
        self.0.insert(header, includes);
    }

    pub fn get(&self, header: &str) -> Option<&BTreeSet<HeaderId>> {
        self.0.get(header)
    }

    pub fn contains(&self, header: &str) -> bool {
        self.0.contains_key(header)
    }

    pub fn headers(&self) -> impl Iterator<Item = &HeaderId> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderId, &BTreeSet<HeaderId>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of include edges
    pub fn edge_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Everything reachable from each header by one or more include hops.
    ///
    /// Each header's set is widened by the direct includes of its members
    /// until a pass adds nothing. Cycles converge; edges to headers outside
    /// the graph add nothing further.
    pub fn transitive_closure(&self) -> TransitiveClosure {
        let mut closure = BTreeMap::new();
        for (header, direct) in &self.0 {
            let mut reach = direct.clone();
            loop {
                let mut next = reach.clone();
                for member in &reach {
                    if let Some(includes) = self.0.get(member) {
                        next.extend(includes.iter().cloned());
                    }
                }
                if next == reach {
                    break;
                }
                reach = next;
            }
            closure.insert(header.clone(), reach);
        }
        debug_assert!(closure.keys().eq(self.0.keys()));
        TransitiveClosure(closure)
    }
}

impl FromIterator<(HeaderId, BTreeSet<HeaderId>)> for IncludeGraph {
    fn from_iter<I: IntoIterator<Item = (HeaderId, BTreeSet<HeaderId>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Fixed-point include reachability, total over the graph's headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitiveClosure(BTreeMap<HeaderId, BTreeSet<HeaderId>>);

impl TransitiveClosure {
    pub fn get(&self, header: &str) -> Option<&BTreeSet<HeaderId>> {
        self.0.get(header)
    }

    /// Whether `target` is reachable from `header`
    pub fn reaches(&self, header: &str, target: &str) -> bool {
        self.0
            .get(header)
            .is_some_and(|reach| reach.contains(target))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderId, &BTreeSet<HeaderId>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The closure viewed as a graph, so it can be closed again
    pub fn as_graph(&self) -> IncludeGraph {
        IncludeGraph(self.0.clone())
    }
}
