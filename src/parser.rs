//! Header parser: local includes and namespace activity
//!
//! The parser is a small automaton over sanitized lines. It keeps a stack of
//! open brace scopes, each labelled with the namespace path it belongs to, and
//! a pending namespace for `namespace NAME` lines whose `{` comes later.

use crate::error::{AuditError, Result};
use crate::sanitize::SanitizedLines;
use crate::types::{ActivityKey, HeaderId, NamespaceActivity, NamespacePath, ParsedHeader, Segment};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static NAMESPACE_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*namespace\b\s*([A-Za-z0-9_]+(?:\s*::\s*[A-Za-z0-9_]+)*)?\s*(.*)$")
        .expect("valid regex literal")
});

static LOCAL_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#\s*include\s+"([A-Za-z0-9_/-]+\.h)"\s*$"#).expect("valid regex literal")
});

static DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*define\s+(\S+)").expect("valid regex literal"));

/// Suffix of header-guard macros, which are not counted as activity
const HEADER_GUARD_SUFFIX: &str = "_H_";

/// Line-by-line parser state for one header
#[derive(Debug)]
pub struct HeaderParser {
    header: String,
    line: usize,
    stack: Vec<NamespacePath>,
    pending: Vec<Segment>,
    includes: BTreeSet<String>,
    activity: NamespaceActivity,
}

impl HeaderParser {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            line: 0,
            stack: vec![NamespacePath::global()],
            pending: Vec::new(),
            includes: BTreeSet::new(),
            activity: NamespaceActivity::new(),
        }
    }

    /// Current brace nesting depth (0 at global scope)
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Namespace path that a `;` would be attributed to right now
    pub fn current_scope(&self) -> &NamespacePath {
        self.top()
    }

    /// Consume one already-sanitized line
    pub fn feed_line(&mut self, line: &str) -> Result<()> {
        self.line += 1;

        if let Some(caps) = NAMESPACE_OPENER.captures(line) {
            let segments = namespace_segments(caps.get(1).map_or("", |m| m.as_str()));
            let rest = caps.get(2).map_or("", |m| m.as_str());
            if rest.is_empty() {
                self.pending = segments;
                return Ok(());
            }
            if rest.starts_with('{') {
                return self.open_namespace_inline(line, segments, &rest[1..]);
            }
            if rest.contains('}') {
                return Err(self.violation("unexpected closing brace on namespace opener line"));
            }
            // `namespace a = b::c;` and friends: an ordinary line
        }

        if let Some(caps) = LOCAL_INCLUDE.captures(line) {
            self.includes.insert(caps[1].to_string());
            return Ok(());
        }

        if let Some(caps) = DEFINE.captures(line) {
            if !caps[1].ends_with(HEADER_GUARD_SUFFIX) {
                *self.activity.entry(ActivityKey::Macros).or_insert(0) += 1;
            }
            // Multi-line macro bodies may still open or close braces.
        }

        self.scan(line)
    }

    /// Final result; scopes still open at end of file are ignored
    pub fn finish(self) -> ParsedHeader {
        if self.stack.len() > 1 {
            debug!(
                "{}: {} scope(s) still open at end of file",
                self.header,
                self.stack.len() - 1
            );
        }
        ParsedHeader {
            includes: self.includes,
            namespace_activity: self.activity,
        }
    }

    fn open_namespace_inline(&mut self, line: &str, segments: Vec<Segment>, body: &str) -> Result<()> {
        if line.matches('{').count() != 1 {
            return Err(self.violation("namespace opener line must contain exactly one `{`"));
        }
        if line.matches('}').count() > 1 {
            return Err(self.violation("unexpected closing brace on namespace opener line"));
        }
        let scope = self.top().join(&segments);
        self.stack.push(scope);
        self.pending.clear();
        // Only `;` and at most the one `}` closing this namespace remain.
        self.scan(body)
    }

    fn scan(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            match c {
                '{' => {
                    let scope = self.top().join(&self.pending);
                    self.stack.push(scope);
                    self.pending.clear();
                }
                '}' => {
                    if self.stack.len() == 1 {
                        return Err(self.violation("unbalanced closing brace"));
                    }
                    self.stack.pop();
                }
                ';' => {
                    let key = ActivityKey::Namespace(self.top().clone());
                    *self.activity.entry(key).or_insert(0) += 1;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn top(&self) -> &NamespacePath {
        // The global frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn violation(&self, message: &str) -> AuditError {
        AuditError::parse_invariant(self.header.clone(), self.line, message)
    }
}

/// Segments of a (possibly nested, possibly empty) namespace name
fn namespace_segments(name: &str) -> Vec<Segment> {
    if name.is_empty() {
        return vec![Segment::Anonymous];
    }
    name.split("::").map(|part| Segment::from_name(part.trim())).collect()
}

/// Parse header text already in memory
pub fn parse_source(header: &str, text: &str) -> Result<ParsedHeader> {
    let mut parser = HeaderParser::new(header);
    for line in SanitizedLines::new(text.lines()) {
        parser.feed_line(&line)?;
    }
    Ok(parser.finish())
}

/// Read and parse a tracked header relative to `root`
pub fn parse_header_file(root: &Path, header: &HeaderId) -> Result<ParsedHeader> {
    let path = root.join(header.as_str());
    let bytes = fs::read(&path).map_err(|e| AuditError::missing_file(&path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    parse_source(header.as_str(), &text)
}
