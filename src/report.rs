//! Report data model and renderers

use crate::error::Result;
use crate::types::HeaderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label of the final row of the API directory table
pub const TOTAL_ROW: &str = "TOTAL";

/// Complete API surface report for one source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSurfaceReport {
    /// Root of the analysed tree
    pub root: String,
    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
    /// Headers skipped because they only declare internal namespaces
    pub ignored: Vec<IgnoredHeader>,
    /// Non-internal header counts per API directory
    pub api_directories: DirectoryTable,
    /// Build-visible headers outside every API directory
    pub visible_outside_api: Vec<HeaderId>,
    /// Private headers transitively included by public headers
    pub leaked_private: Vec<HeaderId>,
    /// Summary statistics
    pub summary: ReportSummary,
}

/// An internal-only header and the keys that made it so
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredHeader {
    pub header: HeaderId,
    /// Displayed activity keys; empty when the header declares nothing
    pub namespaces: Vec<String>,
}

/// One row of the API directory table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryCount {
    pub directory: String,
    pub count: usize,
    /// Share of the table total, 0.0 when the total is zero
    pub percent: f64,
}

/// Per-directory rows, ascending by count, plus their total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryTable {
    pub rows: Vec<DirectoryCount>,
    pub total: usize,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub tracked_headers: usize,
    pub include_edges: usize,
    pub internal_only_headers: usize,
    pub api_headers: usize,
    pub visible_outside_api: usize,
    pub leaked_private: usize,
}

impl DirectoryCount {
    pub fn new(directory: impl Into<String>, count: usize, total: usize) -> Self {
        Self {
            directory: directory.into(),
            count,
            percent: percent_of(count, total),
        }
    }
}

fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

impl DirectoryTable {
    /// The closing TOTAL row
    pub fn total_row(&self) -> DirectoryCount {
        DirectoryCount::new(TOTAL_ROW, self.total, self.total)
    }
}

impl ApiSurfaceReport {
    /// Create an empty report for `root`
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            timestamp: Utc::now(),
            ignored: Vec::new(),
            api_directories: DirectoryTable::default(),
            visible_outside_api: Vec::new(),
            leaked_private: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    /// The four-section plain text report
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for ignored in &self.ignored {
            let keys = if ignored.namespaces.is_empty() {
                "empty".to_string()
            } else {
                ignored.namespaces.join(", ")
            };
            out.push_str(&format!("{} ignored ({})\n", ignored.header, keys));
        }
        out.push('\n');

        out.push_str("Headers in API directories:\n");
        for row in self
            .api_directories
            .rows
            .iter()
            .chain(std::iter::once(&self.api_directories.total_row()))
        {
            out.push_str(&format!(
                "{:4}  {:5.1}%  {}\n",
                row.count, row.percent, row.directory
            ));
        }
        out.push('\n');

        out.push_str("Visible headers not in API directories:\n");
        for header in &self.visible_outside_api {
            out.push_str(&format!("  {}\n", header));
        }
        out.push_str(&format!(
            "Total: {} visible headers not in API directories\n",
            self.visible_outside_api.len()
        ));
        out.push('\n');

        out.push_str("Non-public headers transitively #included by public headers:\n");
        for header in &self.leaked_private {
            out.push_str(&format!("  {}\n", header));
        }
        out.push_str(&format!(
            "Total: {} non-public headers #included by public headers\n",
            self.leaked_private.len()
        ));
        out.push('\n');

        out
    }

    /// Pretty JSON
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Markdown with one section per report part
    pub fn render_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Header API Surface Report: {}\n\n", self.root));
        md.push_str(&format!("**Generated:** {}\n\n", self.timestamp));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- Tracked headers: {}\n", self.summary.tracked_headers));
        md.push_str(&format!("- Include edges: {}\n", self.summary.include_edges));
        md.push_str(&format!(
            "- Internal-only headers: {}\n",
            self.summary.internal_only_headers
        ));
        md.push_str(&format!("- Headers in API directories: {}\n", self.summary.api_headers));
        md.push_str(&format!(
            "- Visible headers outside API directories: {}\n",
            self.summary.visible_outside_api
        ));
        md.push_str(&format!(
            "- Leaked private headers: {}\n\n",
            self.summary.leaked_private
        ));

        md.push_str("## API Directories\n\n");
        md.push_str("| Directory | Headers | Share |\n");
        md.push_str("|-----------|---------|-------|\n");
        for row in &self.api_directories.rows {
            md.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                row.directory, row.count, row.percent
            ));
        }
        let total = self.api_directories.total_row();
        md.push_str(&format!(
            "| **{}** | **{}** | {:.1}% |\n\n",
            total.directory, total.count, total.percent
        ));

        md.push_str("## Visible Headers Outside API Directories\n\n");
        push_markdown_list(&mut md, &self.visible_outside_api);

        md.push_str("## Leaked Private Headers\n\n");
        push_markdown_list(&mut md, &self.leaked_private);

        if !self.ignored.is_empty() {
            md.push_str("## Ignored Internal-Only Headers\n\n");
            for ignored in &self.ignored {
                let keys = if ignored.namespaces.is_empty() {
                    "empty".to_string()
                } else {
                    ignored.namespaces.join(", ")
                };
                md.push_str(&format!("- `{}` ({})\n", ignored.header, keys));
            }
            md.push('\n');
        }

        md
    }
}

fn push_markdown_list(md: &mut String, headers: &[HeaderId]) {
    if headers.is_empty() {
        md.push_str("_None._\n\n");
        return;
    }
    for header in headers {
        md.push_str(&format!("- `{}`\n", header));
    }
    md.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiSurfaceReport {
        let mut report = ApiSurfaceReport::new("/src/webrtc");
        report.ignored = vec![
            IgnoredHeader {
                header: "impl/b.h".into(),
                namespaces: vec!["ns::impl".into()],
            },
            IgnoredHeader {
                header: "empty.h".into(),
                namespaces: vec![],
            },
        ];
        report.api_directories = DirectoryTable {
            rows: vec![
                DirectoryCount::new("pc", 1, 4),
                DirectoryCount::new("api", 3, 4),
            ],
            total: 4,
        };
        report.visible_outside_api = vec!["media/m.h".into()];
        report.leaked_private = vec!["impl/c.h".into(), "media/private.h".into()];
        report
    }

    #[test]
    fn test_text_report_layout() {
        let expected = "\
impl/b.h ignored (ns::impl)
empty.h ignored (empty)

Headers in API directories:
   1   25.0%  pc
   3   75.0%  api
   4  100.0%  TOTAL

Visible headers not in API directories:
  media/m.h
Total: 1 visible headers not in API directories

Non-public headers transitively #included by public headers:
  impl/c.h
  media/private.h
Total: 2 non-public headers #included by public headers

";
        assert_eq!(sample().render_text(), expected);
    }

    #[test]
    fn test_empty_report_keeps_every_section() {
        let text = ApiSurfaceReport::new(".").render_text();
        assert!(text.starts_with("\nHeaders in API directories:\n"));
        assert!(text.contains("   0    0.0%  TOTAL\n"));
        assert!(text.contains("Total: 0 visible headers not in API directories\n"));
        assert!(text.contains("Total: 0 non-public headers #included by public headers\n"));
    }

    #[test]
    fn test_json_round_trip_fields() {
        let json = sample().render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["leaked_private"][0], "impl/c.h");
        assert_eq!(value["api_directories"]["total"], 4);
    }

    #[test]
    fn test_markdown_sections() {
        let md = sample().render_markdown();
        assert!(md.contains("| **TOTAL** | **4** | 100.0% |"));
        assert!(md.contains("- `media/private.h`"));
        assert!(md.contains("## Ignored Internal-Only Headers"));
    }
}
