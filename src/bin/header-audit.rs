//! CLI tool for auditing header include graphs and API surface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use header_surface_audit::{audit_project, ApiSurfaceReport, AuditConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "header-audit")]
#[command(about = "Audit C/C++ header include graphs for API surface hygiene", long_about = None)]
#[command(version)]
struct Cli {
    /// Root of the source tree to audit
    #[arg(short = 'r', long, default_value = ".")]
    root: PathBuf,

    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Build output directory passed to `gn desc`
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Saved `gn desc --format=json` output to use instead of running gn
    #[arg(long)]
    build_graph: Option<PathBuf>,

    /// Walk the directory instead of listing files with `git ls-files`
    #[arg(long)]
    no_git: bool,

    /// Additional API directory (can be specified multiple times)
    #[arg(long = "api-dir")]
    api_dirs: Vec<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the audit and print the plain text report
    Scan {
        /// Print a colored one-line summary after the report
        #[arg(long)]
        summary: bool,
    },

    /// Generate the report in a chosen format
    Report {
        /// Output format
        #[arg(short = 'f', long, default_value = "markdown")]
        format: ReportFormat,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Check the API surface against thresholds (exit code based)
    Check {
        /// Maximum acceptable number of leaked private headers
        #[arg(long)]
        max_leaked: Option<usize>,

        /// Maximum acceptable number of visible headers outside API directories
        #[arg(long)]
        max_visible_outside_api: Option<usize>,
    },
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Analysing headers...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = audit_project(&cli.root, &config);

    spinner.finish_and_clear();

    let report = result.context("Audit failed")?;

    match cli.command {
        Commands::Scan { summary } => {
            print!("{}", report.render_text());
            if summary {
                display_summary(&report);
            }
        }

        Commands::Report { format, output } => {
            let content = match format {
                ReportFormat::Text => report.render_text(),
                ReportFormat::Json => report.render_json()?,
                ReportFormat::Markdown => report.render_markdown(),
            };

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).with_context(|| {
                    format!("Failed to write report to {}", output_path.display())
                })?;
                println!("Report written to: {}", output_path.display());
            } else {
                print!("{}", content);
            }
        }

        Commands::Check {
            max_leaked,
            max_visible_outside_api,
        } => {
            let max_leaked = max_leaked.or(config.check.max_leaked_headers);
            let max_visible = max_visible_outside_api.or(config.check.max_visible_outside_api);
            let failures = check_thresholds(&report, max_leaked, max_visible);

            if !failures.is_empty() {
                eprintln!("{} {} check failures:", "Failed:".red().bold(), failures.len());
                for failure in failures {
                    eprintln!("{}", failure);
                }
                process::exit(1);
            }
            println!("{} All checks passed!", "Success:".green().bold());
        }
    }

    Ok(())
}

/// Config file (or defaults) with command line overrides applied
fn resolve_config(cli: &Cli) -> Result<AuditConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AuditConfig::default(),
    };

    for dir in &cli.api_dirs {
        config.api_dirs.insert(dir.clone());
    }
    if let Some(out_dir) = &cli.out_dir {
        config.build.out_dir = Some(out_dir.clone());
    }
    if let Some(graph) = &cli.build_graph {
        config.build.build_graph_file = Some(graph.clone());
    }
    if cli.no_git {
        config.use_git = false;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> Result<AuditConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    let config = AuditConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

fn check_thresholds(
    report: &ApiSurfaceReport,
    max_leaked: Option<usize>,
    max_visible: Option<usize>,
) -> Vec<String> {
    let mut failures = Vec::new();

    if let Some(max) = max_leaked {
        if report.leaked_private.len() > max {
            failures.push(format!(
                "  - {} leaked private headers (max {})",
                report.leaked_private.len(),
                max
            ));
            for header in &report.leaked_private {
                failures.push(format!("      {}", header));
            }
        }
    }

    if let Some(max) = max_visible {
        if report.visible_outside_api.len() > max {
            failures.push(format!(
                "  - {} visible headers outside API directories (max {})",
                report.visible_outside_api.len(),
                max
            ));
        }
    }

    failures
}

fn display_summary(report: &ApiSurfaceReport) {
    let summary = &report.summary;
    println!("{}", "=== Header Audit Summary ===".bold());
    println!("Root: {}", report.root.cyan());
    println!(
        "Tracked headers: {} ({} internal-only, {} include edges)",
        summary.tracked_headers, summary.internal_only_headers, summary.include_edges
    );
    println!("  {} API headers: {}", "●".green(), summary.api_headers);

    let visible = format!("Visible outside API: {}", summary.visible_outside_api);
    let leaked = format!("Leaked private headers: {}", summary.leaked_private);
    if summary.visible_outside_api == 0 {
        println!("  {} {}", "●".green(), visible.green());
    } else {
        println!("  {} {}", "●".yellow(), visible.yellow());
    }
    if summary.leaked_private == 0 {
        println!("  {} {}", "●".green(), leaked.green());
    } else {
        println!("  {} {}", "●".red(), leaked.red());
    }
}
