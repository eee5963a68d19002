//! OXA Document Checker
//!
//! Developer CLI over `oxa-core`: validates JSON documents against the
//! reference type set (plus any schemas loaded from a file) and rewrites
//! documents with field promotion or demotion.
//!
//! # Usage
//!
//! ```bash
//! # Validate documents, exit status 1 if any has violations
//! oxa-check check paper.json notes.json
//!
//! # Extra node types and machine-readable output
//! oxa-check check --schemas schemas.json --format json paper.json
//!
//! # Move data.alt / data.src into first-class fields on every Image
//! oxa-check promote paper.json --type Image --map alt=alt,src=src
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use oxa_core::config::EngineConfig;
use oxa_core::models::{Node, Violation};
use oxa_core::services::{DocumentEngine, FieldMapping, SchemaRegistry};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "oxa-check")]
#[command(about = "Validate and migrate OXA documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON array of additional TypeSchema descriptions
    #[arg(short, long, global = true)]
    schemas: Option<PathBuf>,

    /// JSON engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents and report every violation
    Check {
        /// Documents to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Move `data` entries into first-class fields
    Promote(Rewrite),

    /// Move first-class fields back into `data`
    Demote(Rewrite),
}

#[derive(clap::Args)]
struct Rewrite {
    /// Document to rewrite
    file: PathBuf,

    /// Node type to rewrite
    #[arg(short = 't', long = "type")]
    type_name: String,

    /// Comma-separated `dataKey=field` pairs
    #[arg(short, long = "map", value_parser = parse_mapping)]
    mapping: FieldMapping,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    violations: Vec<Violation>,
}

impl FileReport {
    fn is_clean(&self) -> bool {
        self.error.is_none() && self.violations.is_empty()
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = build_engine(cli.schemas.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Check { files, format } => check(&engine, &files, format),
        Commands::Promote(args) => rewrite(&engine, &args, |tree| {
            engine.promote(tree, &args.type_name, &args.mapping)
        }),
        Commands::Demote(args) => rewrite(&engine, &args, |tree| {
            engine.demote(tree, &args.type_name, &args.mapping)
        }),
    }
}

fn build_engine(schemas: Option<&Path>, config: Option<&Path>) -> Result<DocumentEngine> {
    let mut registry = SchemaRegistry::with_reference_types();
    if let Some(path) = schemas {
        let text = read(path)?;
        let loaded = registry
            .register_json_str(&text)
            .with_context(|| format!("Failed to load schemas from {}", path.display()))?;
        tracing::info!("Loaded {} schema(s) from {}", loaded, path.display());
    }

    let config = match config {
        Some(path) => EngineConfig::from_json_str(&read(path)?)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    Ok(DocumentEngine::with_config(registry, config)?)
}

fn check(engine: &DocumentEngine, files: &[PathBuf], format: Format) -> Result<ExitCode> {
    let reports = check_files(engine, files);
    write_reports(&mut std::io::stdout().lock(), &reports, format)?;

    let failed = reports.iter().filter(|r| !r.is_clean()).count();
    tracing::debug!("Checked {} file(s), {} failed", reports.len(), failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check_files(engine: &DocumentEngine, files: &[PathBuf]) -> Vec<FileReport> {
    files
        .iter()
        .map(|path| {
            let file = path.display().to_string();
            let outcome = read(path).and_then(|text| Ok(engine.check_str(&text)?));
            match outcome {
                Ok(violations) => FileReport {
                    file,
                    error: None,
                    violations,
                },
                Err(e) => FileReport {
                    file,
                    error: Some(format!("{:#}", e)),
                    violations: Vec::new(),
                },
            }
        })
        .collect()
}

fn write_reports(out: &mut impl Write, reports: &[FileReport], format: Format) -> Result<()> {
    match format {
        Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(reports)?)?,
        Format::Text => {
            for report in reports {
                if let Some(error) = &report.error {
                    writeln!(out, "{}: error: {}", report.file, error)?;
                } else if report.violations.is_empty() {
                    writeln!(out, "{}: ok", report.file)?;
                } else {
                    for violation in &report.violations {
                        writeln!(out, "{}:{}", report.file, violation)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn rewrite<F>(engine: &DocumentEngine, args: &Rewrite, apply: F) -> Result<ExitCode>
where
    F: FnOnce(&Node) -> oxa_core::services::error::Result<Node>,
{
    let tree = engine
        .parse_str(&read(&args.file)?)
        .with_context(|| format!("{} is not a valid document", args.file.display()))?;
    let rewritten = apply(&tree)?;
    println!("{}", engine.to_json_string(&rewritten, args.pretty)?);
    Ok(ExitCode::SUCCESS)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse `alt=alt,src=source` into a mapping
fn parse_mapping(spec: &str) -> std::result::Result<FieldMapping, String> {
    let mut mapping = FieldMapping::new();
    for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, field) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected dataKey=field, got '{}'", pair))?;
        let (key, field) = (key.trim(), field.trim());
        if key.is_empty() || field.is_empty() {
            return Err(format!("empty name in '{}'", pair));
        }
        mapping.insert(key, field);
    }
    if mapping.is_empty() {
        return Err("mapping is empty".to_string());
    }
    Ok(mapping)
}
