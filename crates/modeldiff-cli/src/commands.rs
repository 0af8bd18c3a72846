use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

use modeldiff::{DiffConfig, DiffDetails, DiffKind, Differ};

use crate::cli::{Cli, Command, DiffArgs, EqualArgs, OutputFormat, Snapshots};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(args, cli.format)?,
        Command::Equal(args) => cmd_equal(args, cli.format)?,
    };
    println!("{output}");
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<String> {
    let (new, old) = load_snapshots(&args.snapshots)?;
    let config = DiffConfig::default().with_added_values(args.with_added_values);
    let details = Differ::new(config)
        .diff(&new, &old)
        .context("failed to diff snapshots")?;

    match format {
        OutputFormat::Json if args.pretty => Ok(serde_json::to_string_pretty(&details)?),
        OutputFormat::Json => Ok(serde_json::to_string(&details)?),
        OutputFormat::Text => Ok(render_text(&details)),
    }
}

fn cmd_equal(args: EqualArgs, format: OutputFormat) -> anyhow::Result<String> {
    let (new, old) = load_snapshots(&args.snapshots)?;
    let equal = Differ::default()
        .deep_equal(&new, &old)
        .context("failed to compare snapshots")?;

    Ok(match format {
        OutputFormat::Json => serde_json::json!({ "equal": equal }).to_string(),
        OutputFormat::Text if equal => format!("{} Snapshots are equal.", "✓".green().bold()),
        OutputFormat::Text => format!("{} Snapshots differ.", "✗".red().bold()),
    })
}

fn load_snapshots(snapshots: &Snapshots) -> anyhow::Result<(Value, Value)> {
    Ok((load_json(&snapshots.new)?, load_json(&snapshots.old)?))
}

pub(crate) fn load_json(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "loaded snapshot");
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// One line per entry, then a summary line.
pub(crate) fn render_text(details: &DiffDetails) -> String {
    if details.is_empty() {
        return "No changes.".to_string();
    }

    let mut lines: Vec<String> = details
        .iter()
        .map(|(kind, path, value)| match kind {
            DiffKind::Change => format!("{} {}  (was {})", "~".yellow().bold(), path, value),
            DiffKind::Add => {
                if value.is_null() {
                    format!("{} {}", "+".green().bold(), path)
                } else {
                    format!("{} {}  = {}", "+".green().bold(), path, value)
                }
            }
            DiffKind::Del => format!("{} {}  (was {})", "-".red().bold(), path, value),
        })
        .collect();

    lines.push(format!(
        "{} changed, {} added, {} deleted",
        details.modifications(),
        details.additions(),
        details.deletions()
    ));
    lines.join("\n")
}
