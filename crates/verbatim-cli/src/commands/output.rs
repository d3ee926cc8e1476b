//! Shared output formatting for generation results.

use anyhow::Result;
use miette::{NamedSource, Report};
use std::path::Path;
use verbatim_core::{Diagnostic, DiagnosticReport, GenerateResult};

use crate::OutputFormat;

/// Print generation results in the specified format.
///
/// `root` is the crate directory; diagnostic paths are relative to it.
pub fn print(result: &GenerateResult, root: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result, root),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn print_text(result: &GenerateResult, root: &Path) {
    let (errors, warnings, infos) = result.count_by_severity();

    for diagnostic in &result.diagnostics {
        match render(diagnostic, root) {
            Some(report) => eprintln!("{report:?}"),
            None => eprintln!("{}", diagnostic.format()),
        }
    }

    for artifact in &result.artifacts {
        println!(
            "{} -> {} ({} member(s))",
            artifact.key,
            artifact.output_id,
            artifact.members.len()
        );
    }
    for skipped in &result.skipped {
        tracing::debug!(
            "skipped {} at {}: {}",
            skipped.name,
            skipped.location,
            skipped.reason
        );
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Generated {} file(s) from {} source file(s); {} error(s), {} warning(s), {} info(s), {} skipped\x1b[0m",
        summary_color,
        result.artifacts.len(),
        result.files_scanned,
        errors,
        warnings,
        infos,
        result.skipped.len()
    );
}

/// Builds a miette report pointing into the diagnostic's source file.
fn render(diagnostic: &Diagnostic, root: &Path) -> Option<Report> {
    let file = &diagnostic.location.file;
    let content = std::fs::read_to_string(root.join(file)).ok()?;
    let offset = byte_offset(&content, diagnostic.location.line, diagnostic.location.column)?;
    let length = content[offset..]
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(content.len() - offset);

    let report = DiagnosticReport::with_span(diagnostic, offset, length);
    let name = file.display().to_string();
    Some(Report::new(report).with_source_code(NamedSource::new(name, content)))
}

/// Converts a 1-based line and character column into a byte offset.
fn byte_offset(content: &str, line: usize, column: usize) -> Option<usize> {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.checked_sub(1)?)
        .map(str::len)
        .sum();
    let rest = content.get(line_start..)?;
    let within = rest
        .char_indices()
        .nth(column.saturating_sub(1))
        .map_or(rest.len(), |(i, _)| i);
    Some(line_start + within)
}

fn print_json(result: &GenerateResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &GenerateResult) {
    for diagnostic in &result.diagnostics {
        println!(
            "{}:{}:{}: {} [{}] {}",
            diagnostic.location.file.display(),
            diagnostic.location.line,
            diagnostic.location.column,
            diagnostic.severity,
            diagnostic.code,
            diagnostic.message,
        );
    }
}
