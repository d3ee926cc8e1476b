//! Generate command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use verbatim_core::DirSink;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the generate command.
///
/// Nothing is written when the pass reports errors.
pub fn run(
    path: &Path,
    out: &Path,
    format: OutputFormat,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<()> {
    let result = super::run_pass(path, exclude, source)?;

    super::output::print(&result, path, format)?;

    if result.has_errors() {
        std::process::exit(1);
    }

    let mut sink = DirSink::new(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;
    result
        .register(&mut sink)
        .context("Failed to write generated files")?;
    let index = sink.finish().context("Failed to write index")?;

    tracing::info!(
        "Wrote {} file(s); include {}",
        result.artifacts.len(),
        index.display()
    );

    Ok(())
}
