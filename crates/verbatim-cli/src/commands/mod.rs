//! Subcommand implementations.

pub mod check;
pub mod generate;
pub mod init;
pub mod output;

use anyhow::{Context, Result};
use std::path::Path;
use verbatim_core::{GenerateResult, Generator};

use crate::config_resolver::{self, ConfigSource};

/// Runs one generation pass over the crate at `path`.
fn run_pass(path: &Path, exclude: Vec<String>, source: &ConfigSource) -> Result<GenerateResult> {
    let config = config_resolver::load(source)?;

    let generator = Generator::builder()
        .root(path)
        .config(config)
        .excludes(exclude)
        .build()
        .context("Failed to build generator")?;

    tracing::info!("Generating for {}", generator.root().display());

    generator.generate().context("Generation failed")
}
