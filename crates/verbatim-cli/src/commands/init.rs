//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# verbatim configuration

[generator]
# Crate directory to scan (the one containing src/)
# root = "."

# Glob patterns to exclude, relative to the crate directory
exclude = [
    "**/target/**",
    "src/bin/**",
]

# Respect .gitignore files
respect_gitignore = true

# Abort when a source file fails to parse
fail_on_parse_error = false

[marker]
# Paths of the marker attribute
paths = ["verbatim::literal", "verbatim_macros::literal"]

# Constant name used when a marker sets no field_name
default_field_name = "Text"

[resolve]
# Crates reachable besides std, core, alloc and Cargo.toml dependencies
extern_crates = []

# Severity overrides per diagnostic
[diagnostics]
# duplicate-member = "warning"
# invalid-field-name = "error"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("verbatim.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created verbatim.toml");
    println!("\nNext steps:");
    println!("  1. Mark declarations with #[verbatim::literal(\"ns::Type\")]");
    println!("  2. Run: verbatim check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = verbatim_core::Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.marker.default_field_name, "Text");
        assert!(config.diagnostics.is_empty());
        assert_eq!(config.generator.exclude.len(), 2);
    }
}
