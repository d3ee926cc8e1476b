//! Build-script runner.
//!
//! [`build()`] runs one generation pass over the crate being built and
//! writes the results into `$OUT_DIR/verbatim/`, where
//! [`include_generated!`](crate::include_generated) picks them up.

use std::path::{Path, PathBuf};
use verbatim_core::{
    Config, ConfigError, DirSink, Generator, GeneratorError, Severity, SinkError,
};

/// Config file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["verbatim.toml", ".verbatim.toml"];

/// Subdirectory of `OUT_DIR` holding the generated files.
const OUT_SUBDIR: &str = "verbatim";

/// Errors raised while running a pass from a build script.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A required environment variable is not set.
    #[error("environment variable {0} is not set; call verbatim::build() from build.rs")]
    Env(&'static str),

    /// The configuration file is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The generation pass failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Generated files could not be written.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Diagnostics at or above the failure threshold were reported.
    #[error("{0}")]
    Diagnostics(String),
}

/// Runs a pass with default settings.
///
/// Call from `build.rs`:
///
/// ```rust,ignore
/// fn main() {
///     verbatim::build();
/// }
/// ```
///
/// # Panics
///
/// Panics with a formatted report if the pass fails or reports errors.
pub fn build() {
    Build::new().run();
}

/// Configurable build-script runner.
#[derive(Debug, Clone)]
pub struct Build {
    config: Option<PathBuf>,
    fail_on: Severity,
}

impl Default for Build {
    fn default() -> Self {
        Self {
            config: None,
            fail_on: Severity::Error,
        }
    }
}

impl Build {
    /// Creates a runner that fails on error diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an explicit config file, relative to the crate directory.
    #[must_use]
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// Sets the lowest severity that fails the build.
    #[must_use]
    pub fn fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = severity;
        self
    }

    /// Runs the pass using `CARGO_MANIFEST_DIR` and `OUT_DIR`.
    ///
    /// # Panics
    ///
    /// Panics with a formatted report if the pass fails or reports
    /// diagnostics at or above the failure threshold.
    pub fn run(&self) {
        if let Err(e) = self.try_run() {
            panic!("verbatim: {e}");
        }
    }

    /// Runs the pass using `CARGO_MANIFEST_DIR` and `OUT_DIR`, returning
    /// the path of the generated index file.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment is incomplete, the pass fails or
    /// diagnostics at or above the failure threshold are reported.
    pub fn try_run(&self) -> Result<PathBuf, BuildError> {
        let root = env_path("CARGO_MANIFEST_DIR")?;
        let out_dir = env_path("OUT_DIR")?;
        self.generate_into(&root, &out_dir.join(OUT_SUBDIR))
    }

    /// Runs the pass over `root` and writes into `out`.
    fn generate_into(&self, root: &Path, out: &Path) -> Result<PathBuf, BuildError> {
        let config_path = self.find_config(root);
        let config = match &config_path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        println!("cargo:rerun-if-changed={}", root.join("src").display());
        println!("cargo:rerun-if-changed={}", root.join("Cargo.toml").display());
        if let Some(path) = &config_path {
            println!("cargo:rerun-if-changed={}", path.display());
        }

        let result = Generator::builder()
            .root(root)
            .config(config)
            .build()?
            .generate()?;

        if result.has_diagnostics_at(self.fail_on) {
            return Err(BuildError::Diagnostics(result.format_report(self.fail_on)));
        }
        for d in &result.diagnostics {
            println!("cargo:warning={}", d.format().replace('\n', " "));
        }

        let mut sink = DirSink::new(out)?;
        result.register(&mut sink)?;
        Ok(sink.finish()?)
    }

    /// Returns the explicit config path, or the first candidate that exists.
    fn find_config(&self, root: &Path) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            });
        }
        CONFIG_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
    }
}

fn env_path(name: &'static str) -> Result<PathBuf, BuildError> {
    std::env::var_os(name)
        .map(PathBuf::from)
        .ok_or(BuildError::Env(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn crate_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "Cargo.toml",
            "[package]\nname = \"demo\"\n\n[dependencies]\nverbatim = \"0.1\"\n",
        );
        write(
            temp.path(),
            "src/lib.rs",
            r#"
            pub mod app;

            #[verbatim::literal("app::Strings")]
            pub fn greet() -> String { String::from("hi") }
            "#,
        );
        write(temp.path(), "src/app.rs", "pub struct Strings;\n");
        temp
    }

    #[test]
    fn writes_generated_files_and_index() {
        let temp = crate_dir();
        let out = temp.path().join("out/verbatim");

        let index = Build::new().generate_into(temp.path(), &out).unwrap();

        assert_eq!(index, out.join("mod.rs"));
        let index_text = std::fs::read_to_string(&index).unwrap();
        assert!(index_text.contains("include!(\"app.Strings.g.rs\");"));
        let generated = std::fs::read_to_string(out.join("app.Strings.g.rs")).unwrap();
        assert!(generated.contains("impl crate::app::Strings {"));
        assert!(generated.contains("::std::string::String::from(\"hi\")"));
    }

    #[test]
    fn explicit_config_is_used() {
        let temp = crate_dir();
        write(
            temp.path(),
            "config/custom.toml",
            "[marker]\ndefault_field_name = \"Source\"\n",
        );
        let out = temp.path().join("out");

        Build::new()
            .config("config/custom.toml")
            .generate_into(temp.path(), &out)
            .unwrap();

        let generated = std::fs::read_to_string(out.join("app.Strings.g.rs")).unwrap();
        assert!(generated.contains("pub(crate) const Source: &'static str"));
    }

    #[test]
    fn error_diagnostics_fail_the_build() {
        let temp = crate_dir();
        write(
            temp.path(),
            "src/more.rs",
            "#[verbatim::literal(\"app::Strings\")]\npub struct Twice;\n",
        );
        write(
            temp.path(),
            "src/lib.rs",
            "pub mod app;\npub mod more;\n#[verbatim::literal(\"app::Strings\")]\npub struct Once;\n",
        );

        let err = Build::new()
            .generate_into(temp.path(), &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Diagnostics(report) if report.contains("VB001")));
    }

    #[test]
    fn lowered_threshold_fails_on_warnings() {
        let temp = crate_dir();
        write(
            temp.path(),
            "src/lib.rs",
            "pub mod app;\n#[verbatim::literal(\"app::Strings\", field_name = \"not an ident\")]\npub struct Odd;\n",
        );

        let out = temp.path().join("out");
        assert!(Build::new().generate_into(temp.path(), &out).is_ok());
        assert!(Build::new()
            .fail_on(Severity::Warning)
            .generate_into(temp.path(), &out)
            .is_err());
    }

    #[test]
    fn config_candidates_are_found_in_order() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Build::new().find_config(temp.path()), None);

        write(temp.path(), ".verbatim.toml", "");
        assert_eq!(
            Build::new().find_config(temp.path()),
            Some(temp.path().join(".verbatim.toml"))
        );

        write(temp.path(), "verbatim.toml", "");
        assert_eq!(
            Build::new().find_config(temp.path()),
            Some(temp.path().join("verbatim.toml"))
        );
    }
}
