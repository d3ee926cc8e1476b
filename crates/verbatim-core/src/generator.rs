//! The generation pass: discovery, parsing, symbol table, preparation,
//! grouping and emission.

use crate::config::Config;
use crate::context::FileContext;
use crate::declaration;
use crate::emit::{aliased_duplicates, Emitter};
use crate::group::group;
use crate::marker::MarkerMatcher;
use crate::prepare::{prepare, SkippedDeclaration};
use crate::symbols::SymbolTable;
use crate::types::{Diagnostic, GenerateResult};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Manifest tables whose keys are crate names visible from `src/`.
const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies"];

/// Errors that abort a generation pass.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a Rust source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// `Cargo.toml` could not be read.
    #[error("Invalid manifest {path}: {message}")]
    Manifest {
        /// Path to the manifest.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },
}

/// Builder for configuring a [`Generator`].
#[derive(Debug, Default)]
pub struct GeneratorBuilder {
    root: Option<PathBuf>,
    sources: Vec<(PathBuf, String)>,
    exclude_patterns: Vec<String>,
    extern_crates: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: Option<bool>,
}

impl GeneratorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the crate directory (the one containing `src/`).
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an in-memory source file, e.g. `("src/lib.rs", "...")`.
    ///
    /// When any in-memory source is given, the file system is not scanned.
    #[must_use]
    pub fn source(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.sources.push((path.into(), content.into()));
        self
    }

    /// Adds an exclude glob pattern, matched against paths relative to the
    /// root.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Declares a crate reachable from the extern prelude.
    #[must_use]
    pub fn extern_crate(mut self, name: impl Into<String>) -> Self {
        self.extern_crates.push(name.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: from configuration).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = Some(fail);
        self
    }

    /// Builds the generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined for a
    /// relative root.
    pub fn build(self) -> Result<Generator, GeneratorError> {
        let config = self.config.unwrap_or_default();
        let root = self.root.unwrap_or_else(|| config.generator.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.generator.exclude.iter().cloned());

        let mut extern_crates = self.extern_crates;
        extern_crates.extend(config.resolve.extern_crates.iter().cloned());

        Ok(Generator {
            root,
            sources: self.sources,
            exclude_patterns,
            extern_crates,
            fail_on_parse_error: self
                .fail_on_parse_error
                .unwrap_or(config.generator.fail_on_parse_error),
            config,
        })
    }
}

/// Runs generation passes over one crate.
///
/// Use [`Generator::builder()`] to construct an instance.
#[derive(Debug)]
pub struct Generator {
    root: PathBuf,
    sources: Vec<(PathBuf, String)>,
    exclude_patterns: Vec<String>,
    extern_crates: Vec<String>,
    config: Config,
    fail_on_parse_error: bool,
}

impl Generator {
    /// Creates a new builder for configuring a generator.
    #[must_use]
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    /// Returns the crate directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one pass and returns the generated files and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if sources cannot be discovered or read, or if a file
    /// fails to parse while `fail_on_parse_error` is set.
    pub fn generate(&self) -> Result<GenerateResult, GeneratorError> {
        info!("Starting generation at {:?}", self.root);

        let inputs = self.load_sources()?;
        info!("Found {} source files", inputs.len());

        let mut parsed = Vec::with_capacity(inputs.len());
        for (path, content) in &inputs {
            match syn::parse_file(content) {
                Ok(file) => parsed.push((FileContext::new(path, content), file)),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    if self.fail_on_parse_error {
                        return Err(GeneratorError::Parse {
                            path: path.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        let matcher = MarkerMatcher::from_config(&self.config.marker);
        let mut builder = SymbolTable::builder()
            .extern_crates(&self.extern_crates)
            .extern_crates(self.manifest_crates()?)
            .extern_crates(matcher.crate_names());
        for (ctx, file) in &parsed {
            builder = builder.file(&ctx.module_path, file);
        }
        let table = builder.build();

        let mut result = GenerateResult::new();
        result.files_scanned = parsed.len();

        let mut members = Vec::new();
        for (ctx, file) in &parsed {
            debug!("Scanning: {}", ctx.relative_path.display());
            for decl in declaration::collect(ctx, file, &table, &matcher) {
                match prepare(&decl, &table, &self.config.marker) {
                    Ok(member) => members.push(member),
                    Err(reason) => {
                        debug!("Skipping declaration at {}: {}", decl.location, reason);
                        let skipped = SkippedDeclaration::new(&decl, reason);
                        result.diagnostics.extend(skipped.diagnostic());
                        result.skipped.push(skipped);
                    }
                }
            }
        }

        let emitter = Emitter::new();
        let groups = group(members);
        for (key, group) in &groups {
            debug!("Emitting {} member(s) for {}", group.members.len(), key);
            let (artifact, diagnostics) = emitter.emit(group);
            result.artifacts.push(artifact);
            result.diagnostics.extend(diagnostics);
        }
        result.diagnostics.extend(aliased_duplicates(groups.values()));

        self.apply_severity_overrides(&mut result.diagnostics);
        result.diagnostics.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });

        info!(
            "Generation complete: {} file(s), {} diagnostic(s), {} skipped, {} source files",
            result.artifacts.len(),
            result.diagnostics.len(),
            result.skipped.len(),
            result.files_scanned
        );

        Ok(result)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_overrides(&self, diagnostics: &mut [Diagnostic]) {
        for d in diagnostics {
            if let Some(severity) = self.config.diagnostic_severity(&d.name) {
                d.severity = severity;
            }
        }
    }

    /// Returns `(relative path, contents)` for every source file, sorted by
    /// path.
    fn load_sources(&self) -> Result<Vec<(PathBuf, String)>, GeneratorError> {
        let mut sources = if self.sources.is_empty() {
            let mut loaded = Vec::new();
            for path in self.discover_files()? {
                debug!("Reading: {}", path.display());
                let content = std::fs::read_to_string(self.root.join(&path))?;
                loaded.push((path, content));
            }
            loaded
        } else {
            self.sources
                .iter()
                .filter(|(path, _)| !self.should_exclude(path))
                .cloned()
                .collect()
        };
        sources.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(sources)
    }

    /// Discovers `.rs` files under `src/`, as paths relative to the root.
    fn discover_files(&self) -> Result<Vec<PathBuf>, GeneratorError> {
        let src = self.root.join("src");
        if !src.is_dir() {
            warn!("No src directory under {}", self.root.display());
            return Ok(Vec::new());
        }

        let mut walker = ignore::WalkBuilder::new(&src);
        walker
            .hidden(false)
            .git_ignore(self.config.generator.respect_gitignore);

        let mut files = Vec::new();
        for entry in walker.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
            if self.should_exclude(&relative) {
                debug!("Excluding: {}", relative.display());
                continue;
            }
            files.push(relative);
        }
        Ok(files)
    }

    /// Checks a root-relative path against the exclude patterns.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude_patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern).is_ok_and(|p| p.matches(&path_str))
        })
    }

    /// Reads crate names from the manifest's dependency tables.
    fn manifest_crates(&self) -> Result<Vec<String>, GeneratorError> {
        let path = self.root.join("Cargo.toml");
        if !self.config.resolve.read_manifest || !path.is_file() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        let manifest: toml::Table =
            content
                .parse()
                .map_err(|e: toml::de::Error| GeneratorError::Manifest {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

        let crates = DEPENDENCY_TABLES
            .iter()
            .filter_map(|table| manifest.get(*table).and_then(toml::Value::as_table))
            .flat_map(|deps| deps.keys().cloned())
            .collect();
        Ok(crates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder_merges_config() {
        let config = Config::parse(
            r#"
[generator]
exclude = ["src/generated/**"]
fail_on_parse_error = true

[resolve]
extern_crates = ["serde"]
"#,
        )
        .expect("config");
        let generator = Generator::builder()
            .root(".")
            .exclude("src/legacy/**")
            .extern_crate("regex")
            .config(config)
            .build()
            .expect("Failed to build generator");

        assert!(generator.root().is_absolute());
        assert!(generator.fail_on_parse_error);
        assert_eq!(generator.extern_crates, vec!["regex", "serde"]);
        assert!(generator.should_exclude(Path::new("src/legacy/old.rs")));
        assert!(generator.should_exclude(Path::new("src/generated/a.rs")));
        assert!(!generator.should_exclude(Path::new("src/lib.rs")));
    }

    #[test]
    fn test_generate_from_memory() {
        let result = Generator::builder()
            .root("/virtual")
            .source(
                "src/lib.rs",
                r#"
                pub mod app;
                use verbatim::literal;

                #[literal("app::Strings")]
                pub struct Greeting { pub text: String }
                "#,
            )
            .source("src/app.rs", "pub struct Strings;")
            .build()
            .expect("build")
            .generate()
            .expect("generate");

        assert_eq!(result.files_scanned, 2);
        assert!(result.diagnostics.is_empty());
        let artifact = result.artifact("app::Strings").expect("artifact");
        assert_eq!(artifact.output_id, "app.Strings.g.rs");
        assert!(artifact.text.contains("impl crate::app::Strings {"));
        assert!(artifact
            .text
            .contains("pub struct Greeting {\n    pub text: ::std::string::String,\n}"));
    }

    #[test]
    fn test_parse_errors_are_skipped_or_fatal() {
        let lenient = Generator::builder()
            .root("/virtual")
            .source("src/lib.rs", "pub struct Ok;")
            .source("src/broken.rs", "fn {")
            .build()
            .expect("build")
            .generate()
            .expect("generate");
        assert_eq!(lenient.files_scanned, 1);

        let strict = Generator::builder()
            .root("/virtual")
            .source("src/broken.rs", "fn {")
            .fail_on_parse_error(true)
            .build()
            .expect("build")
            .generate();
        assert!(matches!(strict, Err(GeneratorError::Parse { .. })));
    }

    #[test]
    fn test_discovers_files_and_manifest_crates() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        std::fs::create_dir_all(root.join("src/bin")).expect("mkdir");
        std::fs::write(
            root.join("Cargo.toml"),
            "[package]\nname = \"demo\"\n\n[dependencies]\nserde-json = \"1\"\n",
        )
        .expect("write");
        std::fs::write(
            root.join("src/lib.rs"),
            r#"
            #[verbatim::literal("crate::Docs")]
            pub fn parse(s: &str) -> serde_json::Value { serde_json::from_str(s).unwrap() }
            pub struct Docs;
            "#,
        )
        .expect("write");
        std::fs::write(root.join("src/bin/tool.rs"), "fn main() {}").expect("write");

        let generator = Generator::builder().root(root).build().expect("build");
        let result = generator.generate().expect("generate");

        assert_eq!(result.files_scanned, 1);
        let artifact = result.artifact("crate::Docs").expect("artifact");
        assert!(artifact.text.contains("-> ::serde_json::Value"));
        assert!(artifact.text.contains("::serde_json::from_str(s)"));
    }

    #[test]
    fn test_severity_override() {
        let config = Config::parse("[diagnostics]\nduplicate-member = \"warning\"\n").expect("config");
        let source = r#"
            use verbatim::literal;
            #[literal("a::B")] pub struct One;
            #[literal("a::B")] pub struct Two;
        "#;
        let result = Generator::builder()
            .root("/virtual")
            .source("src/lib.rs", source)
            .config(config)
            .build()
            .expect("build")
            .generate()
            .expect("generate");

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, crate::Severity::Warning);
        assert!(!result.has_errors());
    }
}
