//! Core types for diagnostics and generation results.

use miette::{Diagnostic as MietteDiagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::emit::Artifact;
use crate::prepare::SkippedDeclaration;
use crate::sink::{SinkError, SourceSink};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the crate root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location from span information.
    #[must_use]
    pub fn from_span(file: PathBuf, span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            file,
            line: start.line,
            column: start.column + 1,
        }
    }

    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A labeled location giving additional context to a diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Location of the label.
    pub location: Location,
    /// Message for this label.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    #[must_use]
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// A human-readable hint attached to a diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A build-time condition reported by a generation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g., "VB001").
    pub code: String,
    /// Diagnostic name (e.g., "duplicate-member").
    pub name: String,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Primary location.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    pub suggestion: Option<Suggestion>,
    /// Additional labels for context.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
            labels: Vec::new(),
        }
    }

    /// Adds a suggestion to this diagnostic.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Adds a label to this diagnostic.
    #[must_use]
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} at {}\n", self.code, self.name, self.location);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        for label in &self.labels {
            let _ = writeln!(output, "  --> {}: {}", label.location, label.message);
        }
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location, self.severity, self.code, self.message
        )
    }
}

/// Converts a [`Diagnostic`] to a miette diagnostic for rich error display.
#[derive(Debug, thiserror::Error, MietteDiagnostic)]
#[error("{message}")]
pub struct DiagnosticReport {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl DiagnosticReport {
    /// Creates a report whose label points at `offset..offset + length`
    /// of the source the caller attaches.
    #[must_use]
    pub fn with_span(diagnostic: &Diagnostic, offset: usize, length: usize) -> Self {
        Self {
            span: SourceSpan::from((offset, length)),
            ..Self::from(diagnostic)
        }
    }
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            message: format!("[{}] {}", d.code, d.message),
            help: d.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((0, 0)),
            label_message: d.name.clone(),
        }
    }
}

/// Result of one generation pass.
#[derive(Debug, Default, Serialize)]
pub struct GenerateResult {
    /// One generated file per target type, ordered by target.
    pub artifacts: Vec<Artifact>,
    /// Conditions worth reporting to the user.
    pub diagnostics: Vec<Diagnostic>,
    /// Annotated declarations left out of this pass.
    pub skipped: Vec<SkippedDeclaration>,
    /// Number of source files scanned.
    pub files_scanned: usize,
}

impl GenerateResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any error diagnostics.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_diagnostics_at(Severity::Error)
    }

    /// Checks if any diagnostic meets or exceeds the given severity.
    #[must_use]
    pub fn has_diagnostics_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Counts diagnostics by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity| {
            self.diagnostics
                .iter()
                .filter(|d| d.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Looks up the artifact generated for a target key.
    #[must_use]
    pub fn artifact(&self, key: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.key == key)
    }

    /// Hands every artifact to the sink.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the sink.
    pub fn register(&self, sink: &mut dyn SourceSink) -> Result<(), SinkError> {
        for artifact in &self.artifacts {
            sink.add_source(&artifact.output_id, &artifact.text)?;
        }
        Ok(())
    }

    /// Formats diagnostics at or above `fail_on` as a failure report.
    ///
    /// Suitable for `panic!()` messages in build scripts.
    #[must_use]
    pub fn format_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<&Diagnostic> = self
            .diagnostics
            .iter()
            .filter(|d| d.severity >= fail_on)
            .collect();

        let mut report = String::new();
        let _ = writeln!(report, "\n=== verbatim: {} diagnostic(s) ===\n", failing.len());
        for d in &failing {
            let _ = writeln!(report, "{}", d.format());
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {} error(s), {} warning(s), {} info(s); {} file(s) generated from {} source file(s)",
            errors,
            warnings,
            infos,
            self.artifacts.len(),
            self.files_scanned
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(severity: Severity) -> Diagnostic {
        Diagnostic::new(
            "VB001",
            "duplicate-member",
            severity,
            Location::new(PathBuf::from("src/lib.rs"), 42, 10),
            "duplicate constant `Text`",
        )
    }

    #[test]
    fn diagnostic_format_includes_labels_and_help() {
        let d = make_diagnostic(Severity::Error)
            .with_label(Label::new(
                Location::new(PathBuf::from("src/a.rs"), 3, 1),
                "first defined here",
            ))
            .with_suggestion(Suggestion::new("set `field_name`"));
        let formatted = d.format();
        assert!(formatted.contains("VB001 duplicate-member at src/lib.rs:42:10"));
        assert!(formatted.contains("--> src/a.rs:3:1: first defined here"));
        assert!(formatted.contains("= help: set `field_name`"));
    }

    #[test]
    fn diagnostic_display_is_compact() {
        let d = make_diagnostic(Severity::Warning);
        assert_eq!(
            d.to_string(),
            "src/lib.rs:42:10: warning [VB001] duplicate constant `Text`"
        );
    }

    #[test]
    fn severity_threshold() {
        let mut result = GenerateResult::new();
        result.diagnostics.push(make_diagnostic(Severity::Warning));
        assert!(!result.has_errors());
        assert!(result.has_diagnostics_at(Severity::Warning));
        assert_eq!(result.count_by_severity(), (0, 1, 0));
    }

    #[test]
    fn format_report_filters_by_severity() {
        let mut result = GenerateResult::new();
        result.files_scanned = 3;
        result.diagnostics.push(make_diagnostic(Severity::Warning));
        result.diagnostics.push(make_diagnostic(Severity::Error));

        let report = result.format_report(Severity::Error);
        assert!(report.contains("1 diagnostic(s)"));
        assert!(report.contains("1 error(s), 1 warning(s)"));
        assert!(report.contains("from 3 source file(s)"));
    }

    #[test]
    fn report_conversion_keeps_help() {
        let d = make_diagnostic(Severity::Error).with_suggestion(Suggestion::new("rename it"));
        let report = DiagnosticReport::from(&d);
        assert_eq!(report.to_string(), "[VB001] duplicate constant `Text`");
        assert_eq!(report.help.as_deref(), Some("rename it"));
    }
}
