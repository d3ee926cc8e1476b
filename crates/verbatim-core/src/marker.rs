//! The `#[literal(...)]` marker: argument parsing, target decomposition,
//! field-name templates and marker recognition.

use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, Ident, Lit, Meta, Path, Token};

use crate::config::MarkerConfig;
use crate::qualify::Fragments;
use crate::symbols::{CanonicalPath, Namespace, Root, SymbolTable};

/// Constant name used when a marker sets no field name.
pub const DEFAULT_FIELD_NAME: &str = "Text";

const FIELD_NAME_KEYS: &[&str] = &["field_name", "FieldName"];

/// Arguments of one marker application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerArgs {
    /// The target type, exactly as written in the string literal.
    pub target: String,
    /// The requested constant name, if any.
    pub field_name: Option<String>,
}

/// Marker arguments that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    /// No positional argument.
    #[error("marker has no target argument")]
    MissingTarget,

    /// The target is not a string literal.
    #[error("marker target is not a string literal")]
    NonLiteralTarget,

    /// `field_name` is not a string literal.
    #[error("`field_name` is not a string literal")]
    NonLiteralFieldName,

    /// The argument list does not parse.
    #[error("malformed marker arguments: {0}")]
    Syntax(String),
}

impl MarkerArgs {
    /// Reads the arguments of `#[literal("a::B", field_name = "...")]` or
    /// `#[literal = "a::B"]`.
    ///
    /// Named arguments other than `field_name` (or `FieldName`) are ignored;
    /// the attribute macro rejects them at compile time.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no target or an argument is not a string
    /// literal.
    pub fn from_meta(meta: &Meta) -> Result<Self, MarkerError> {
        match meta {
            Meta::Path(_) => Err(MarkerError::MissingTarget),
            Meta::NameValue(nv) => Ok(Self {
                target: string_literal(&nv.value).ok_or(MarkerError::NonLiteralTarget)?,
                field_name: None,
            }),
            Meta::List(list) => {
                let args = list
                    .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
                    .map_err(|e| MarkerError::Syntax(e.to_string()))?;
                Self::from_args(args.iter())
            }
        }
    }

    fn from_args<'a>(args: impl Iterator<Item = &'a Expr>) -> Result<Self, MarkerError> {
        let mut target = None;
        let mut field_name = None;

        for arg in args {
            if let Expr::Assign(assign) = arg {
                let is_field_name = matches!(
                    &*assign.left,
                    Expr::Path(p) if FIELD_NAME_KEYS.iter().any(|k| p.path.is_ident(k))
                );
                if is_field_name {
                    field_name = Some(
                        string_literal(&assign.right).ok_or(MarkerError::NonLiteralFieldName)?,
                    );
                }
            } else if target.is_none() {
                target = Some(string_literal(arg).ok_or(MarkerError::NonLiteralTarget)?);
            }
        }

        Ok(Self {
            target: target.ok_or(MarkerError::MissingTarget)?,
            field_name,
        })
    }
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Some(s.value()),
        Expr::Group(g) => string_literal(&g.expr),
        Expr::Paren(p) => string_literal(&p.expr),
        _ => None,
    }
}

/// Reasons a target string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// No `::` in the target.
    #[error("target `{0}` has no `::` separator")]
    MissingSeparator(String),

    /// A segment is not an identifier.
    #[error("target `{target}` has invalid segment `{segment}`")]
    InvalidSegment {
        /// The whole target.
        target: String,
        /// The offending segment.
        segment: String,
    },

    /// The target does not name a type of this crate.
    #[error("target `{0}` is not a path inside this crate")]
    NotCrateLocal(String),
}

/// A marker target split into namespace and type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualificationTarget {
    raw: String,
    namespace: Vec<String>,
    class: String,
}

impl QualificationTarget {
    /// Parses a target such as `app::resources::Strings`.
    ///
    /// A leading `crate` is optional. Targets starting with `::`, `self` or
    /// `super` are rejected, as is anything without a `::` separator.
    ///
    /// # Errors
    ///
    /// Returns an error describing why the target is malformed.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        if !raw.contains("::") {
            return Err(TargetError::MissingSeparator(raw.to_string()));
        }
        if raw.starts_with("::") {
            return Err(TargetError::NotCrateLocal(raw.to_string()));
        }

        let mut segments: Vec<&str> = raw.split("::").collect();
        match segments.first().copied() {
            Some("crate") => {
                segments.remove(0);
            }
            Some("self" | "super") => return Err(TargetError::NotCrateLocal(raw.to_string())),
            _ => {}
        }

        for segment in &segments {
            if segment.contains(char::is_whitespace) || syn::parse_str::<Ident>(segment).is_err() {
                return Err(TargetError::InvalidSegment {
                    target: raw.to_string(),
                    segment: (*segment).to_string(),
                });
            }
        }

        let Some((class, namespace)) = segments.split_last() else {
            return Err(TargetError::MissingSeparator(raw.to_string()));
        };
        Ok(Self {
            raw: raw.to_string(),
            namespace: namespace.iter().map(|s| (*s).to_string()).collect(),
            class: (*class).to_string(),
        })
    }

    /// The target string as written in the marker.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Namespace segments below the crate root.
    #[must_use]
    pub fn namespace_segments(&self) -> &[String] {
        &self.namespace
    }

    /// Namespace joined with `::` (empty for a type at the crate root).
    #[must_use]
    pub fn namespace(&self) -> String {
        self.namespace.join("::")
    }

    /// The type name.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The path the generated impl block names, e.g. `crate::app::Strings`.
    #[must_use]
    pub fn type_path(&self) -> String {
        CanonicalPath::in_crate(self.namespace.iter().chain(std::iter::once(&self.class)).cloned())
            .to_string()
    }
}

/// How the generated constant is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNameSpec {
    /// Used as is.
    Literal(String),
    /// Contains `[Namespace]`, `[Class]` or `[FullName]` placeholders.
    Template(String),
}

impl FieldNameSpec {
    /// Picks the spec for a marker's `field_name`, falling back to `default`
    /// when it is missing or blank.
    #[must_use]
    pub fn from_option(value: Option<&str>, default: &str) -> Self {
        let value = match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => default,
        };
        if value.contains('[') && value.contains(']') {
            Self::Template(value.to_string())
        } else {
            Self::Literal(value.to_string())
        }
    }

    /// Produces the constant name for a declaration.
    #[must_use]
    pub fn resolve(&self, fragments: &Fragments) -> String {
        match self {
            Self::Literal(name) => name.clone(),
            Self::Template(template) => template
                .replace("[Namespace]", &fragments.namespace)
                .replace("[Class]", &fragments.class)
                .replace("[FullName]", &fragments.full_name()),
        }
    }
}

/// Recognizes marker applications by the item their path resolves to.
#[derive(Debug, Clone)]
pub struct MarkerMatcher {
    targets: Vec<CanonicalPath>,
}

impl MarkerMatcher {
    /// Creates a matcher for the given macro paths (e.g. `verbatim::literal`).
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            targets: paths
                .into_iter()
                .map(|p| CanonicalPath::parse(p.as_ref()))
                .collect(),
        }
    }

    /// Creates a matcher from configuration.
    #[must_use]
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self::new(&config.paths)
    }

    /// Names of the external crates that export a marker.
    pub fn crate_names(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .filter(|t| t.root() == Root::Extern)
            .filter_map(|t| t.segments().first().map(String::as_str))
    }

    /// Returns true if `path`, written in `module`, names a marker.
    #[must_use]
    pub fn is_marker(&self, table: &SymbolTable, module: &[String], path: &Path) -> bool {
        if path.leading_colon.is_some() {
            let written = CanonicalPath::external(path.segments.iter().map(|s| s.ident.to_string()));
            return self.targets.contains(&written);
        }
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let Ok(resolution) = table.resolve(module, &segments, Namespace::Macro) else {
            return false;
        };
        let full = segments[resolution.consumed..]
            .iter()
            .fold(resolution.symbol.path, |p, s| p.join(s.clone()));
        self.targets.contains(&full)
    }
}
