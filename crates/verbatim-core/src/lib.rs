//! # verbatim-core
//!
//! Build-time engine that embeds the source of annotated Rust declarations
//! as string constants.
//!
//! A declaration marked with `#[verbatim::literal("ns::Class")]` is
//! rewritten so that every path in it is fully qualified, wrapped in its
//! enclosing modules (and `impl`/`trait` headers), rendered as text and
//! emitted as a constant on `crate::ns::Class`:
//!
//! - [`symbols::SymbolTable`] resolves names the way rustc's late resolver
//!   does for items, imports, globs and the extern prelude
//! - [`qualify`] rewrites paths to `crate::…` or `::ext::…`
//! - [`scope`] rebuilds the surrounding module tree
//! - [`emit::Emitter`] renders one `impl` block per target type
//! - [`Generator`] drives a whole pass over a crate
//!
//! ## Example
//!
//! ```ignore
//! use verbatim_core::{Generator, MemorySink};
//!
//! let result = Generator::builder()
//!     .root(env!("CARGO_MANIFEST_DIR"))
//!     .build()?
//!     .generate()?;
//!
//! let mut sink = MemorySink::new();
//! result.register(&mut sink)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod generator;
mod types;

pub mod declaration;
pub mod emit;
pub mod group;
pub mod marker;
pub mod prepare;
pub mod qualify;
pub mod scope;
pub mod sink;
pub mod strip;
pub mod symbols;

pub use config::{Config, ConfigError, GeneratorConfig, MarkerConfig, ResolveConfig};
pub use context::FileContext;
pub use emit::{Artifact, Emitter};
pub use generator::{Generator, GeneratorBuilder, GeneratorError};
pub use marker::{MarkerMatcher, QualificationTarget};
pub use prepare::{PreparedMember, SkipReason, SkippedDeclaration};
pub use sink::{DirSink, MemorySink, SinkError, SourceSink};
pub use symbols::{CanonicalPath, SymbolTable};
pub use types::{
    Diagnostic, DiagnosticReport, GenerateResult, Label, Location, Severity, Suggestion,
};
