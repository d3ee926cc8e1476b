//! # verbatim
//!
//! Embeds the fully qualified source text of annotated Rust declarations as
//! string constants on a target type.
//!
//! This is the facade crate that re-exports the engine, the marker
//! attribute and the build-script runner.
//!
//! ## Quick Start: build script integration
//!
//! ```toml
//! [dependencies]
//! verbatim = "0.1"
//!
//! [build-dependencies]
//! verbatim = "0.1"
//! ```
//!
//! ```rust,ignore
//! // build.rs
//! fn main() {
//!     verbatim::build();
//! }
//! ```
//!
//! ```rust,ignore
//! // src/lib.rs
//! pub mod app {
//!     pub mod resources {
//!         pub struct Strings;
//!     }
//! }
//!
//! #[verbatim::literal("app::resources::Strings")]
//! #[derive(Debug, Clone)]
//! pub struct Greeting {
//!     pub text: String,
//! }
//!
//! verbatim::include_generated!();
//!
//! // app::resources::Strings::Text is the formatted, fully qualified item:
//! //
//! // #[derive(::core::fmt::Debug, ::core::clone::Clone)]
//! // pub struct Greeting {
//! //     pub text: ::std::string::String,
//! // }
//! ```
//!
//! Configure via `verbatim.toml` next to `Cargo.toml`.

#![forbid(unsafe_code)]

// Re-export core types
pub use verbatim_core::*;

// Re-export the marker attribute for #[verbatim::literal(...)]
pub use verbatim_macros::literal;

mod runner;

pub use runner::{build, Build, BuildError};

/// Includes every file generated by [`build()`] for the current crate.
///
/// Expands to an `include!` of `$OUT_DIR/verbatim/mod.rs`; use it once, at
/// the crate root or in any module.
#[macro_export]
macro_rules! include_generated {
    () => {
        include!(concat!(env!("OUT_DIR"), "/verbatim/mod.rs"));
    };
}
