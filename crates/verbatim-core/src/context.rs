//! Per-file context for a generation pass.

use std::path::{Component, Path, PathBuf};

/// Metadata about one source file of the analysed crate.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the crate root.
    pub relative_path: PathBuf,
    /// Module path below `crate` (e.g., `["net", "codec"]` for `src/net/codec.rs`).
    pub module_path: Vec<String>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(relative_path: &Path, content: &'a str) -> Self {
        Self {
            content,
            relative_path: relative_path.to_path_buf(),
            module_path: Self::compute_module_path(relative_path),
        }
    }

    /// Computes the module path from a path relative to the crate root.
    ///
    /// `lib.rs` and `main.rs` directly under `src/` are the crate root, and
    /// `mod.rs` names its directory.
    fn compute_module_path(relative_path: &Path) -> Vec<String> {
        let mut parts: Vec<String> = relative_path
            .with_extension("")
            .components()
            .filter_map(|c| {
                if let Component::Normal(s) = c {
                    s.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();

        if parts.first().is_some_and(|p| p == "src") {
            parts.remove(0);
        }

        if let Some(last) = parts.last() {
            let is_root = parts.len() == 1 && (last == "lib" || last == "main");
            if is_root || last == "mod" {
                parts.pop();
            }
        }

        parts
    }

    /// Returns true if this file is the crate root.
    #[must_use]
    pub fn is_crate_root(&self) -> bool {
        self.module_path.is_empty()
    }
}
