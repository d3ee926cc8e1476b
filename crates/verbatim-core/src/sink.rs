//! Destinations for generated files.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the index file written by [`DirSink::finish`].
pub const INDEX_FILE: &str = "mod.rs";

/// Receives generated files.
pub trait SourceSink {
    /// Adds one file. Each name may be added once per pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the name was already added or the file cannot be
    /// stored.
    fn add_source(&mut self, name: &str, text: &str) -> Result<(), SinkError>;
}

/// Errors raised by sinks.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The name was added twice.
    #[error("source `{0}` was already added")]
    Duplicate(String),

    /// Writing a file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The file being written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Keeps generated files in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    sources: BTreeMap<String, String>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text added under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }

    /// Names added so far, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Number of files added.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if nothing was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Consumes the sink, returning name to text.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.sources
    }
}

impl SourceSink for MemorySink {
    fn add_source(&mut self, name: &str, text: &str) -> Result<(), SinkError> {
        if self.sources.contains_key(name) {
            return Err(SinkError::Duplicate(name.to_string()));
        }
        self.sources.insert(name.to_string(), text.to_string());
        Ok(())
    }
}

/// Writes generated files into a directory.
///
/// Files whose contents did not change are left untouched so their
/// modification time stays stable. [`DirSink::finish`] writes an index that
/// `include!`s every file of the pass and removes files of earlier passes.
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
    written: BTreeSet<String>,
}

impl DirSink {
    /// Creates the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            written: BTreeSet::new(),
        })
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the index file and removes stale generated files.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be written or a stale file
    /// cannot be removed.
    pub fn finish(self) -> Result<PathBuf, SinkError> {
        let mut index = String::from("// <auto-generated/>\n");
        for name in &self.written {
            index.push_str(&format!("include!({name:?});\n"));
        }
        let index_path = self.dir.join(INDEX_FILE);
        write_if_changed(&index_path, &index)?;

        let entries = std::fs::read_dir(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".g.rs") && !self.written.contains(&name) {
                debug!("Removing stale {}", name);
                std::fs::remove_file(entry.path()).map_err(|source| SinkError::Io {
                    path: entry.path(),
                    source,
                })?;
            }
        }
        Ok(index_path)
    }
}

impl SourceSink for DirSink {
    fn add_source(&mut self, name: &str, text: &str) -> Result<(), SinkError> {
        if !self.written.insert(name.to_string()) {
            return Err(SinkError::Duplicate(name.to_string()));
        }
        write_if_changed(&self.dir.join(name), text)
    }
}

fn write_if_changed(path: &Path, text: &str) -> Result<(), SinkError> {
    if std::fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        return Ok(());
    }
    std::fs::write(path, text).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}
