//! Corpus source trait and URI registry

use veil_core::{Error, Payload, Result};

use crate::collection::{DirectorySource, GlobSource};

/// Lazy, finite, non-restartable sequence of payloads.
///
/// The total length is unknown until `next_payload` returns `None`.
pub trait CorpusSource {
    /// Short description used in log lines
    fn describe(&self) -> String;

    /// Pull the next payload, `None` once the source is exhausted
    fn next_payload(&mut self) -> Option<Result<Payload>>;
}

impl<S: CorpusSource + ?Sized> CorpusSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn next_payload(&mut self) -> Option<Result<Payload>> {
        (**self).next_payload()
    }
}

/// Options for opening a source URI
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Only yield files with this extension (case-insensitive)
    pub extension: Option<String>,
    /// Stop after this many files
    pub max_files: Option<usize>,
}

/// Opens corpus sources from `dir:<path>` / `glob:<pattern>` URIs.
/// A bare path is treated as a directory.
pub struct SourceRegistry;

impl SourceRegistry {
    pub fn open(uri: &str, options: SourceOptions) -> Result<Box<dyn CorpusSource>> {
        if let Some(pattern) = uri.strip_prefix("glob:") {
            return Ok(Box::new(GlobSource::new(pattern, options)?));
        }

        let path = uri.strip_prefix("dir:").unwrap_or(uri);
        if path.is_empty() || path.contains("://") {
            return Err(Error::Configuration(format!(
                "Invalid source URI: {}",
                uri
            )));
        }

        Ok(Box::new(DirectorySource::new(path, options)?))
    }
}
