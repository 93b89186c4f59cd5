use std::path::{Path, PathBuf};

use veil_core::{Error, Payload, Result};

use crate::handler::{CorpusSource, SourceOptions};

/// Files under a directory, recursively, in sorted path order.
/// Each file is read only when it is pulled.
pub struct DirectorySource {
    root: PathBuf,
    walker: walkdir::IntoIter,
    options: SourceOptions,
    yielded: usize,
}

impl DirectorySource {
    pub fn new(path: impl AsRef<Path>, options: SourceOptions) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::Configuration(format!(
                "Directory does not exist: {}",
                root.display()
            )));
        }

        let walker = walkdir::WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter();

        Ok(Self {
            root,
            walker,
            options,
            yielded: 0,
        })
    }
}

impl CorpusSource for DirectorySource {
    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }

    fn next_payload(&mut self) -> Option<Result<Payload>> {
        if limit_reached(&self.options, self.yielded) {
            return None;
        }

        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::Io(e.into()))),
            };

            if entry.file_type().is_file() && has_extension(entry.path(), &self.options) {
                self.yielded += 1;
                return Some(read_payload(entry.path()));
            }
        }
    }
}

/// Files matching a glob pattern, in sorted path order
pub struct GlobSource {
    pattern: String,
    paths: std::vec::IntoIter<PathBuf>,
    options: SourceOptions,
    yielded: usize,
}

impl GlobSource {
    pub fn new(pattern: &str, options: SourceOptions) -> Result<Self> {
        let entries = glob::glob(pattern)
            .map_err(|e| Error::Configuration(format!("Invalid glob pattern {}: {}", pattern, e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            if path.is_file() && has_extension(&path, &options) {
                paths.push(path);
            }
        }

        // Sort for determinism
        paths.sort();

        Ok(Self {
            pattern: pattern.to_string(),
            paths: paths.into_iter(),
            options,
            yielded: 0,
        })
    }
}

impl CorpusSource for GlobSource {
    fn describe(&self) -> String {
        format!("glob:{}", self.pattern)
    }

    fn next_payload(&mut self) -> Option<Result<Payload>> {
        if limit_reached(&self.options, self.yielded) {
            return None;
        }

        let path = self.paths.next()?;
        self.yielded += 1;
        Some(read_payload(&path))
    }
}

fn read_payload(path: &Path) -> Result<Payload> {
    let content = std::fs::read(path)?;
    Ok(Payload::new(content).with_origin(path.display().to_string()))
}

fn limit_reached(options: &SourceOptions, yielded: usize) -> bool {
    options.max_files.is_some_and(|max| yielded >= max)
}

fn has_extension(path: &Path, options: &SourceOptions) -> bool {
    match &options.extension {
        None => true,
        Some(wanted) => path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted.trim_start_matches('.'))),
    }
}
