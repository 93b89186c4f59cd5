//! On-disk artifact store mirroring reservoir membership
//!
//! One file per retained item, named `{prefix}_{ordinal}.{extension}`.
//! The in-memory ownership map is the source of truth; the directory
//! listing is a derived view used for reconciliation and recovery.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};
use veil_core::{Error, Result};

/// 25 MiB, the upload limit of the transcription service
pub const DEFAULT_MAX_BYTES: u64 = 25 * 1024 * 1024;

const PARTIAL_SUFFIX: &str = ".partial";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub root: PathBuf,
    pub max_bytes: u64,
    pub prefix: String,
    pub extension: String,
}

impl StoreOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/raw_audios"),
            max_bytes: DEFAULT_MAX_BYTES,
            prefix: "audio".to_string(),
            extension: "wav".to_string(),
        }
    }
}

/// Handle to one materialized artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub ordinal: u64,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub content_hash: String,
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// Difference between the ownership map and the directory listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Owned ordinals with no file on disk
    pub missing: Vec<u64>,
    /// Files on disk that the store does not own
    pub orphaned: Vec<u64>,
    /// Hidden partial files left behind by an interrupted write
    #[serde(default)]
    pub stale_partials: Vec<String>,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.orphaned.is_empty() && self.stale_partials.is_empty()
    }
}

pub struct ArtifactStore {
    options: StoreOptions,
    naming: Regex,
    owned: BTreeMap<u64, ArtifactRef>,
}

impl ArtifactStore {
    /// Open a store rooted at `options.root`, creating the directory if needed.
    ///
    /// The store starts with no owned artifacts; call [`reset`](Self::reset)
    /// before a run or [`recover`](Self::recover) to adopt existing files.
    pub fn new(options: StoreOptions) -> Result<Self> {
        if options.prefix.is_empty() || options.extension.is_empty() {
            return Err(Error::Configuration(
                "artifact prefix and extension must not be empty".to_string(),
            ));
        }

        let pattern = format!(
            r"^{}_(\d+)\.{}$",
            regex::escape(&options.prefix),
            regex::escape(&options.extension)
        );
        let naming = Regex::new(&pattern)
            .map_err(|e| Error::Configuration(format!("invalid artifact naming: {}", e)))?;

        fs::create_dir_all(&options.root)?;

        Ok(Self {
            options,
            naming,
            owned: BTreeMap::new(),
        })
    }

    /// Open a store and take ownership of every artifact already on disk
    pub fn recover(options: StoreOptions) -> Result<Self> {
        let mut store = Self::new(options)?;

        for ordinal in store.scan()? {
            let path = store.path_for(ordinal);
            let content = fs::read(&path)?;
            let metadata = fs::metadata(&path)?;
            let created_at = metadata
                .modified()
                .map(OffsetDateTime::from)
                .unwrap_or_else(|_| OffsetDateTime::now_utc());

            store.owned.insert(
                ordinal,
                ArtifactRef {
                    ordinal,
                    path,
                    size_bytes: content.len() as u64,
                    content_hash: blake3::hash(&content).to_hex().to_string(),
                    created_at,
                },
            );
        }

        info!(
            root = %store.options.root.display(),
            artifacts = store.owned.len(),
            "recovered artifact store"
        );
        Ok(store)
    }

    /// Write one artifact durably. Oversize content is refused before anything
    /// touches the disk; a failed write leaves no partial file behind.
    pub fn materialize(&mut self, ordinal: u64, content: &[u8]) -> Result<ArtifactRef> {
        if self.owned.contains_key(&ordinal) {
            return Err(Error::Precondition(format!(
                "artifact {} already materialized",
                ordinal
            )));
        }

        let size_bytes = content.len() as u64;
        if size_bytes > self.options.max_bytes {
            return Err(Error::Resource(format!(
                "item {} is {} bytes, limit is {} bytes",
                ordinal, size_bytes, self.options.max_bytes
            )));
        }

        let path = self.path_for(ordinal);
        let partial = self.partial_path_for(ordinal);

        if let Err(e) = write_durably(&partial, content).and_then(|_| fs::rename(&partial, &path)) {
            let _ = fs::remove_file(&partial);
            return Err(Error::Resource(format!(
                "failed to write {}: {}",
                path.display(),
                e
            )));
        }
        if let Err(e) = sync_dir(&self.options.root) {
            let _ = fs::remove_file(&path);
            return Err(Error::Resource(format!(
                "failed to sync {}: {}",
                self.options.root.display(),
                e
            )));
        }

        let artifact = ArtifactRef {
            ordinal,
            path,
            size_bytes,
            content_hash: blake3::hash(content).to_hex().to_string(),
            created_at: OffsetDateTime::now_utc(),
        };

        debug!(ordinal, size_bytes, path = %artifact.path.display(), "materialized artifact");
        self.owned.insert(ordinal, artifact.clone());
        Ok(artifact)
    }

    /// Delete the `slot_index`-th artifact in ascending ordinal order
    pub fn evict(&mut self, slot_index: usize) -> Result<ArtifactRef> {
        let ordinal = self
            .owned
            .keys()
            .nth(slot_index)
            .copied()
            .ok_or(Error::NotFound {
                slot: slot_index,
                available: self.owned.len(),
            })?;

        self.discard(ordinal)
    }

    /// Delete the artifact for `ordinal`
    pub fn discard(&mut self, ordinal: u64) -> Result<ArtifactRef> {
        let path = match self.owned.get(&ordinal) {
            Some(artifact) => artifact.path.clone(),
            None => {
                return Err(Error::Precondition(format!(
                    "artifact {} is not owned by this store",
                    ordinal
                )));
            }
        };

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MirrorDivergence { ordinal });
            }
            Err(e) => return Err(e.into()),
        }
        let removed = self
            .owned
            .remove(&ordinal)
            .ok_or(Error::MirrorDivergence { ordinal })?;
        sync_dir(&self.options.root)?;

        debug!(ordinal, path = %path.display(), "deleted artifact");
        Ok(removed)
    }

    /// Remove every artifact (and stale partial file) from the directory
    pub fn reset(&mut self) -> Result<usize> {
        fs::create_dir_all(&self.options.root)?;

        let mut removed = 0;
        for entry in fs::read_dir(&self.options.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let name = entry.file_name();
            let name = name.to_string_lossy();
            if self.parse_ordinal(&name).is_some() || self.is_partial(&name) {
                fs::remove_file(entry.path())?;
                debug!(file = %name, "removed stale artifact");
                removed += 1;
            }
        }
        sync_dir(&self.options.root)?;

        self.owned.clear();
        info!(root = %self.options.root.display(), removed, "artifact store reset");
        Ok(removed)
    }

    /// Ordinals of the artifacts present on disk, in ascending numeric order
    pub fn scan(&self) -> Result<Vec<u64>> {
        let mut ordinals = Vec::new();

        for entry in fs::read_dir(&self.options.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(ordinal) = self.parse_ordinal(&entry.file_name().to_string_lossy()) {
                ordinals.push(ordinal);
            }
        }

        ordinals.sort_unstable();
        Ok(ordinals)
    }

    /// Compare the ownership map against the directory listing
    pub fn reconcile(&self) -> Result<Reconciliation> {
        let on_disk: BTreeSet<u64> = self.scan()?.into_iter().collect();

        let missing = self
            .owned
            .keys()
            .filter(|ordinal| !on_disk.contains(ordinal))
            .copied()
            .collect();
        let orphaned = on_disk
            .iter()
            .filter(|ordinal| !self.owned.contains_key(ordinal))
            .copied()
            .collect();

        let mut stale_partials = Vec::new();
        for entry in fs::read_dir(&self.options.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_file() && self.is_partial(&name) {
                stale_partials.push(name);
            }
        }
        stale_partials.sort();

        Ok(Reconciliation {
            missing,
            orphaned,
            stale_partials,
        })
    }

    /// Position of `ordinal` among owned artifacts in ascending order
    pub fn rank_of(&self, ordinal: u64) -> Option<usize> {
        self.owned.keys().position(|&owned| owned == ordinal)
    }

    pub fn get(&self, ordinal: u64) -> Option<&ArtifactRef> {
        self.owned.get(&ordinal)
    }

    /// Owned artifacts in ascending ordinal order
    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactRef> {
        self.owned.values()
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.options.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.options.max_bytes
    }

    pub fn file_name(&self, ordinal: u64) -> String {
        format!(
            "{}_{}.{}",
            self.options.prefix, ordinal, self.options.extension
        )
    }

    fn path_for(&self, ordinal: u64) -> PathBuf {
        self.options.root.join(self.file_name(ordinal))
    }

    fn partial_path_for(&self, ordinal: u64) -> PathBuf {
        self.options
            .root
            .join(format!(".{}{}", self.file_name(ordinal), PARTIAL_SUFFIX))
    }

    fn parse_ordinal(&self, name: &str) -> Option<u64> {
        self.naming
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn is_partial(&self, name: &str) -> bool {
        name.strip_prefix('.')
            .and_then(|rest| rest.strip_suffix(PARTIAL_SUFFIX))
            .is_some_and(|inner| self.parse_ordinal(inner).is_some())
    }
}

fn write_durably(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
