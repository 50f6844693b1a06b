// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Table Cache
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Memoisation of rate tables and totals, keyed by run identity and a
//! fingerprint of the result-shaping settings.
//!
//! `get_or_compute` holds a per-slot lock across load, compute and store,
//! so concurrent callers compute each slot at most once. Slots for
//! different artifacts lock independently, which lets a totals
//! computation fetch its rate tables through the same cache.

use crate::channels::ChannelKind;
use crate::io;
use crate::supernova::{distance_label, Supernova};
use sspike_types::error::SspikeResult;
use sspike_types::state::{ChannelRateTable, EventTotalsTable, VisibleTotalsTable};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub model: String,
    /// Encodes the progenitor parameters.
    pub sn_name: String,
    pub distance: f64,
    /// Transformation abbreviation.
    pub transform: String,
    pub detector: String,
    pub bin_index: usize,
    /// Fingerprint of the grids, tolerances, constants and inputs.
    pub settings: String,
}

impl CacheKey {
    pub fn new(sn: &Supernova, detector: &str, bin_index: usize, settings: &str) -> Self {
        CacheKey {
            model: sn.model.clone(),
            sn_name: sn.sn_name.clone(),
            distance: sn.distance,
            transform: sn.xform().to_string(),
            detector: detector.to_string(),
            bin_index,
            settings: settings.to_string(),
        }
    }

    /// `<detector>/<sn_name>/<distance>kpc-<transform>/bin-<i>`
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(&self.detector)
            .join(&self.sn_name)
            .join(format!("{}kpc-{}", distance_label(self.distance), self.transform))
            .join(format!("bin-{}", self.bin_index))
    }

    /// `<relative_dir>/cfg-<settings>`, where cached tables live.
    pub fn slot_dir(&self) -> PathBuf {
        self.relative_dir().join(format!("cfg-{}", self.settings))
    }

    fn slot(&self, artifact: Artifact) -> String {
        format!("{}/{}", self.slot_dir().display(), artifact.file_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Rates(ChannelKind),
    Totals,
    VisibleTotals,
}

impl Artifact {
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Rates(kind) => kind.file_name(),
            Artifact::Totals => "totals_all.csv",
            Artifact::VisibleTotals => "totals_vis.csv",
        }
    }
}

/// Tables that can be stored as text and read back unchanged.
pub trait CachedTable: Sized {
    fn to_text(&self) -> SspikeResult<String>;
    fn from_text(text: &str, source: &str) -> SspikeResult<Self>;
}

impl CachedTable for ChannelRateTable {
    fn to_text(&self) -> SspikeResult<String> {
        Ok(io::format_rate_table(self))
    }

    fn from_text(text: &str, source: &str) -> SspikeResult<Self> {
        io::parse_rate_table(text, source)
    }
}

impl CachedTable for EventTotalsTable {
    fn to_text(&self) -> SspikeResult<String> {
        io::format_totals(self)
    }

    fn from_text(text: &str, source: &str) -> SspikeResult<Self> {
        io::parse_totals(text, source)
    }
}

impl CachedTable for VisibleTotalsTable {
    fn to_text(&self) -> SspikeResult<String> {
        io::format_visible_totals(self)
    }

    fn from_text(text: &str, source: &str) -> SspikeResult<Self> {
        io::parse_visible_totals(text, source)
    }
}

/// Per-slot mutexes handed out by a cache.
#[derive(Debug, Default)]
pub struct SlotLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SlotLocks {
    pub fn get(&self, slot: &str) -> Arc<Mutex<()>> {
        let mut slots = lock(&self.slots);
        slots.entry(slot.to_string()).or_default().clone()
    }
}

// A panic while holding a cache lock leaves no partial state behind.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub trait TableCache: Send + Sync {
    fn load(&self, key: &CacheKey, artifact: Artifact) -> SspikeResult<Option<String>>;
    fn store(&self, key: &CacheKey, artifact: Artifact, text: &str) -> SspikeResult<()>;
    /// Lock serialising load-compute-store for one slot.
    fn slot_lock(&self, key: &CacheKey, artifact: Artifact) -> Arc<Mutex<()>>;
}

/// Return the cached table for `(key, artifact)`, or compute and store it.
pub fn get_or_compute<T, C, F>(
    cache: &C,
    key: &CacheKey,
    artifact: Artifact,
    compute: F,
) -> SspikeResult<T>
where
    T: CachedTable,
    C: TableCache + ?Sized,
    F: FnOnce() -> SspikeResult<T>,
{
    let slot = cache.slot_lock(key, artifact);
    let _guard = lock(&slot);

    let source = key.slot(artifact);
    if let Some(text) = cache.load(key, artifact)? {
        debug!(slot = %source, "cache hit");
        return T::from_text(&text, &source);
    }

    debug!(slot = %source, "cache miss, computing");
    let value = compute()?;
    cache.store(key, artifact, &value.to_text()?)?;
    Ok(value)
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    locks: SlotLocks,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TableCache for MemoryCache {
    fn load(&self, key: &CacheKey, artifact: Artifact) -> SspikeResult<Option<String>> {
        Ok(lock(&self.entries).get(&key.slot(artifact)).cloned())
    }

    fn store(&self, key: &CacheKey, artifact: Artifact, text: &str) -> SspikeResult<()> {
        lock(&self.entries).insert(key.slot(artifact), text.to_string());
        Ok(())
    }

    fn slot_lock(&self, key: &CacheKey, artifact: Artifact) -> Arc<Mutex<()>> {
        self.locks.get(&key.slot(artifact))
    }
}

/// Directory-tree cache rooted at `root`.
///
/// Files are written to a temporary file in the target directory and
/// renamed into place, so a reader sees either the whole table or none.
#[derive(Debug)]
pub struct DiskCache {
    root: PathBuf,
    locks: SlotLocks,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskCache {
            root: root.into(),
            locks: SlotLocks::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, key: &CacheKey, artifact: Artifact) -> PathBuf {
        self.root.join(key.slot_dir()).join(artifact.file_name())
    }
}

impl TableCache for DiskCache {
    fn load(&self, key: &CacheKey, artifact: Artifact) -> SspikeResult<Option<String>> {
        let path = self.path(key, artifact);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &CacheKey, artifact: Artifact, text: &str) -> SspikeResult<()> {
        let path = self.path(key, artifact);
        let dir = self.root.join(key.slot_dir());
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        info!(path = %path.display(), "wrote {}", artifact.file_name());
        Ok(())
    }

    fn slot_lock(&self, key: &CacheKey, artifact: Artifact) -> Arc<Mutex<()>> {
        self.locks.get(&key.slot(artifact))
    }
}
