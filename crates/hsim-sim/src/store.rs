//! Slot persistence: named hex blobs on disk or in memory.
//!
//! Two backends are available:
//!   - **DirStore**: one file per slot under a directory, written atomically via temp+rename.
//!   - **MemoryStore**: in-process map, for tests and dry runs.
//!
//! Values are trimmed on read and have trailing whitespace stripped on write.
//! An empty slot reads as `None`, the same as a missing one.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use hsim_core::config::SlotsConfig;
use hsim_core::{HsimError, HsimResult, Slot};

/// Named-slot persistence used by the phase runners.
pub trait SlotStore: Send + Sync {
    /// Read a slot; `None` when it is missing or empty.
    fn read(&self, slot: Slot) -> impl Future<Output = HsimResult<Option<String>>> + Send;

    /// Replace a slot's content.
    fn write(&self, slot: Slot, value: &str) -> impl Future<Output = HsimResult<()>> + Send;

    /// Whether the slot currently holds a value.
    fn exists(&self, slot: Slot) -> impl Future<Output = HsimResult<bool>> + Send {
        async move { Ok(self.read(slot).await?.is_some()) }
    }
}

/// Read a slot that must be present.
pub async fn read_required<S: SlotStore>(store: &S, slot: Slot) -> HsimResult<String> {
    store
        .read(slot)
        .await?
        .ok_or_else(|| HsimError::MissingSlot(slot.to_string()))
}

/// File-per-slot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    names: SlotsConfig,
}

impl DirStore {
    /// Store using the directory and file names from config.
    pub fn new(names: SlotsConfig) -> Self {
        Self { names }
    }

    /// Same file names, different directory.
    pub fn with_dir(dir: &Path, names: SlotsConfig) -> Self {
        Self {
            names: SlotsConfig {
                dir: dir.to_path_buf(),
                ..names
            },
        }
    }

    pub fn dir(&self) -> &Path {
        &self.names.dir
    }

    /// Full path backing a slot.
    pub fn path(&self, slot: Slot) -> PathBuf {
        self.names.path(slot)
    }
}

/// Sibling temp file for one write: `.<file name>.<pid>.<seq>.tmp`.
///
/// Unique per write, so concurrent writes to slots whose names share a stem
/// (`key.a` / `key.b`) never share a temp file.
fn temp_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}

impl SlotStore for DirStore {
    async fn read(&self, slot: Slot) -> HsimResult<Option<String>> {
        let path = self.path(slot);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let trimmed = content.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(HsimError::Persistence {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    async fn write(&self, slot: Slot, value: &str) -> HsimResult<()> {
        let path = self.path(slot);
        let io_err = |source| HsimError::Persistence {
            slot: slot.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        // Atomic write: write to temp file, then rename
        let tmp_path = temp_path(&path);
        if let Err(source) = tokio::fs::write(&tmp_path, value.trim_end()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(io_err(source));
        }
        if let Err(source) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(io_err(source));
        }

        tracing::debug!(slot = %slot, path = %path.display(), "slot written");
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty slots.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Slot, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStore for MemoryStore {
    async fn read(&self, slot: Slot) -> HsimResult<Option<String>> {
        Ok(self
            .lock()
            .get(&slot)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn write(&self, slot: Slot, value: &str) -> HsimResult<()> {
        let value = value.trim_end();
        let mut slots = self.lock();
        if value.is_empty() {
            slots.remove(&slot);
        } else {
            slots.insert(slot, value.to_string());
        }
        Ok(())
    }
}
