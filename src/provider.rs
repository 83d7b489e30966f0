//! Workspace content metadata: the ordered list of live files the picker
//! offers as candidates.
//!
//! The picker only depends on [`LiveFileMetadataProvider`]. The
//! [`LiveFileRegistry`] implementation is what the demo binary uses: a
//! shareable in-memory store that can be persisted as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::model::{FileHandle, LiveFileId, LiveFileMetadata, WorkspaceId};

pub trait LiveFileMetadataProvider: Send + Sync {
    /// Candidates for `workspace`, in display order.
    fn live_files(&self, workspace: &WorkspaceId) -> Vec<LiveFileMetadata>;
}

impl<T: LiveFileMetadataProvider + ?Sized> LiveFileMetadataProvider for Arc<T> {
    fn live_files(&self, workspace: &WorkspaceId) -> Vec<LiveFileMetadata> {
        (**self).live_files(workspace)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LiveFileEntry {
    #[serde(flatten)]
    meta: LiveFileMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryState {
    next_id: u64,
    workspaces: BTreeMap<WorkspaceId, Vec<LiveFileEntry>>,
    /// Live file each workspace is currently paired with.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    selections: BTreeMap<WorkspaceId, LiveFileId>,
}

impl RegistryState {
    fn allocate_id(&mut self) -> LiveFileId {
        self.next_id = self.next_id.saturating_add(1);
        LiveFileId::new(format!("lf-{}", self.next_id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiveFileRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

impl LiveFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry previously written by [`LiveFileRegistry::save`].
    /// A missing file yields an empty registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no registry file, starting empty");
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(RegistryError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let state: RegistryState =
            serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            inner: Arc::new(RwLock::new(state)),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let encoded = {
            let state = self.inner.read().map_err(|_| RegistryError::Poisoned)?;
            serde_json::to_string_pretty(&*state)?
        };
        fs::write(path, encoded).map_err(|source| RegistryError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pair `handle` with `workspace`. Registering a path that is already
    /// known refreshes its metadata and returns the existing id.
    pub fn register(
        &self,
        workspace: &WorkspaceId,
        handle: &FileHandle,
    ) -> Result<LiveFileId, RegistryError> {
        let mut state = self.inner.write().map_err(|_| RegistryError::Poisoned)?;
        let existing = state.workspaces.get_mut(workspace).and_then(|entries| {
            entries
                .iter_mut()
                .find(|entry| entry.path.as_deref() == Some(handle.path.as_path()))
        });
        if let Some(entry) = existing {
            entry.meta.name = handle.name.clone();
            entry.meta.size = handle.size;
            entry.meta.kind = handle.kind.clone();
            return Ok(entry.meta.id.clone());
        }
        let id = state.allocate_id();
        let entry = LiveFileEntry {
            meta: LiveFileMetadata {
                id: id.clone(),
                name: handle.name.clone(),
                size: handle.size,
                kind: handle.kind.clone(),
            },
            path: Some(handle.path.clone()),
        };
        state
            .workspaces
            .entry(workspace.clone())
            .or_default()
            .push(entry);
        tracing::debug!(workspace = %workspace, live_file = %id, path = %handle.path.display(), "registered live file");
        Ok(id)
    }

    /// Insert or replace a record that has no backing path.
    pub fn insert(
        &self,
        workspace: &WorkspaceId,
        meta: LiveFileMetadata,
    ) -> Result<(), RegistryError> {
        let mut state = self.inner.write().map_err(|_| RegistryError::Poisoned)?;
        let entries = state.workspaces.entry(workspace.clone()).or_default();
        match entries.iter_mut().find(|entry| entry.meta.id == meta.id) {
            Some(entry) => entry.meta = meta,
            None => entries.push(LiveFileEntry { meta, path: None }),
        }
        Ok(())
    }

    pub fn remove(&self, workspace: &WorkspaceId, id: &LiveFileId) -> Result<bool, RegistryError> {
        let mut state = self.inner.write().map_err(|_| RegistryError::Poisoned)?;
        let Some(entries) = state.workspaces.get_mut(workspace) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|entry| &entry.meta.id != id);
        let removed = entries.len() != before;
        if state.selections.get(workspace) == Some(id) {
            state.selections.remove(workspace);
        }
        Ok(removed)
    }

    /// Live file `workspace` is paired with, if any.
    pub fn selection(&self, workspace: &WorkspaceId) -> Option<LiveFileId> {
        self.inner.read().ok()?.selections.get(workspace).cloned()
    }

    /// Pair `workspace` with `id`, or unpair it with `None`. Unknown ids are
    /// stored as given.
    pub fn set_selection(
        &self,
        workspace: &WorkspaceId,
        id: Option<LiveFileId>,
    ) -> Result<(), RegistryError> {
        let mut state = self.inner.write().map_err(|_| RegistryError::Poisoned)?;
        match id {
            Some(id) => {
                state.selections.insert(workspace.clone(), id);
            }
            None => {
                state.selections.remove(workspace);
            }
        }
        Ok(())
    }

    pub fn get(&self, workspace: &WorkspaceId, id: &LiveFileId) -> Option<LiveFileMetadata> {
        self.find(workspace, id, |entry| entry.meta.clone())
    }

    pub fn path_of(&self, workspace: &WorkspaceId, id: &LiveFileId) -> Option<PathBuf> {
        self.find(workspace, id, |entry| entry.path.clone()).flatten()
    }

    fn find<T>(
        &self,
        workspace: &WorkspaceId,
        id: &LiveFileId,
        map: impl FnOnce(&LiveFileEntry) -> T,
    ) -> Option<T> {
        let state = self.inner.read().ok()?;
        state
            .workspaces
            .get(workspace)?
            .iter()
            .find(|entry| &entry.meta.id == id)
            .map(map)
    }

    /// Register every regular file directly inside `dir`, sorted by name.
    /// Returns how many files were registered.
    pub fn scan_dir(&self, workspace: &WorkspaceId, dir: &Path) -> Result<usize, RegistryError> {
        let read_err = |source: std::io::Error| RegistryError::Read {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = fs::read_dir(dir)
            .map_err(read_err)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect::<Vec<_>>();
        paths.sort();
        let mut count = 0;
        for path in paths {
            if let Some(handle) = FileHandle::from_path(path) {
                self.register(workspace, &handle)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

impl LiveFileMetadataProvider for LiveFileRegistry {
    fn live_files(&self, workspace: &WorkspaceId) -> Vec<LiveFileMetadata> {
        let Ok(state) = self.inner.read() else {
            tracing::warn!(workspace = %workspace, "registry lock poisoned, listing nothing");
            return Vec::new();
        };
        state
            .workspaces
            .get(workspace)
            .map(|entries| entries.iter().map(|entry| entry.meta.clone()).collect())
            .unwrap_or_default()
    }
}
