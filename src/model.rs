//! Value types shared by the picker, the drop helper and the metadata
//! provider.
//!
//! None of these types own anything beyond their data: ids are handed
//! around between the caller and the picker, and metadata records are read
//! fresh from the provider on every sync.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Placeholder shown in a candidate row when the provider does not know the
/// file size.
pub const UNKNOWN_SIZE_LABEL: &str = "size unknown";

/// Identifier of a paired file, unique within a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveFileId(String);

impl LiveFileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LiveFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LiveFileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of the workspace whose live files are listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Read-only description of a candidate live file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveFileMetadata {
    pub id: LiveFileId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl LiveFileMetadata {
    pub fn new(id: impl Into<LiveFileId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: None,
            kind: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Secondary text of a menu row: `"120 bytes · text/x-python"`.
    pub fn detail_label(&self) -> String {
        let size = match self.size {
            Some(size) => format!("{} bytes", group_thousands(size)),
            None => UNKNOWN_SIZE_LABEL.to_string(),
        };
        match self.kind.as_deref() {
            Some(kind) if !kind.is_empty() => format!("{size} · {kind}"),
            _ => size,
        }
    }
}

/// A file on the local file system resolved from a drop or a path prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl FileHandle {
    /// Build a handle from a path, reading size and guessing the type.
    ///
    /// Returns `None` unless `path` names an existing regular file.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let meta = std::fs::metadata(&path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let name = path.file_name()?.to_string_lossy().into_owned();
        let kind = guess_kind(&path);
        Some(Self {
            path,
            name,
            size: Some(meta.len()),
            kind,
        })
    }
}

/// Format `value` with `,` between groups of three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Guess a media type from a path's extension.
pub fn guess_kind(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
