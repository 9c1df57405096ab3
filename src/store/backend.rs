// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::{DiagramFile, FileId, FileSummary, IdError};

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidId {
        value: String,
        source: IdError,
    },
    SymlinkRefused {
        path: PathBuf,
    },
    ReadOnly,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::InvalidId { value, source } => write!(f, "invalid stored id {value:?}: {source}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
            Self::ReadOnly => f.write_str("storage backend is read-only"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::SymlinkRefused { .. } | Self::ReadOnly => None,
        }
    }
}

/// Persistence keyed by file id, plus the recency list.
///
/// Backends do not retry; failures are surfaced as-is.
pub trait StorageBackend {
    fn load_file(&self, file_id: &FileId) -> Result<Option<DiagramFile>, StoreError>;

    /// Full overwrite of the stored record.
    fn save_file(&mut self, file: &DiagramFile) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    fn remove_file(&mut self, file_id: &FileId) -> Result<bool, StoreError>;

    fn file_ids(&self) -> Result<Vec<FileId>, StoreError>;

    /// Listing view. Backends that keep a summary index should override this so listing does
    /// not read version payloads.
    fn list_summaries(&self) -> Result<Vec<FileSummary>, StoreError> {
        let mut out = Vec::new();
        for file_id in self.file_ids()? {
            if let Some(file) = self.load_file(&file_id)? {
                out.push(file.summary());
            }
        }
        Ok(out)
    }

    fn load_recent(&self) -> Result<Vec<FileId>, StoreError>;

    fn save_recent(&mut self, recent: &[FileId]) -> Result<(), StoreError>;
}

/// In-process backend, mostly for tests and ephemeral workspaces.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    files: BTreeMap<FileId, DiagramFile>,
    recent: Vec<FileId>,
    read_only: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail with [`StoreError::ReadOnly`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn load_file(&self, file_id: &FileId) -> Result<Option<DiagramFile>, StoreError> {
        Ok(self.files.get(file_id).cloned())
    }

    fn save_file(&mut self, file: &DiagramFile) -> Result<(), StoreError> {
        self.check_writable()?;
        self.files.insert(file.id().clone(), file.clone());
        Ok(())
    }

    fn remove_file(&mut self, file_id: &FileId) -> Result<bool, StoreError> {
        self.check_writable()?;
        Ok(self.files.remove(file_id).is_some())
    }

    fn file_ids(&self) -> Result<Vec<FileId>, StoreError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn load_recent(&self) -> Result<Vec<FileId>, StoreError> {
        Ok(self.recent.clone())
    }

    fn save_recent(&mut self, recent: &[FileId]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.recent = recent.to_vec();
        Ok(())
    }
}
