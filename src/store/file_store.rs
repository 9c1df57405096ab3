// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::Utc;
use tracing::{debug, info};

use super::backend::StorageBackend;
use crate::config::{VaultConfig, MAX_FILES, MAX_RECENT_FILES};
use crate::error::{Result, VaultError};
use crate::model::{DiagramFile, FileId, FileSummary, FileUpdate};
use crate::version::factory::{create_new_file, NewFileParams};

/// File CRUD plus the bounded recently-opened list.
///
/// Version arrays are never touched here except through [`FileStore::save_file`], which the
/// version manager uses to persist a fully validated file.
#[derive(Debug)]
pub struct FileStore<B> {
    backend: B,
    max_files: usize,
    max_recent_files: usize,
}

impl<B: StorageBackend> FileStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_limits(backend, MAX_FILES, MAX_RECENT_FILES)
    }

    pub fn with_limits(backend: B, max_files: usize, max_recent_files: usize) -> Self {
        Self {
            backend,
            max_files,
            max_recent_files,
        }
    }

    pub fn from_config(backend: B, config: &VaultConfig) -> Self {
        Self::with_limits(backend, config.max_files, config.max_recent_files)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn create_file(&mut self, params: NewFileParams) -> Result<DiagramFile> {
        self.ensure_capacity_for(None)?;
        let file = create_new_file(params);
        self.backend.save_file(&file)?;
        info!(file_id = %file.id(), name = file.name(), "created file");
        Ok(file)
    }

    pub fn get_file(&self, file_id: &FileId) -> Result<DiagramFile> {
        self.backend
            .load_file(file_id)?
            .ok_or_else(|| VaultError::FileNotFound {
                file_id: file_id.clone(),
            })
    }

    pub fn contains(&self, file_id: &FileId) -> Result<bool> {
        Ok(self.backend.load_file(file_id)?.is_some())
    }

    /// Summaries, most recently updated first.
    pub fn list_files(&self) -> Result<Vec<FileSummary>> {
        let mut summaries = self.backend.list_summaries()?;
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(summaries)
    }

    /// Applies a metadata update. Version tracks are left alone.
    pub fn update_file(&mut self, file_id: &FileId, update: FileUpdate) -> Result<DiagramFile> {
        let mut file = self.get_file(file_id)?;
        if update.is_empty() {
            return Ok(file);
        }

        file.apply_update(update);
        file.touch(Utc::now());
        self.backend.save_file(&file)?;
        debug!(file_id = %file_id, "updated file metadata");
        Ok(file)
    }

    /// Removes the file and drops it from the recent list.
    pub fn delete_file(&mut self, file_id: &FileId) -> Result<()> {
        if !self.backend.remove_file(file_id)? {
            return Err(VaultError::FileNotFound {
                file_id: file_id.clone(),
            });
        }

        let mut recent = self.backend.load_recent()?;
        let before = recent.len();
        recent.retain(|id| id != file_id);
        if recent.len() != before {
            self.backend.save_recent(&recent)?;
        }

        info!(file_id = %file_id, "deleted file");
        Ok(())
    }

    /// Full overwrite. Saving an id the store does not know yet counts against the file cap.
    pub fn save_file(&mut self, file: &DiagramFile) -> Result<()> {
        self.ensure_capacity_for(Some(file.id()))?;
        self.backend.save_file(file)?;
        Ok(())
    }

    /// Loads a file and moves it to the front of the recent list.
    pub fn open_file(&mut self, file_id: &FileId) -> Result<DiagramFile> {
        let file = self.get_file(file_id)?;
        self.touch_recent(file_id)?;
        Ok(file)
    }

    pub fn touch_recent(&mut self, file_id: &FileId) -> Result<()> {
        let mut recent = self.backend.load_recent()?;
        if recent.first() == Some(file_id) {
            return Ok(());
        }

        recent.retain(|id| id != file_id);
        recent.insert(0, file_id.clone());
        recent.truncate(self.max_recent_files);
        self.backend.save_recent(&recent)?;
        Ok(())
    }

    pub fn recent_file_ids(&self) -> Result<Vec<FileId>> {
        Ok(self.backend.load_recent()?)
    }

    /// Recent files in recency order. Ids whose file is gone are skipped.
    pub fn recent_files(&self) -> Result<Vec<FileSummary>> {
        let mut out = Vec::new();
        for file_id in self.backend.load_recent()? {
            if let Some(file) = self.backend.load_file(&file_id)? {
                out.push(file.summary());
            }
        }
        Ok(out)
    }

    fn ensure_capacity_for(&self, file_id: Option<&FileId>) -> Result<()> {
        let ids = self.backend.file_ids()?;
        if file_id.is_some_and(|file_id| ids.contains(file_id)) {
            return Ok(());
        }
        if ids.len() >= self.max_files {
            return Err(VaultError::FileLimitReached {
                max_files: self.max_files,
            });
        }
        Ok(())
    }
}
