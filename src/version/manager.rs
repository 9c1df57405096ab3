// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Version-track orchestration.
//!
//! [`FileVersionManager`] is the only writer of version lists and current pointers. Every
//! operation loads the file, mutates a private copy, checks the track invariants and only then
//! persists it, so a failed call never leaves a partially applied file behind.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::factory::{create_version, NewVersionParams};
use crate::config::{VaultConfig, MAX_PROFESSIONAL_VERSIONS, MAX_SIMPLE_VERSIONS};
use crate::error::{Result, VaultError};
use crate::model::{
    DiagramFile, DiagramVersion, Element, EnhancementOptions, FileId, VersionId, VersionPayload,
    VersionType,
};
use crate::store::{FileStore, StorageBackend};

/// Produces the structured-diagram XML of a professional version from simple-track elements.
pub trait Enhancer {
    fn enhance(
        &self,
        file: &DiagramFile,
        elements: &[Element],
        options: &EnhancementOptions,
    ) -> std::result::Result<String, String>;
}

/// Payload-free view of a version, used for listings and stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: VersionId,
    pub version_type: VersionType,
    pub version_number: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub auto_save: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_simple_version_id: Option<VersionId>,
}

impl From<&DiagramVersion> for VersionInfo {
    fn from(version: &DiagramVersion) -> Self {
        Self {
            id: version.id().clone(),
            version_type: version.version_type(),
            version_number: version.version_number(),
            created_at: version.created_at(),
            note: version.note().map(str::to_owned),
            auto_save: version.is_auto_save(),
            source_simple_version_id: version.source_simple_version_id().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStats {
    pub simple_count: usize,
    pub professional_count: usize,
    /// Highest-numbered version of each track.
    pub latest_simple: Option<VersionInfo>,
    pub latest_professional: Option<VersionInfo>,
    pub current_simple_version_id: VersionId,
    pub current_professional_version_id: Option<VersionId>,
}

#[derive(Debug)]
pub struct FileVersionManager<B> {
    store: FileStore<B>,
    max_simple_versions: usize,
    max_professional_versions: usize,
}

impl<B: StorageBackend> FileVersionManager<B> {
    pub fn new(store: FileStore<B>) -> Self {
        Self::with_caps(store, MAX_SIMPLE_VERSIONS, MAX_PROFESSIONAL_VERSIONS)
    }

    /// Caps below 1 are raised to 1 so the new current version always survives eviction.
    pub fn with_caps(
        store: FileStore<B>,
        max_simple_versions: usize,
        max_professional_versions: usize,
    ) -> Self {
        Self {
            store,
            max_simple_versions: max_simple_versions.max(1),
            max_professional_versions: max_professional_versions.max(1),
        }
    }

    pub fn from_config(store: FileStore<B>, config: &VaultConfig) -> Self {
        Self::with_caps(
            store,
            config.max_simple_versions,
            config.max_professional_versions,
        )
    }

    pub fn store(&self) -> &FileStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FileStore<B> {
        &mut self.store
    }

    pub fn into_store(self) -> FileStore<B> {
        self.store
    }

    fn cap(&self, version_type: VersionType) -> usize {
        match version_type {
            VersionType::Simple => self.max_simple_versions,
            VersionType::Professional => self.max_professional_versions,
        }
    }

    /// Appends an explicit simple version and makes it current.
    pub fn create_simple_version(
        &mut self,
        file_id: &FileId,
        elements: Vec<Element>,
        note: Option<String>,
    ) -> Result<DiagramFile> {
        self.append(
            file_id,
            NewVersionParams::simple(elements).with_note(note),
        )
    }

    /// Same as [`Self::create_simple_version`] but flagged as a silent checkpoint.
    ///
    /// Scheduling is the caller's concern (see [`super::autosave::Autosaver`]).
    pub fn autosave_simple_version(
        &mut self,
        file_id: &FileId,
        elements: Vec<Element>,
    ) -> Result<DiagramFile> {
        self.append(file_id, NewVersionParams::simple(elements).auto_saved())
    }

    /// Appends a professional version derived from the current simple version.
    pub fn create_professional_version(
        &mut self,
        file_id: &FileId,
        xml: String,
        options: EnhancementOptions,
        note: Option<String>,
    ) -> Result<DiagramFile> {
        let file = self.store.get_file(file_id)?;
        let source = file.current_simple_version_id().clone();
        self.append_to(
            file,
            NewVersionParams {
                payload: VersionPayload::Professional { xml, options },
                note,
                auto_save: false,
                source_simple_version_id: Some(source),
            },
        )
    }

    /// Renders the current simple version through `enhancer` and stores the result as a new
    /// professional version.
    pub fn generate_professional_version<E>(
        &mut self,
        file_id: &FileId,
        options: EnhancementOptions,
        enhancer: &E,
        note: Option<String>,
    ) -> Result<DiagramFile>
    where
        E: Enhancer + ?Sized,
    {
        let file = self.store.get_file(file_id)?;
        let elements = file
            .current_simple_version()
            .and_then(DiagramVersion::elements)
            .unwrap_or(&[]);

        let xml = enhancer
            .enhance(&file, elements, &options)
            .map_err(|reason| VaultError::EnhancementFailed { reason })?;

        let source = file.current_simple_version_id().clone();
        self.append_to(
            file,
            NewVersionParams {
                payload: VersionPayload::Professional { xml, options },
                note,
                auto_save: false,
                source_simple_version_id: Some(source),
            },
        )
    }

    pub fn switch_simple_version(
        &mut self,
        file_id: &FileId,
        version_id: &VersionId,
    ) -> Result<DiagramFile> {
        self.switch(file_id, VersionType::Simple, version_id)
    }

    pub fn switch_professional_version(
        &mut self,
        file_id: &FileId,
        version_id: &VersionId,
    ) -> Result<DiagramFile> {
        self.switch(file_id, VersionType::Professional, version_id)
    }

    /// Removes one version.
    ///
    /// The simple track can never become empty. When the current version is deleted, the
    /// highest remaining number becomes current (or the professional pointer is cleared).
    pub fn delete_version(
        &mut self,
        file_id: &FileId,
        version_id: &VersionId,
        version_type: VersionType,
    ) -> Result<DiagramFile> {
        let mut file = self.store.get_file(file_id)?;

        let Some(position) = file
            .versions(version_type)
            .iter()
            .position(|version| version.id() == version_id)
        else {
            return Err(VaultError::VersionNotFound {
                file_id: file_id.clone(),
                version_type,
                version_id: version_id.clone(),
            });
        };

        if version_type == VersionType::Simple && file.simple_versions().len() == 1 {
            return Err(VaultError::CannotDeleteLastVersion {
                file_id: file_id.clone(),
            });
        }

        let removed = file.versions_mut(version_type).remove(position);
        let replacement = latest(file.versions(version_type)).map(|version| version.id().clone());

        match version_type {
            VersionType::Simple => {
                if file.current_simple_version_id() == version_id {
                    if let Some(replacement) = replacement {
                        file.set_current_simple_version_id(replacement);
                    }
                }
            }
            VersionType::Professional => {
                if file.current_professional_version_id() == Some(version_id) {
                    file.set_current_professional_version_id(replacement);
                }
            }
        }

        file.touch(Utc::now());
        self.store.save_file(&file)?;
        info!(
            file_id = %file_id,
            version_type = %version_type,
            version_number = removed.version_number(),
            "deleted version"
        );
        Ok(file)
    }

    pub fn get_version_stats(&self, file_id: &FileId) -> Result<VersionStats> {
        let file = self.store.get_file(file_id)?;
        Ok(VersionStats {
            simple_count: file.simple_versions().len(),
            professional_count: file.professional_versions().len(),
            latest_simple: latest(file.simple_versions()).map(VersionInfo::from),
            latest_professional: latest(file.professional_versions()).map(VersionInfo::from),
            current_simple_version_id: file.current_simple_version_id().clone(),
            current_professional_version_id: file.current_professional_version_id().cloned(),
        })
    }

    /// Whether saving `elements` would record anything new for the current simple version.
    pub fn needs_save(&self, file_id: &FileId, elements: &[Element]) -> Result<bool> {
        let file = self.store.get_file(file_id)?;
        let current = file
            .current_simple_version()
            .and_then(DiagramVersion::elements);
        Ok(current != Some(elements))
    }

    pub fn get_version(
        &self,
        file_id: &FileId,
        version_type: VersionType,
        version_id: &VersionId,
    ) -> Result<DiagramVersion> {
        let file = self.store.get_file(file_id)?;
        file.find_version(version_type, version_id)
            .cloned()
            .ok_or_else(|| VaultError::VersionNotFound {
                file_id: file_id.clone(),
                version_type,
                version_id: version_id.clone(),
            })
    }

    pub fn current_simple_version(&self, file_id: &FileId) -> Result<DiagramVersion> {
        let file = self.store.get_file(file_id)?;
        let current_id = file.current_simple_version_id().clone();
        file.current_simple_version()
            .cloned()
            .ok_or(VaultError::VersionNotFound {
                file_id: file_id.clone(),
                version_type: VersionType::Simple,
                version_id: current_id,
            })
    }

    pub fn current_professional_version(
        &self,
        file_id: &FileId,
    ) -> Result<Option<DiagramVersion>> {
        let file = self.store.get_file(file_id)?;
        Ok(file.current_professional_version().cloned())
    }

    pub fn list_versions(
        &self,
        file_id: &FileId,
        version_type: VersionType,
    ) -> Result<Vec<VersionInfo>> {
        let file = self.store.get_file(file_id)?;
        Ok(file
            .versions(version_type)
            .iter()
            .map(VersionInfo::from)
            .collect())
    }

    fn append(&mut self, file_id: &FileId, params: NewVersionParams) -> Result<DiagramFile> {
        let file = self.store.get_file(file_id)?;
        self.append_to(file, params)
    }

    fn append_to(&mut self, mut file: DiagramFile, params: NewVersionParams) -> Result<DiagramFile> {
        let version = create_version(&file, params);
        let version_type = version.version_type();
        let version_id = version.id().clone();
        let version_number = version.version_number();
        let auto_save = version.is_auto_save();

        file.push_version(version);
        match version_type {
            VersionType::Simple => file.set_current_simple_version_id(version_id.clone()),
            VersionType::Professional => {
                file.set_current_professional_version_id(Some(version_id.clone()))
            }
        }
        self.evict_overflow(&mut file, version_type, &version_id);
        file.touch(Utc::now());

        self.store.save_file(&file)?;
        info!(
            file_id = %file.id(),
            version_type = %version_type,
            version_number,
            auto_save,
            "created version"
        );
        Ok(file)
    }

    fn switch(
        &mut self,
        file_id: &FileId,
        version_type: VersionType,
        version_id: &VersionId,
    ) -> Result<DiagramFile> {
        let mut file = self.store.get_file(file_id)?;
        if file.find_version(version_type, version_id).is_none() {
            return Err(VaultError::VersionNotFound {
                file_id: file_id.clone(),
                version_type,
                version_id: version_id.clone(),
            });
        }

        match version_type {
            VersionType::Simple => file.set_current_simple_version_id(version_id.clone()),
            VersionType::Professional => {
                file.set_current_professional_version_id(Some(version_id.clone()))
            }
        }
        file.touch(Utc::now());

        self.store.save_file(&file)?;
        debug!(file_id = %file_id, version_type = %version_type, version_id = %version_id, "switched version");
        Ok(file)
    }

    /// Drops the lowest-numbered versions other than `keep` until the track fits its cap.
    fn evict_overflow(&self, file: &mut DiagramFile, version_type: VersionType, keep: &VersionId) {
        let cap = self.cap(version_type);
        let file_id = file.id().clone();
        let versions = file.versions_mut(version_type);

        while versions.len() > cap {
            let Some(position) = versions
                .iter()
                .enumerate()
                .filter(|(_, version)| version.id() != keep)
                .min_by_key(|(_, version)| version.version_number())
                .map(|(position, _)| position)
            else {
                break;
            };

            let evicted = versions.remove(position);
            info!(
                file_id = %file_id,
                version_type = %version_type,
                version_number = evicted.version_number(),
                "evicted version over cap"
            );
        }
    }
}

fn latest(versions: &[DiagramVersion]) -> Option<&DiagramVersion> {
    versions.iter().max_by_key(|version| version.version_number())
}
