// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The currently open file.
//!
//! [`Workspace`] owns the element collection and mapping index of one open file and routes
//! every edit through the same path: optional layout, mapping upkeep, then a debounced autosave
//! (or an explicit save) through the shared version manager.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{LayoutOptions, VaultConfig};
use crate::error::{Result, VaultError};
use crate::format::MxGraphEnhancer;
use crate::layout::layout_diagram;
use crate::mapping::{default_module_id, derive_shadow_project, MappingIndex};
use crate::model::element::{MODULE_ID_KEY, NODE_ID_KEY};
use crate::model::{
    DiagramFile, DiagramVersion, Element, EnhancementOptions, FileId, ModuleId, NodeId,
    ShadowProject, VersionId,
};
use crate::ops::{self, ApplyResult, ShadowOp};
use crate::store::{FileStore, StorageBackend};
use crate::version::{Autosaver, FileVersionManager, SharedManager, SvgThumbnailRenderer};

#[derive(Debug)]
struct OpenFile {
    file_id: FileId,
    elements: Vec<Element>,
    mapping: MappingIndex,
}

pub struct Workspace<B> {
    manager: SharedManager<B>,
    autosaver: Autosaver<B>,
    layout: LayoutOptions,
    open: Option<OpenFile>,
}

impl<B> Workspace<B>
where
    B: StorageBackend + Send + 'static,
{
    pub fn new(manager: SharedManager<B>, config: &VaultConfig) -> Self {
        let autosaver = Autosaver::with_delay(Arc::clone(&manager), config.autosave_delay())
            .with_thumbnails(Arc::new(SvgThumbnailRenderer::default()));
        Self {
            manager,
            autosaver,
            layout: config.layout,
            open: None,
        }
    }

    /// Wires store, version manager and autosaver for `backend` from `config`.
    pub fn from_backend(backend: B, config: &VaultConfig) -> Self {
        let store = FileStore::from_config(backend, config);
        let manager = FileVersionManager::from_config(store, config);
        Self::new(Arc::new(Mutex::new(manager)), config)
    }

    pub fn manager(&self) -> &SharedManager<B> {
        &self.manager
    }

    pub fn layout_options(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn set_layout_options(&mut self, layout: LayoutOptions) {
        self.layout = layout;
    }

    pub fn file_id(&self) -> Option<&FileId> {
        self.open.as_ref().map(|open| &open.file_id)
    }

    /// Elements of the open file; empty when nothing is open.
    pub fn elements(&self) -> &[Element] {
        self.open
            .as_ref()
            .map(|open| open.elements.as_slice())
            .unwrap_or(&[])
    }

    pub fn mapping(&self) -> Option<&MappingIndex> {
        self.open.as_ref().map(|open| &open.mapping)
    }

    pub fn shadow_project(&self) -> ShadowProject {
        self.open
            .as_ref()
            .map(|open| derive_shadow_project(&open.elements, &open.mapping))
            .unwrap_or_default()
    }

    /// Opens `file_id` at its current simple version, closing any other open file first.
    pub async fn open_file(&mut self, file_id: &FileId) -> Result<DiagramFile> {
        self.close_file();

        let file = self.manager.lock().await.store_mut().open_file(file_id)?;
        self.load(&file);
        info!(file_id = %file_id, elements = self.elements().len(), "file opened");
        Ok(file)
    }

    /// Replaces the open file's elements and schedules an autosave.
    ///
    /// Must be called from within a tokio runtime.
    pub fn edit(&mut self, elements: Vec<Element>) -> Result<()> {
        let open = self.open.as_mut().ok_or(VaultError::NoFileOpen)?;
        open.elements = elements;
        sync_mapping(&mut open.mapping, &open.elements);
        self.schedule_autosave();
        Ok(())
    }

    /// Applies a batch of structured edits; on error nothing changes and nothing is scheduled.
    pub fn apply_ops(&mut self, ops: &[ShadowOp]) -> Result<ApplyResult> {
        let open = self.open.as_mut().ok_or(VaultError::NoFileOpen)?;
        let result = ops::apply_ops(&mut open.elements, &mut open.mapping, ops)?;
        debug!(
            file_id = %open.file_id,
            applied = result.applied,
            added = result.delta.added.len(),
            removed = result.delta.removed.len(),
            updated = result.delta.updated.len(),
            "ops applied"
        );
        if !result.delta.is_empty() {
            self.schedule_autosave();
        }
        Ok(result)
    }

    /// Re-lays out the open file with the workspace's layout options.
    pub fn auto_layout(&mut self) -> Result<()> {
        let open = self.open.as_mut().ok_or(VaultError::NoFileOpen)?;
        let laid_out = layout_diagram(&open.elements, &self.layout);
        if laid_out == open.elements {
            return Ok(());
        }
        open.elements = laid_out;
        self.schedule_autosave();
        Ok(())
    }

    /// Saves the open elements as an explicit simple version, replacing any pending autosave.
    pub async fn save_version(&mut self, note: Option<String>) -> Result<DiagramFile> {
        let open = self.open.as_ref().ok_or(VaultError::NoFileOpen)?;
        self.autosaver.cancel(&open.file_id);

        let elements = open.mapping.materialize_into_elements(&open.elements);
        let file = self
            .manager
            .lock()
            .await
            .create_simple_version(&open.file_id, elements.clone(), note)?;

        if let Some(open) = self.open.as_mut() {
            open.elements = elements;
        }
        Ok(file)
    }

    /// Writes a pending autosave right away. Returns whether a version was created.
    pub async fn flush(&mut self) -> Result<bool> {
        let open = self.open.as_ref().ok_or(VaultError::NoFileOpen)?;
        self.autosaver.cancel(&open.file_id);

        let elements = open.mapping.materialize_into_elements(&open.elements);
        let mut manager = self.manager.lock().await;
        if !manager.needs_save(&open.file_id, &elements)? {
            return Ok(false);
        }
        manager.autosave_simple_version(&open.file_id, elements)?;
        Ok(true)
    }

    /// Flushes pending edits, then renders a professional version with the built-in enhancer.
    pub async fn generate_professional_version(
        &mut self,
        options: EnhancementOptions,
        note: Option<String>,
    ) -> Result<DiagramFile> {
        self.flush().await?;
        let file_id = self.file_id().cloned().ok_or(VaultError::NoFileOpen)?;
        self.manager.lock().await.generate_professional_version(
            &file_id,
            options,
            &MxGraphEnhancer,
            note,
        )
    }

    /// Makes `version_id` the current simple version and reloads the open elements from it.
    ///
    /// Unsaved edits are dropped.
    pub async fn switch_simple_version(&mut self, version_id: &VersionId) -> Result<DiagramFile> {
        let file_id = self.file_id().cloned().ok_or(VaultError::NoFileOpen)?;
        self.autosaver.cancel(&file_id);
        let file = self
            .manager
            .lock()
            .await
            .switch_simple_version(&file_id, version_id)?;
        self.load(&file);
        Ok(file)
    }

    /// Closes the open file: pending autosaves are cancelled and the mapping is cleared.
    pub fn close_file(&mut self) -> Option<FileId> {
        let mut open = self.open.take()?;
        self.autosaver.cancel(&open.file_id);
        open.mapping.clear();
        info!(file_id = %open.file_id, "file closed");
        Some(open.file_id)
    }

    pub fn has_pending_autosave(&self) -> bool {
        self.file_id()
            .is_some_and(|file_id| self.autosaver.is_pending(file_id))
    }

    fn load(&mut self, file: &DiagramFile) {
        let elements = file
            .current_simple_version()
            .and_then(DiagramVersion::elements)
            .map(<[Element]>::to_vec)
            .unwrap_or_default();
        let mut mapping = MappingIndex::new();
        mapping.restore_from_elements(&elements);
        self.open = Some(OpenFile {
            file_id: file.id().clone(),
            elements,
            mapping,
        });
    }

    fn schedule_autosave(&mut self) {
        let Some(open) = self.open.as_ref() else {
            return;
        };
        let elements = open.mapping.materialize_into_elements(&open.elements);
        self.autosaver.schedule(open.file_id.clone(), elements);
    }
}

/// Brings `mapping` in line with an element collection replaced by the canvas.
///
/// Entries for elements that vanished or were tombstoned are dropped; stamped elements the index
/// does not know yet are added. Existing entries win over stale stamps.
fn sync_mapping(mapping: &mut MappingIndex, elements: &[Element]) {
    let live = elements
        .iter()
        .filter(|element| element.is_live())
        .map(|element| &element.id)
        .collect::<BTreeSet<_>>();
    let gone = mapping
        .mappings()
        .filter(|entry| !live.contains(&entry.element_id))
        .map(|entry| entry.element_id)
        .collect::<Vec<_>>();
    for element_id in &gone {
        mapping.unmap(element_id);
    }

    for element in elements.iter().filter(|element| element.is_live()) {
        if mapping.lookup_node(&element.id).is_some() {
            continue;
        }
        let Some(node_id) = element
            .custom_str(NODE_ID_KEY)
            .and_then(|raw| NodeId::new(raw).ok())
        else {
            continue;
        };
        let module_id = element
            .custom_str(MODULE_ID_KEY)
            .and_then(|raw| ModuleId::new(raw).ok())
            .unwrap_or_else(default_module_id);
        mapping.map(element.id.clone(), node_id, module_id);
    }
}

#[cfg(test)]
mod tests;
