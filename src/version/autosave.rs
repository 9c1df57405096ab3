// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Debounced autosave.
//!
//! Each file has at most one pending save. Scheduling again replaces it, so only the latest
//! element collection inside the debounce window is written. Thumbnails are rendered in a
//! separate task after the save lands.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::manager::FileVersionManager;
use super::thumbnail::ThumbnailRenderer;
use crate::config::AUTOSAVE_DELAY_MS;
use crate::model::{Element, FileId, FileUpdate};
use crate::store::StorageBackend;

pub type SharedManager<B> = Arc<Mutex<FileVersionManager<B>>>;

pub struct Autosaver<B> {
    manager: SharedManager<B>,
    delay: Duration,
    thumbnails: Option<Arc<dyn ThumbnailRenderer>>,
    pending: HashMap<FileId, JoinHandle<()>>,
}

impl<B> Autosaver<B>
where
    B: StorageBackend + Send + 'static,
{
    pub fn new(manager: SharedManager<B>) -> Self {
        Self::with_delay(manager, Duration::from_millis(AUTOSAVE_DELAY_MS))
    }

    pub fn with_delay(manager: SharedManager<B>, delay: Duration) -> Self {
        Self {
            manager,
            delay,
            thumbnails: None,
            pending: HashMap::new(),
        }
    }

    pub fn with_thumbnails(mut self, renderer: Arc<dyn ThumbnailRenderer>) -> Self {
        self.thumbnails = Some(renderer);
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn manager(&self) -> &SharedManager<B> {
        &self.manager
    }

    /// (Re)starts the debounce timer for `file_id` with the latest `elements`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, file_id: FileId, elements: Vec<Element>) {
        if let Some(previous) = self.pending.remove(&file_id) {
            previous.abort();
            debug!(file_id = %file_id, "autosave rescheduled");
        }

        let manager = Arc::clone(&self.manager);
        let thumbnails = self.thumbnails.clone();
        let delay = self.delay;
        let task_file_id = file_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            run_autosave(manager, thumbnails, task_file_id, elements).await;
        });

        self.pending.insert(file_id, handle);
    }

    /// Drops the pending save for `file_id`. Returns whether one was still waiting.
    pub fn cancel(&mut self, file_id: &FileId) -> bool {
        let Some(handle) = self.pending.remove(file_id) else {
            return false;
        };
        let was_waiting = !handle.is_finished();
        handle.abort();
        if was_waiting {
            debug!(file_id = %file_id, "autosave cancelled");
        }
        was_waiting
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }

    pub fn is_pending(&self, file_id: &FileId) -> bool {
        self.pending
            .get(file_id)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<B> Drop for Autosaver<B> {
    fn drop(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }
}

async fn run_autosave<B>(
    manager: SharedManager<B>,
    thumbnails: Option<Arc<dyn ThumbnailRenderer>>,
    file_id: FileId,
    elements: Vec<Element>,
) where
    B: StorageBackend + Send + 'static,
{
    {
        let mut manager = manager.lock().await;
        match manager.needs_save(&file_id, &elements) {
            Ok(true) => {}
            Ok(false) => {
                debug!(file_id = %file_id, "autosave skipped, nothing changed");
                return;
            }
            Err(err) => {
                warn!(file_id = %file_id, error = %err, "autosave skipped");
                return;
            }
        }

        if let Err(err) = manager.autosave_simple_version(&file_id, elements.clone()) {
            warn!(file_id = %file_id, error = %err, "autosave failed");
            return;
        }
    }

    let Some(renderer) = thumbnails else {
        return;
    };
    tokio::spawn(async move {
        let thumbnail = match renderer.render(&elements) {
            Ok(thumbnail) => thumbnail,
            Err(err) => {
                warn!(file_id = %file_id, error = %err, "thumbnail generation failed");
                return;
            }
        };

        let update = FileUpdate {
            thumbnail: Some(Some(thumbnail)),
            ..FileUpdate::default()
        };
        if let Err(err) = manager.lock().await.store_mut().update_file(&file_id, update) {
            warn!(file_id = %file_id, error = %err, "thumbnail could not be stored");
        }
    });
}
