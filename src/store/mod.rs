// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for diagram files.
//!
//! A [`StorageBackend`] stores whole file documents plus the recency list; [`FileStore`] layers
//! CRUD, the file cap and recency bookkeeping on top of it.

pub mod backend;
pub mod file_store;
pub mod folder;

pub use backend::{MemoryBackend, StorageBackend, StoreError};
pub use file_store::FileStore;
pub use folder::{FolderBackend, WriteDurability};
