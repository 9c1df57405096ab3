// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Version creation, track management and autosave.

pub mod autosave;
pub mod factory;
pub mod manager;
pub mod thumbnail;

pub use autosave::{Autosaver, SharedManager};
pub use factory::{create_new_file, create_version, NewFileParams, NewVersionParams};
pub use manager::{Enhancer, FileVersionManager, VersionInfo, VersionStats};
pub use thumbnail::{SvgThumbnailRenderer, ThumbnailError, ThumbnailRenderer};
