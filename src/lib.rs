// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Vellum: versioned diagram files with a shadow semantic model.
//!
//! A diagram file keeps two independent version tracks: *simple* versions hold the free-form
//! element collection drawn on a canvas, *professional* versions hold rendered XML derived from a
//! simple version. Canvas elements are linked to logical nodes through a [`mapping::MappingIndex`]
//! whose entries are stamped into each element's custom data, so the semantic graph survives a
//! save/load round trip. [`layout`] arranges the graph in layered ranks.
//!
//! [`session::Workspace`] ties the pieces together for one open file.

pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod mapping;
pub mod model;
pub mod ops;
pub mod session;
pub mod store;
pub mod version;

pub use config::{LayoutOptions, VaultConfig};
pub use error::{Result, VaultError};
pub use session::Workspace;
