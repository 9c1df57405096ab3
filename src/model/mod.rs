// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Files hold two version tracks; simple versions carry canvas elements, and the shadow model
//! describes what those elements mean.

pub mod element;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod file;
pub mod geometry;
pub mod ids;
pub mod shadow;
pub mod version;

pub use element::{Binding, Element, ElementKind};
pub use file::{ChatMessage, ChatRole, DiagramFile, FileSummary, FileUpdate, ModuleType};
pub use geometry::Bounds;
pub use ids::{EdgeId, ElementId, FileId, Id, IdError, ModuleId, NodeId, VersionId};
pub use shadow::{
    EdgeType, FlowDirection, GridPosition, NodeType, ParseNodeTypeError, ShadowEdge,
    ShadowModule, ShadowNode, ShadowProject,
};
pub use version::{
    ColorScheme, DiagramVersion, EdgeOptions, EnhancementLevel, EnhancementOptions, NodeOptions,
    StructureOptions, StyleOptions, VersionPayload, VersionType,
};
