// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Auto-layout for element collections.
//!
//! [`layered`] ranks and orders an abstract graph; [`auto_layout`] extracts that graph from
//! canvas elements and writes the resulting geometry back.

pub mod auto_layout;
pub mod layered;

pub use auto_layout::{
    apply_layout, compute_layout, layout_diagram, DiagramLayout, NodePlacement, RoutedEdge,
};
pub use layered::{layer_graph, LayerNode, Layering};
