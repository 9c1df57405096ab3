// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! File and diagram import/export.
//!
//! [`json`] moves whole files and bare element scenes across the collaborator boundary;
//! [`mxgraph`] renders a shadow project as structured-diagram XML.

pub mod json;
pub mod mxgraph;

pub use json::{export_elements, export_file, import_elements, import_file};
pub use mxgraph::{export_mxgraph, export_mxgraph_titled, MxGraphEnhancer};

/// Escapes text for use in XML attribute values and character data.
pub(crate) fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#xa;"),
            _ => out.push(ch),
        }
    }
    out
}
