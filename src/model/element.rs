// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Visual elements as produced by the canvas.
//!
//! The canvas owns drawing and selection; this crate only needs identity, geometry, the
//! tombstone flag, bindings and the open `customData` bag. Every other field the canvas writes
//! (stroke colour, roughness, seed, ...) is kept verbatim in [`Element::extra`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geometry::Bounds;
use super::ids::ElementId;

/// `customData` key holding the shadow node an element renders.
pub const NODE_ID_KEY: &str = "shadowNodeId";
/// `customData` key holding the module of that node.
pub const MODULE_ID_KEY: &str = "shadowModuleId";
/// `customData` key holding the semantic node type (see [`crate::model::NodeType`]).
pub const NODE_TYPE_KEY: &str = "shadowNodeType";
/// `customData` key holding the shadow edge an arrow backs.
pub const EDGE_ID_KEY: &str = "shadowEdgeId";
pub const EDGE_TYPE_KEY: &str = "shadowEdgeType";
pub const EDGE_LABEL_KEY: &str = "shadowEdgeLabel";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Text,
    Arrow,
    Line,
    Freedraw,
    Image,
    Frame,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Text => "text",
            Self::Arrow => "arrow",
            Self::Line => "line",
            Self::Freedraw => "freedraw",
            Self::Image => "image",
            Self::Frame => "frame",
            Self::Other(tag) => tag,
        }
    }

    /// Shapes are the element kinds that can stand for a graph node.
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Rectangle | Self::Ellipse | Self::Diamond)
    }
}

impl From<String> for ElementKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "rectangle" => Self::Rectangle,
            "ellipse" => Self::Ellipse,
            "diamond" => Self::Diamond,
            "text" => Self::Text,
            "arrow" => Self::Arrow,
            "line" => Self::Line,
            "freedraw" => Self::Freedraw,
            "image" => Self::Image,
            "frame" => Self::Frame,
            _ => Self::Other(value),
        }
    }
}

impl From<ElementKind> for String {
    fn from(value: ElementKind) -> Self {
        match value {
            ElementKind::Other(tag) => tag,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arrow-to-shape binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub element_id: ElementId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Binding {
    pub fn to(element_id: ElementId) -> Self {
        Self {
            element_id,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_binding: Option<Binding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_binding: Option<Binding>,
    /// Arrow/line points relative to `(x, y)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind, bounds: Bounds) -> Self {
        Self {
            id,
            kind,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            version: 1,
            is_deleted: false,
            container_id: None,
            start_binding: None,
            end_binding: None,
            points: Vec::new(),
            text: None,
            custom_data: None,
            extra: Map::new(),
        }
    }

    pub fn text_label(id: ElementId, container_id: ElementId, text: impl Into<String>) -> Self {
        let mut element = Self::new(id, ElementKind::Text, Bounds::default());
        element.container_id = Some(container_id);
        element.text = Some(text.into());
        element
    }

    pub fn arrow(id: ElementId, start: ElementId, end: ElementId) -> Self {
        let mut element = Self::new(id, ElementKind::Arrow, Bounds::default());
        element.start_binding = Some(Binding::to(start));
        element.end_binding = Some(Binding::to(end));
        element.points = vec![[0.0, 0.0], [0.0, 0.0]];
        element
    }

    pub fn is_live(&self) -> bool {
        !self.is_deleted
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
    }

    pub fn bump_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    pub fn tombstone(&mut self) {
        if !self.is_deleted {
            self.is_deleted = true;
            self.bump_version();
        }
    }

    pub fn start_element_id(&self) -> Option<&ElementId> {
        self.start_binding.as_ref().map(|b| &b.element_id)
    }

    pub fn end_element_id(&self) -> Option<&ElementId> {
        self.end_binding.as_ref().map(|b| &b.element_id)
    }

    pub fn custom_str(&self, key: &str) -> Option<&str> {
        self.custom_data.as_ref()?.get(key)?.as_str()
    }

    pub fn set_custom(&mut self, key: &str, value: impl Into<Value>) {
        self.custom_data
            .get_or_insert_with(Map::new)
            .insert(key.to_owned(), value.into());
    }

    pub fn remove_custom(&mut self, key: &str) {
        if let Some(data) = self.custom_data.as_mut() {
            data.remove(key);
            if data.is_empty() {
                self.custom_data = None;
            }
        }
    }
}
