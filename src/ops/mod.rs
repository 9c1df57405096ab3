// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured edit operations on the shadow model.
//!
//! Ops name nodes and edges; applying them rewrites the underlying elements and the mapping
//! index together. A batch is all-or-nothing and produces a minimal delta that callers can use
//! to refresh derived state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LayoutOptions;
use crate::mapping::{arrow_edge_id, default_module_id, MappingIndex};
use crate::model::element::{
    EDGE_ID_KEY, EDGE_LABEL_KEY, EDGE_TYPE_KEY, MODULE_ID_KEY, NODE_ID_KEY, NODE_TYPE_KEY,
};
use crate::model::{
    Binding, Bounds, EdgeId, EdgeType, Element, ElementId, ElementKind, ModuleId, NodeId,
    NodeType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ShadowOp {
    #[serde(rename_all = "camelCase")]
    AddNode {
        node_id: NodeId,
        #[serde(default)]
        module_id: Option<ModuleId>,
        #[serde(default)]
        node_type: NodeType,
        label: String,
        #[serde(default)]
        bounds: Option<Bounds>,
        #[serde(default)]
        properties: BTreeMap<String, Value>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateNode {
        node_id: NodeId,
        #[serde(default)]
        patch: NodePatch,
    },
    #[serde(rename_all = "camelCase")]
    RemoveNode { node_id: NodeId },
    #[serde(rename_all = "camelCase")]
    AddEdge {
        edge_id: EdgeId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        #[serde(default)]
        edge_type: EdgeType,
        #[serde(default)]
        label: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateEdge {
        edge_id: EdgeId,
        #[serde(default)]
        patch: EdgePatch,
    },
    #[serde(rename_all = "camelCase")]
    RemoveEdge { edge_id: EdgeId },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    pub label: Option<String>,
    pub node_type: Option<NodeType>,
    pub bounds: Option<Bounds>,
    /// Replaces every non-shadow `customData` entry of the node's body.
    pub properties: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgePatch {
    /// `Some(None)` (JSON `null`) clears the label; a missing key leaves it alone.
    #[serde(deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub label: Option<Option<String>>,
    pub edge_type: Option<EdgeType>,
    pub source_node_id: Option<NodeId>,
    pub target_node_id: Option<NodeId>,
}

fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum ShadowRef {
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which shadow objects changed as the result of applying ops.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Delta {
    pub added: Vec<ShadowRef>,
    pub removed: Vec<ShadowRef>,
    pub updated: Vec<ShadowRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<ShadowRef>,
    removed: BTreeSet<ShadowRef>,
    updated: BTreeSet<ShadowRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, shadow_ref: ShadowRef) {
        self.removed.remove(&shadow_ref);
        self.updated.remove(&shadow_ref);
        self.added.insert(shadow_ref);
    }

    fn record_removed(&mut self, shadow_ref: ShadowRef) {
        // Added then removed in one batch leaves no trace.
        if self.added.remove(&shadow_ref) {
            return;
        }
        self.updated.remove(&shadow_ref);
        self.removed.insert(shadow_ref);
    }

    fn record_updated(&mut self, shadow_ref: ShadowRef) {
        if self.added.contains(&shadow_ref) || self.removed.contains(&shadow_ref) {
            return;
        }
        self.updated.insert(shadow_ref);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Node,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    AlreadyExists { kind: ObjectKind, object_id: String },
    NotFound { kind: ObjectKind, object_id: String },
    MissingNode { node_id: NodeId },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists { kind, object_id } => {
                write!(f, "object already exists ({kind:?}, id={object_id})")
            }
            Self::NotFound { kind, object_id } => {
                write!(f, "object not found ({kind:?}, id={object_id})")
            }
            Self::MissingNode { node_id } => write!(f, "edge endpoint node not found (id={node_id})"),
        }
    }
}

impl std::error::Error for ApplyError {}

/// Applies `ops` in order to `elements` and `mapping`.
///
/// Both are only written when every op succeeded.
pub fn apply_ops(
    elements: &mut Vec<Element>,
    mapping: &mut MappingIndex,
    ops: &[ShadowOp],
) -> Result<ApplyResult, ApplyError> {
    if ops.is_empty() {
        return Ok(ApplyResult {
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut scene = Scene {
        elements: elements.clone(),
        mapping: mapping.clone(),
    };
    let mut delta = DeltaBuilder::default();

    for op in ops {
        scene.apply(op, &mut delta)?;
    }

    *elements = scene.elements;
    *mapping = scene.mapping;

    Ok(ApplyResult {
        applied: ops.len(),
        delta: delta.finish(),
    })
}

// Per-op implementation on the working copy.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
