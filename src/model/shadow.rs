// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The shadow model: a semantic graph layered above raw visual elements.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::geometry::Bounds;
use super::ids::{EdgeId, ElementId, ModuleId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Process,
    Decision,
    Start,
    End,
    Data,
    Entity,
    Actor,
    Component,
    Container,
    Annotation,
    #[default]
    Generic,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Decision => "decision",
            Self::Start => "start",
            Self::End => "end",
            Self::Data => "data",
            Self::Entity => "entity",
            Self::Actor => "actor",
            Self::Component => "component",
            Self::Container => "container",
            Self::Annotation => "annotation",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeTypeError;

impl fmt::Display for ParseNodeTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid node type")
    }
}

impl std::error::Error for ParseNodeTypeError {}

impl FromStr for NodeType {
    type Err = ParseNodeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "decision" => Ok(Self::Decision),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "data" => Ok(Self::Data),
            "entity" => Ok(Self::Entity),
            "actor" => Ok(Self::Actor),
            "component" => Ok(Self::Component),
            "container" => Ok(Self::Container),
            "annotation" => Ok(Self::Annotation),
            "generic" => Ok(Self::Generic),
            _ => Err(ParseNodeTypeError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    #[default]
    Flow,
    Dependency,
    Association,
    Message,
    Generic,
}

impl EdgeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Dependency => "dependency",
            Self::Association => "association",
            Self::Message => "message",
            Self::Generic => "generic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flow" => Some(Self::Flow),
            "dependency" => Some(Self::Dependency),
            "association" => Some(Self::Association),
            "message" => Some(Self::Message),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

/// Layout flow direction, shared by modules and the auto-layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowDirection {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "BT")]
    BottomToTop,
    #[serde(rename = "RL")]
    RightToLeft,
}

impl FlowDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopToBottom => "TB",
            Self::LeftToRight => "LR",
            Self::BottomToTop => "BT",
            Self::RightToLeft => "RL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TB" | "TD" => Some(Self::TopToBottom),
            "LR" => Some(Self::LeftToRight),
            "BT" => Some(Self::BottomToTop),
            "RL" => Some(Self::RightToLeft),
            _ => None,
        }
    }

    /// Ranks advance along the y axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::TopToBottom | Self::BottomToTop)
    }

    /// Ranks advance towards decreasing coordinates.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::BottomToTop | Self::RightToLeft)
    }
}

/// Logical grid cell, independent of pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    pub grid: GridPosition,
    pub bounds: Bounds,
    /// Elements rendering this node; the first shape element is the node's body.
    pub element_ids: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowEdge {
    pub id: EdgeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default)]
    pub label: Option<String>,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub element_id: ElementId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowModule {
    pub id: ModuleId,
    pub name: String,
    pub node_ids: Vec<NodeId>,
    pub edge_ids: Vec<EdgeId>,
    pub direction: FlowDirection,
    pub bounds: Bounds,
}

/// The whole semantic graph for one version's element collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShadowProject {
    nodes: BTreeMap<NodeId, ShadowNode>,
    edges: BTreeMap<EdgeId, ShadowEdge>,
    modules: BTreeMap<ModuleId, ShadowModule>,
}

impl ShadowProject {
    pub fn nodes(&self) -> &BTreeMap<NodeId, ShadowNode> {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut BTreeMap<NodeId, ShadowNode> {
        &mut self.nodes
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, ShadowEdge> {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut BTreeMap<EdgeId, ShadowEdge> {
        &mut self.edges
    }

    pub fn modules(&self) -> &BTreeMap<ModuleId, ShadowModule> {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut BTreeMap<ModuleId, ShadowModule> {
        &mut self.modules
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&ShadowNode> {
        self.nodes.get(node_id)
    }

    pub fn is_orphaned(&self, edge: &ShadowEdge) -> bool {
        !self.nodes.contains_key(&edge.source_node_id)
            || !self.nodes.contains_key(&edge.target_node_id)
    }

    /// Edges whose endpoints both resolve to live nodes.
    pub fn live_edges(&self) -> impl Iterator<Item = &ShadowEdge> {
        self.edges.values().filter(|edge| !self.is_orphaned(edge))
    }

    pub fn orphaned_edges(&self) -> impl Iterator<Item = &ShadowEdge> {
        self.edges.values().filter(|edge| self.is_orphaned(edge))
    }

    pub fn outgoing(&self, node_id: &NodeId) -> impl Iterator<Item = &ShadowEdge> {
        let node_id = node_id.clone();
        self.live_edges()
            .filter(move |edge| edge.source_node_id == node_id)
    }

    pub fn incoming(&self, node_id: &NodeId) -> impl Iterator<Item = &ShadowEdge> {
        let node_id = node_id.clone();
        self.live_edges()
            .filter(move |edge| edge.target_node_id == node_id)
    }

    pub fn module_of(&self, node_id: &NodeId) -> Option<&ShadowModule> {
        self.modules
            .values()
            .find(|module| module.node_ids.contains(node_id))
    }
}
