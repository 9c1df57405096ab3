// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! mxGraph XML export of a shadow project.
//!
//! This is the structured-diagram payload stored on professional versions. Enhancement options
//! only change presentation (styles, labels, decorations); the node and edge set is always
//! exactly the project's live graph.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;

use super::escape_xml;
use crate::mapping::{default_module_id, derive_shadow_project, MappingIndex};
use crate::model::{
    Bounds, ColorScheme, DiagramFile, EdgeId, EdgeType, Element, EnhancementLevel,
    EnhancementOptions, ModuleId, NodeId, NodeType, ShadowEdge, ShadowNode, ShadowProject,
};
use crate::version::Enhancer;

pub const DEFAULT_TITLE: &str = "Diagram";

const LANE_PADDING: f64 = 20.0;
const LANE_HEADER: f64 = 30.0;
const TITLE_HEIGHT: f64 = 40.0;
const TITLE_GAP: f64 = 20.0;
const LEGEND_GAP: f64 = 40.0;
const LEGEND_WIDTH: f64 = 140.0;
const LEGEND_ROW: f64 = 30.0;

pub fn export_mxgraph(project: &ShadowProject, options: &EnhancementOptions) -> String {
    export_mxgraph_titled(project, options, DEFAULT_TITLE)
}

pub fn export_mxgraph_titled(
    project: &ShadowProject,
    options: &EnhancementOptions,
    title: &str,
) -> String {
    let nodes = ordered_nodes(project);
    let order = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (&node.id, index))
        .collect::<BTreeMap<_, _>>();
    let edges = ordered_edges(project, &order);
    let edge_labels = edge_labels(project, &edges, options);

    let lanes = if options.structure.add_swimlanes {
        lane_bounds(project)
    } else {
        BTreeMap::new()
    };

    let mut out = String::new();
    let _ = writeln!(out, r#"<mxfile host="vellum">"#);
    let _ = writeln!(
        out,
        r#"  <diagram id="vellum" name="{}">"#,
        escape_xml(title)
    );
    out.push_str(
        "    <mxGraphModel grid=\"1\" gridSize=\"10\" guides=\"1\" arrows=\"1\" connect=\"1\" page=\"0\">\n",
    );
    out.push_str("      <root>\n");
    out.push_str("        <mxCell id=\"0\"/>\n");
    out.push_str("        <mxCell id=\"1\" parent=\"0\"/>\n");

    for (module_id, bounds) in &lanes {
        push_vertex(
            &mut out,
            &lane_cell_id(module_id),
            module_id.as_str(),
            "swimlane;horizontal=0;startSize=30;html=1;fillColor=none;",
            "1",
            *bounds,
        );
    }

    for node in &nodes {
        let lane = project
            .module_of(&node.id)
            .and_then(|module| lanes.get_key_value(&module.id));
        let (parent, geometry) = match lane {
            Some((module_id, lane)) => (
                lane_cell_id(module_id),
                Bounds::new(
                    node.bounds.x - lane.x,
                    node.bounds.y - lane.y,
                    node.bounds.width,
                    node.bounds.height,
                ),
            ),
            None => ("1".to_owned(), node.bounds),
        };
        push_vertex(
            &mut out,
            &node_cell_id(&node.id),
            &node_value(node, options),
            &node_style(node.node_type, options),
            &parent,
            geometry,
        );
    }

    for edge in &edges {
        let value = edge_labels
            .get(&edge.id)
            .map(String::as_str)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            r#"        <mxCell id="edge-{}" value="{}" style="{}" edge="1" parent="1" source="{}" target="{}">"#,
            escape_xml(edge.id.as_str()),
            escape_xml(value),
            edge_style(edge.edge_type),
            escape_xml(&node_cell_id(&edge.source_node_id)),
            escape_xml(&node_cell_id(&edge.target_node_id)),
        );
        out.push_str("          <mxGeometry relative=\"1\" as=\"geometry\"/>\n");
        out.push_str("        </mxCell>\n");
    }

    let extent = Bounds::enclosing(
        nodes
            .iter()
            .map(|node| node.bounds)
            .chain(lanes.values().copied())
            .collect::<Vec<_>>()
            .iter(),
    )
    .unwrap_or_default();

    if options.style.add_title {
        push_vertex(
            &mut out,
            "title",
            title,
            "text;html=1;align=center;verticalAlign=middle;fontSize=20;fontStyle=1;",
            "1",
            Bounds::new(
                extent.x,
                extent.y - TITLE_HEIGHT - TITLE_GAP,
                extent.width.max(200.0),
                TITLE_HEIGHT,
            ),
        );
    }

    if options.style.add_legend {
        push_legend(&mut out, &nodes, options, &extent);
    }

    out.push_str("      </root>\n");
    out.push_str("    </mxGraphModel>\n");
    out.push_str("  </diagram>\n");
    out.push_str("</mxfile>\n");
    out
}

/// Built-in [`Enhancer`]: derives the shadow project of the elements and exports it.
///
/// Scenes without mapping metadata are enhanced as if every live shape were its own node.
#[derive(Debug, Clone, Copy, Default)]
pub struct MxGraphEnhancer;

impl Enhancer for MxGraphEnhancer {
    fn enhance(
        &self,
        file: &DiagramFile,
        elements: &[Element],
        options: &EnhancementOptions,
    ) -> Result<String, String> {
        let mapping = mapping_for(elements);
        let project = derive_shadow_project(elements, &mapping);
        if project.nodes().is_empty() {
            return Err(format!("file {} has no shapes to enhance", file.id()));
        }
        Ok(export_mxgraph_titled(&project, options, file.name()))
    }
}

fn mapping_for(elements: &[Element]) -> MappingIndex {
    let mut mapping = MappingIndex::new();
    if mapping.restore_from_elements(elements) > 0 {
        return mapping;
    }
    for element in elements
        .iter()
        .filter(|element| element.is_live() && element.kind.is_shape())
    {
        if let Ok(node_id) = NodeId::new(element.id.as_str()) {
            mapping.map(element.id.clone(), node_id, default_module_id());
        }
    }
    mapping
}

fn ordered_nodes(project: &ShadowProject) -> Vec<&ShadowNode> {
    let mut nodes = project.nodes().values().collect::<Vec<_>>();
    nodes.sort_by(|a, b| a.grid.cmp(&b.grid).then_with(|| a.id.cmp(&b.id)));
    nodes
}

fn ordered_edges<'a>(
    project: &'a ShadowProject,
    order: &BTreeMap<&NodeId, usize>,
) -> Vec<&'a ShadowEdge> {
    let mut edges = project.live_edges().collect::<Vec<_>>();
    let rank = |node_id: &NodeId| order.get(node_id).copied().unwrap_or(usize::MAX);
    edges.sort_by(|a, b| {
        rank(&a.source_node_id)
            .cmp(&rank(&b.source_node_id))
            .then_with(|| rank(&a.target_node_id).cmp(&rank(&b.target_node_id)))
            .then_with(|| a.id.cmp(&b.id))
    });
    edges
}

fn edge_labels<'a>(
    project: &ShadowProject,
    edges: &[&'a ShadowEdge],
    options: &EnhancementOptions,
) -> BTreeMap<&'a EdgeId, String> {
    let mut labels = BTreeMap::new();
    let mut branch_counts = BTreeMap::<&NodeId, usize>::new();

    for (index, &edge) in edges.iter().enumerate() {
        let mut label = edge.label.clone().unwrap_or_default();

        let from_decision = project
            .node(&edge.source_node_id)
            .is_some_and(|node| node.node_type == NodeType::Decision);
        if options.edges.add_condition_labels && from_decision {
            let branch = branch_counts.entry(&edge.source_node_id).or_default();
            *branch += 1;
            if label.is_empty() {
                label = match *branch {
                    1 => "Yes".to_owned(),
                    2 => "No".to_owned(),
                    n => format!("Option {n}"),
                };
            }
        }

        if options.edges.add_sequence_numbers {
            label = if label.is_empty() {
                format!("{}", index + 1)
            } else {
                format!("{}. {label}", index + 1)
            };
        }

        if !label.is_empty() {
            labels.insert(&edge.id, label);
        }
    }
    labels
}

/// Module bounds grown by the lane padding and header.
fn lane_bounds(project: &ShadowProject) -> BTreeMap<ModuleId, Bounds> {
    project
        .modules()
        .values()
        .filter(|module| !module.node_ids.is_empty())
        .map(|module| {
            let b = module.bounds;
            (
                module.id.clone(),
                Bounds::new(
                    b.x - LANE_PADDING - LANE_HEADER,
                    b.y - LANE_PADDING,
                    b.width + 2.0 * LANE_PADDING + LANE_HEADER,
                    b.height + 2.0 * LANE_PADDING,
                ),
            )
        })
        .collect()
}

fn node_value(node: &ShadowNode, options: &EnhancementOptions) -> String {
    let mut value = node.label.clone();
    if options.nodes.add_details && options.level != EnhancementLevel::Basic {
        for (key, property) in &node.properties {
            let rendered = match property {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            if !value.is_empty() {
                value.push('\n');
            }
            let _ = write!(value, "{key}: {rendered}");
        }
    }
    value
}

fn node_style(node_type: NodeType, options: &EnhancementOptions) -> String {
    let shape = if options.nodes.use_professional_symbols {
        match node_type {
            NodeType::Decision => "rhombus;",
            NodeType::Start | NodeType::End => "shape=mxgraph.flowchart.terminator;",
            NodeType::Data => "shape=parallelogram;perimeter=parallelogramPerimeter;",
            NodeType::Entity => "shape=cylinder3;",
            NodeType::Actor => "shape=umlActor;verticalLabelPosition=bottom;",
            NodeType::Component => "shape=component;",
            NodeType::Container => "swimlane;",
            NodeType::Annotation => "shape=note;",
            NodeType::Process | NodeType::Generic => "rounded=1;",
        }
    } else {
        match node_type {
            NodeType::Decision => "rhombus;",
            NodeType::Start | NodeType::End => "ellipse;",
            _ => "rounded=0;",
        }
    };

    let (fill, stroke, font) = palette(options.style.color_scheme, node_type);
    let mut style = format!(
        "{shape}whiteSpace=wrap;html=1;fillColor={fill};strokeColor={stroke};fontColor={font};"
    );
    if options.level == EnhancementLevel::Advanced {
        style.push_str("shadow=1;");
    }
    style
}

fn edge_style(edge_type: EdgeType) -> &'static str {
    match edge_type {
        EdgeType::Flow | EdgeType::Generic => {
            "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;endArrow=block;"
        }
        EdgeType::Dependency => "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;dashed=1;endArrow=open;",
        EdgeType::Association => "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;endArrow=none;",
        EdgeType::Message => "edgeStyle=orthogonalEdgeStyle;rounded=0;html=1;dashed=1;endArrow=block;",
    }
}

/// `(fill, stroke, font)` colours of a node type.
fn palette(scheme: ColorScheme, node_type: NodeType) -> (&'static str, &'static str, &'static str) {
    match scheme {
        ColorScheme::Minimal => ("#ffffff", "#000000", "#000000"),
        ColorScheme::Professional => match node_type {
            NodeType::Process => ("#dae8fc", "#6c8ebf", "#000000"),
            NodeType::Decision => ("#fff2cc", "#d6b656", "#000000"),
            NodeType::Start => ("#d5e8d4", "#82b366", "#000000"),
            NodeType::End => ("#f8cecc", "#b85450", "#000000"),
            NodeType::Data | NodeType::Entity => ("#e1d5e7", "#9673a6", "#000000"),
            _ => ("#f5f5f5", "#666666", "#333333"),
        },
        ColorScheme::Modern => match node_type {
            NodeType::Process => ("#3b82f6", "#1d4ed8", "#ffffff"),
            NodeType::Decision => ("#f59e0b", "#b45309", "#ffffff"),
            NodeType::Start => ("#10b981", "#047857", "#ffffff"),
            NodeType::End => ("#ef4444", "#b91c1c", "#ffffff"),
            NodeType::Data | NodeType::Entity => ("#8b5cf6", "#6d28d9", "#ffffff"),
            _ => ("#64748b", "#334155", "#ffffff"),
        },
    }
}

fn push_legend(
    out: &mut String,
    nodes: &[&ShadowNode],
    options: &EnhancementOptions,
    extent: &Bounds,
) {
    let mut types = nodes.iter().map(|node| node.node_type).collect::<Vec<_>>();
    types.sort_by_key(|node_type| node_type.as_str());
    types.dedup();

    let x = extent.right() + LEGEND_GAP;
    let height = LEGEND_ROW * (types.len() + 1) as f64;
    push_vertex(
        out,
        "legend",
        "Legend",
        "swimlane;startSize=30;html=1;fillColor=none;",
        "1",
        Bounds::new(x, extent.y, LEGEND_WIDTH, height),
    );
    for (row, node_type) in types.iter().enumerate() {
        let (fill, stroke, font) = palette(options.style.color_scheme, *node_type);
        push_vertex(
            out,
            &format!("legend-{}", node_type.as_str()),
            node_type.as_str(),
            &format!("rounded=0;html=1;fillColor={fill};strokeColor={stroke};fontColor={font};"),
            "legend",
            Bounds::new(10.0, LEGEND_ROW * (row + 1) as f64, LEGEND_WIDTH - 20.0, LEGEND_ROW - 6.0),
        );
    }
}

fn push_vertex(out: &mut String, id: &str, value: &str, style: &str, parent: &str, at: Bounds) {
    let _ = writeln!(
        out,
        r#"        <mxCell id="{}" value="{}" style="{}" vertex="1" parent="{}">"#,
        escape_xml(id),
        escape_xml(value),
        style,
        escape_xml(parent),
    );
    let _ = writeln!(
        out,
        r#"          <mxGeometry x="{}" y="{}" width="{}" height="{}" as="geometry"/>"#,
        at.x, at.y, at.width, at.height
    );
    out.push_str("        </mxCell>\n");
}

fn node_cell_id(node_id: &NodeId) -> String {
    format!("node-{node_id}")
}

fn lane_cell_id(module_id: &ModuleId) -> String {
    format!("lane-{module_id}")
}
