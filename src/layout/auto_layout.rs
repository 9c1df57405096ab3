// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Auto-layout over a raw element collection.
//!
//! Nodes are live shapes; edges are live arrows bound to two distinct nodes. Everything else
//! (tombstones, unbound arrows, free text, images) passes through untouched.

use std::collections::BTreeMap;

use tracing::debug;

use super::layered::{layer_graph, LayerNode};
use crate::config::LayoutOptions;
use crate::model::{Bounds, Element, ElementId, ElementKind, FlowDirection};

#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    pub rank: usize,
    pub order: usize,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub element_id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagramLayout {
    nodes: BTreeMap<ElementId, NodePlacement>,
    edges: Vec<RoutedEdge>,
    layers: Vec<Vec<ElementId>>,
    crossings: usize,
}

impl DiagramLayout {
    pub fn nodes(&self) -> &BTreeMap<ElementId, NodePlacement> {
        &self.nodes
    }

    pub fn node(&self, element_id: &ElementId) -> Option<&NodePlacement> {
        self.nodes.get(element_id)
    }

    pub fn edges(&self) -> &[RoutedEdge] {
        &self.edges
    }

    pub fn layers(&self) -> &[Vec<ElementId>] {
        &self.layers
    }

    pub fn crossings(&self) -> usize {
        self.crossings
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Main/cross axis view of a size or point for one flow direction.
#[derive(Debug, Clone, Copy)]
struct Axes {
    vertical: bool,
}

impl Axes {
    fn main(self, width: f64, height: f64) -> f64 {
        if self.vertical {
            height
        } else {
            width
        }
    }

    fn cross(self, width: f64, height: f64) -> f64 {
        if self.vertical {
            width
        } else {
            height
        }
    }

    /// Turns (main, cross) back into (x, y).
    fn to_xy(self, main: f64, cross: f64) -> (f64, f64) {
        if self.vertical {
            (cross, main)
        } else {
            (main, cross)
        }
    }
}

/// Computes node placements and arrow endpoints without touching `elements`.
pub fn compute_layout(elements: &[Element], options: &LayoutOptions) -> DiagramLayout {
    let axes = Axes {
        vertical: options.direction.is_vertical(),
    };

    let node_elements = elements
        .iter()
        .filter(|element| element.is_live() && element.kind.is_shape())
        .collect::<Vec<_>>();
    if node_elements.is_empty() {
        return DiagramLayout::default();
    }

    let sizes = node_elements
        .iter()
        .map(|element| {
            let width = if element.width > 0.0 {
                element.width
            } else {
                options.node_width
            };
            let height = if element.height > 0.0 {
                element.height
            } else {
                options.node_height
            };
            (element.id.clone(), (width, height))
        })
        .collect::<BTreeMap<_, _>>();

    let layer_nodes = node_elements
        .iter()
        .map(|element| {
            let bounds = element.bounds();
            LayerNode {
                id: element.id.clone(),
                hint: if axes.vertical {
                    bounds.center_x()
                } else {
                    bounds.center_y()
                },
            }
        })
        .collect::<Vec<_>>();

    let edge_elements = graph_edges(elements, &sizes);
    let edge_pairs = edge_elements
        .iter()
        .map(|(_, source, target)| (source.clone(), target.clone()))
        .collect::<Vec<_>>();

    let layering = layer_graph(&layer_nodes, &edge_pairs);

    // Main-axis offset of every rank.
    let mut rank_offsets = Vec::with_capacity(layering.layers().len());
    let mut rank_thickness = Vec::with_capacity(layering.layers().len());
    let mut cursor = 0.0;
    for layer in layering.layers() {
        let thickness = layer
            .iter()
            .filter_map(|id| sizes.get(id))
            .map(|&(w, h)| axes.main(w, h))
            .fold(0.0_f64, f64::max);
        rank_offsets.push(cursor);
        rank_thickness.push(thickness);
        cursor += thickness + options.rank_spacing;
    }
    let total_main = (cursor - options.rank_spacing).max(0.0);

    // Cross-axis extent of every rank; ranks are centred on the widest one.
    let extents = layering
        .layers()
        .iter()
        .map(|layer| {
            let sum = layer
                .iter()
                .filter_map(|id| sizes.get(id))
                .map(|&(w, h)| axes.cross(w, h))
                .sum::<f64>();
            sum + options.node_spacing * layer.len().saturating_sub(1) as f64
        })
        .collect::<Vec<_>>();
    let widest = extents.iter().copied().fold(0.0_f64, f64::max);

    let reversed = options.direction.is_reversed();
    let mut nodes = BTreeMap::new();
    for (rank, layer) in layering.layers().iter().enumerate() {
        let mut cross = (widest - extents[rank]) / 2.0;
        for (order, id) in layer.iter().enumerate() {
            let Some(&(width, height)) = sizes.get(id) else {
                continue;
            };
            let node_main = axes.main(width, height);
            // Nodes are centred within their rank's thickness.
            let mut main = rank_offsets[rank] + (rank_thickness[rank] - node_main) / 2.0;
            if reversed {
                main = total_main - main - node_main;
            }
            let (x, y) = axes.to_xy(main, cross);
            nodes.insert(
                id.clone(),
                NodePlacement {
                    rank,
                    order,
                    bounds: Bounds::new(x, y, width, height),
                },
            );
            cross += axes.cross(width, height) + options.node_spacing;
        }
    }

    // Translate so the layout's top-left corner sits at the margin.
    if let Some(extent) = Bounds::enclosing(nodes.values().map(|placement| &placement.bounds)) {
        let dx = options.margin_x - extent.x;
        let dy = options.margin_y - extent.y;
        for placement in nodes.values_mut() {
            placement.bounds.x += dx;
            placement.bounds.y += dy;
        }
    }

    let edges = edge_elements
        .into_iter()
        .filter_map(|(element_id, source, target)| {
            let from = nodes.get(&source)?;
            let to = nodes.get(&target)?;
            let (start, end) = attach_points(options.direction, from, to);
            Some(RoutedEdge {
                element_id,
                source,
                target,
                start,
                end,
            })
        })
        .collect::<Vec<_>>();

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        ranks = layering.layers().len(),
        reversed_edges = layering.reversed_edges().len(),
        crossings = layering.crossings(),
        "computed layout"
    );

    DiagramLayout {
        nodes,
        edges,
        layers: layering.layers().to_vec(),
        crossings: layering.crossings(),
    }
}

/// Lays out `elements` and returns the rewritten collection.
///
/// Order and cardinality are preserved. Versions are bumped only for elements whose geometry
/// changed. Without any live shape the input is returned unchanged.
pub fn layout_diagram(elements: &[Element], options: &LayoutOptions) -> Vec<Element> {
    let layout = compute_layout(elements, options);
    if layout.is_empty() {
        return elements.to_vec();
    }
    apply_layout(elements, &layout)
}

pub fn apply_layout(elements: &[Element], layout: &DiagramLayout) -> Vec<Element> {
    let routes = layout
        .edges()
        .iter()
        .map(|edge| (&edge.element_id, edge))
        .collect::<BTreeMap<_, _>>();

    elements
        .iter()
        .map(|element| {
            let mut element = element.clone();
            if !element.is_live() {
                return element;
            }

            if let Some(placement) = layout.node(&element.id) {
                set_geometry(&mut element, placement.bounds, None);
            } else if let Some(route) = routes.get(&element.id) {
                let [sx, sy] = route.start;
                let [ex, ey] = route.end;
                let (dx, dy) = (ex - sx, ey - sy);
                set_geometry(
                    &mut element,
                    Bounds::new(sx, sy, dx.abs(), dy.abs()),
                    Some(vec![[0.0, 0.0], [dx, dy]]),
                );
            } else if element.kind == ElementKind::Text {
                let container = element
                    .container_id
                    .as_ref()
                    .and_then(|container_id| layout.node(container_id));
                if let Some(container) = container {
                    let bounds = Bounds::new(
                        container.bounds.center_x() - element.width / 2.0,
                        container.bounds.center_y() - element.height / 2.0,
                        element.width,
                        element.height,
                    );
                    set_geometry(&mut element, bounds, None);
                }
            }
            element
        })
        .collect()
}

fn set_geometry(element: &mut Element, bounds: Bounds, points: Option<Vec<[f64; 2]>>) {
    let points_changed = points
        .as_ref()
        .is_some_and(|points| points != &element.points);
    if element.bounds() == bounds && !points_changed {
        return;
    }
    element.set_bounds(bounds);
    if let Some(points) = points {
        element.points = points;
    }
    element.bump_version();
}

/// Live arrows whose bindings resolve to two distinct nodes.
fn graph_edges(
    elements: &[Element],
    nodes: &BTreeMap<ElementId, (f64, f64)>,
) -> Vec<(ElementId, ElementId, ElementId)> {
    elements
        .iter()
        .filter(|element| element.is_live() && element.kind == ElementKind::Arrow)
        .filter_map(|element| {
            let source = element.start_element_id()?;
            let target = element.end_element_id()?;
            (source != target && nodes.contains_key(source) && nodes.contains_key(target))
                .then(|| (element.id.clone(), source.clone(), target.clone()))
        })
        .collect()
}

/// Arrow endpoints on the node sides facing along the flow.
///
/// Edges that run against the flow (reversed to break a cycle) leave from the opposite side.
fn attach_points(
    direction: FlowDirection,
    from: &NodePlacement,
    to: &NodePlacement,
) -> ([f64; 2], [f64; 2]) {
    let forward = to.rank > from.rank;
    let (a, b) = (&from.bounds, &to.bounds);

    let leaves_far_side = |bounds: &Bounds| match direction {
        FlowDirection::TopToBottom => [bounds.center_x(), bounds.bottom()],
        FlowDirection::BottomToTop => [bounds.center_x(), bounds.y],
        FlowDirection::LeftToRight => [bounds.right(), bounds.center_y()],
        FlowDirection::RightToLeft => [bounds.x, bounds.center_y()],
    };
    let enters_near_side = |bounds: &Bounds| match direction {
        FlowDirection::TopToBottom => [bounds.center_x(), bounds.y],
        FlowDirection::BottomToTop => [bounds.center_x(), bounds.bottom()],
        FlowDirection::LeftToRight => [bounds.x, bounds.center_y()],
        FlowDirection::RightToLeft => [bounds.right(), bounds.center_y()],
    };

    if forward {
        (leaves_far_side(a), enters_near_side(b))
    } else {
        (enters_near_side(a), leaves_far_side(b))
    }
}
