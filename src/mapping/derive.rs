// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};

use super::MappingIndex;
use crate::model::element::{EDGE_ID_KEY, EDGE_LABEL_KEY, EDGE_TYPE_KEY, NODE_TYPE_KEY};
use crate::model::{
    Bounds, EdgeId, EdgeType, Element, ElementId, ElementKind, FlowDirection, GridPosition,
    ModuleId, NodeId, NodeType, ShadowEdge, ShadowModule, ShadowNode, ShadowProject,
};

/// Rebuilds the semantic graph for `elements` using `mapping`.
///
/// - A node exists when at least one of its mapped elements is live.
/// - An edge exists for every live arrow whose two bindings resolve to mapped elements. Edges
///   towards nodes without live elements are kept and show up as orphaned.
/// - Modules group nodes by the module of their first mapped element.
pub fn derive_shadow_project(elements: &[Element], mapping: &MappingIndex) -> ShadowProject {
    let live = elements
        .iter()
        .filter(|element| element.is_live())
        .map(|element| (&element.id, element))
        .collect::<HashMap<&ElementId, &Element>>();

    let mut project = ShadowProject::default();

    for node_id in mapping.node_ids() {
        let node_elements = mapping
            .lookup_elements(node_id)
            .iter()
            .filter_map(|id| live.get(id).copied())
            .collect::<Vec<_>>();
        let Some(node) = derive_node(node_id, &node_elements, elements) else {
            continue;
        };
        project.nodes_mut().insert(node_id.clone(), node);
    }

    assign_grid_positions(&mut project);

    for element in elements {
        if !element.is_live() || element.kind != ElementKind::Arrow {
            continue;
        }
        let (Some(start), Some(end)) = (element.start_element_id(), element.end_element_id())
        else {
            continue;
        };
        let (Some((source, _)), Some((target, _))) =
            (mapping.lookup_node(start), mapping.lookup_node(end))
        else {
            continue;
        };

        let edge_id = arrow_edge_id(element);
        let edge_type = element
            .custom_str(EDGE_TYPE_KEY)
            .and_then(EdgeType::parse)
            .unwrap_or_default();

        project.edges_mut().insert(
            edge_id.clone(),
            ShadowEdge {
                id: edge_id,
                edge_type,
                label: element.custom_str(EDGE_LABEL_KEY).map(ToOwned::to_owned),
                source_node_id: source.clone(),
                target_node_id: target.clone(),
                element_id: element.id.clone(),
            },
        );
    }

    let modules = derive_modules(&project, mapping);
    *project.modules_mut() = modules;

    project
}

/// Edge id an arrow stands for: its stamped edge id, or the arrow's own id.
pub(crate) fn arrow_edge_id(element: &Element) -> EdgeId {
    element
        .custom_str(EDGE_ID_KEY)
        .and_then(|raw| EdgeId::new(raw).ok())
        .unwrap_or_else(|| EdgeId::new(element.id.as_str()).expect("element ids are valid edge ids"))
}

fn derive_node(
    node_id: &NodeId,
    node_elements: &[&Element],
    all_elements: &[Element],
) -> Option<ShadowNode> {
    let body = node_elements
        .iter()
        .copied()
        .find(|element| element.kind.is_shape())
        .or_else(|| node_elements.first().copied())?;

    let label_element = node_elements
        .iter()
        .copied()
        .find(|element| element.kind == ElementKind::Text)
        .or_else(|| {
            all_elements.iter().find(|element| {
                element.is_live()
                    && element.kind == ElementKind::Text
                    && element.container_id.as_ref() == Some(&body.id)
            })
        });

    let node_type = body
        .custom_str(NODE_TYPE_KEY)
        .and_then(|raw| raw.parse::<NodeType>().ok())
        .unwrap_or(match body.kind {
            ElementKind::Rectangle => NodeType::Process,
            ElementKind::Diamond => NodeType::Decision,
            ElementKind::Text => NodeType::Annotation,
            ElementKind::Frame => NodeType::Container,
            _ => NodeType::Generic,
        });

    let properties = body
        .custom_data
        .iter()
        .flatten()
        .filter(|(key, _)| !key.starts_with("shadow"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(ShadowNode {
        id: node_id.clone(),
        node_type,
        label: label_element
            .and_then(|element| element.text.clone())
            .unwrap_or_default(),
        properties,
        grid: GridPosition::default(),
        bounds: body.bounds(),
        element_ids: node_elements.iter().map(|element| element.id.clone()).collect(),
    })
}

/// Rows are bands of nodes whose vertical centres lie within half a node height of the band's
/// first node; columns order a row by x.
fn assign_grid_positions(project: &mut ShadowProject) {
    let mut order = project
        .nodes()
        .values()
        .map(|node| (node.id.clone(), node.bounds))
        .collect::<Vec<_>>();
    order.sort_by(|(a_id, a), (b_id, b)| {
        a.center_y()
            .total_cmp(&b.center_y())
            .then_with(|| a.x.total_cmp(&b.x))
            .then_with(|| a_id.cmp(b_id))
    });

    let mut rows: Vec<Vec<(NodeId, Bounds)>> = Vec::new();
    for (node_id, bounds) in order {
        let starts_new_row = match rows.last().and_then(|row| row.first()) {
            Some((_, first)) => {
                bounds.center_y() - first.center_y() > (first.height / 2.0).max(1.0)
            }
            None => true,
        };
        if starts_new_row {
            rows.push(Vec::new());
        }
        rows.last_mut()
            .expect("row pushed above")
            .push((node_id, bounds));
    }

    for (row_idx, mut row) in rows.into_iter().enumerate() {
        row.sort_by(|(a_id, a), (b_id, b)| a.x.total_cmp(&b.x).then_with(|| a_id.cmp(b_id)));
        for (column, (node_id, _)) in row.into_iter().enumerate() {
            if let Some(node) = project.nodes_mut().get_mut(&node_id) {
                node.grid = GridPosition {
                    row: row_idx as u32,
                    column: column as u32,
                };
            }
        }
    }
}

fn derive_modules(
    project: &ShadowProject,
    mapping: &MappingIndex,
) -> BTreeMap<ModuleId, ShadowModule> {
    let mut modules = BTreeMap::<ModuleId, ShadowModule>::new();

    for node in project.nodes().values() {
        let Some(module_id) = mapping.module_of(&node.id) else {
            continue;
        };
        let module = modules
            .entry(module_id.clone())
            .or_insert_with(|| ShadowModule {
                id: module_id.clone(),
                name: module_id.to_string(),
                node_ids: Vec::new(),
                edge_ids: Vec::new(),
                direction: FlowDirection::default(),
                bounds: node.bounds,
            });
        module.node_ids.push(node.id.clone());
        module.bounds = module.bounds.union(&node.bounds);
    }

    for edge in project.live_edges() {
        let Some(module_id) = mapping.module_of(&edge.source_node_id) else {
            continue;
        };
        if let Some(module) = modules.get_mut(module_id) {
            module.edge_ids.push(edge.id.clone());
        }
    }

    modules
}
