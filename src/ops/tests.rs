// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use rstest::{fixture, rstest};
use serde_json::json;

use super::{apply_ops, ApplyError, EdgePatch, NodePatch, ObjectKind, ShadowOp, ShadowRef};
use crate::mapping::{derive_shadow_project, MappingIndex};
use crate::model::element::{EDGE_ID_KEY, NODE_ID_KEY};
use crate::model::{Bounds, EdgeId, EdgeType, Element, ElementKind, ModuleId, NodeId, NodeType};

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn edge_id(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

fn add_node(id: &str, node_type: NodeType, label: &str) -> ShadowOp {
    ShadowOp::AddNode {
        node_id: nid(id),
        module_id: None,
        node_type,
        label: label.to_owned(),
        bounds: None,
        properties: BTreeMap::new(),
    }
}

fn add_edge(id: &str, from: &str, to: &str) -> ShadowOp {
    ShadowOp::AddEdge {
        edge_id: edge_id(id),
        source_node_id: nid(from),
        target_node_id: nid(to),
        edge_type: EdgeType::Flow,
        label: None,
    }
}

fn find<'a>(elements: &'a [Element], id: &str) -> &'a Element {
    elements
        .iter()
        .find(|element| element.id.as_str() == id)
        .unwrap_or_else(|| panic!("element {id} missing"))
}

#[derive(Debug, Default)]
struct Scene {
    elements: Vec<Element>,
    mapping: MappingIndex,
}

impl Scene {
    fn apply(&mut self, ops: &[ShadowOp]) -> Result<super::ApplyResult, ApplyError> {
        apply_ops(&mut self.elements, &mut self.mapping, ops)
    }
}

#[fixture]
fn two_nodes() -> Scene {
    let mut scene = Scene::default();
    scene
        .apply(&[
            add_node("start", NodeType::Start, "Begin"),
            add_node("check", NodeType::Decision, "Ok?"),
            add_edge("e1", "start", "check"),
        ])
        .expect("seed scene");
    scene
}

#[test]
fn add_node_creates_a_shape_and_a_bound_label() {
    let mut scene = Scene::default();
    let result = scene
        .apply(&[add_node("n1", NodeType::Process, "Hello")])
        .expect("apply");

    assert_eq!(result.applied, 1);
    assert_eq!(result.delta.added, vec![ShadowRef::Node(nid("n1"))]);

    let shape = find(&scene.elements, "n1");
    assert_eq!(shape.kind, ElementKind::Rectangle);
    assert_eq!(shape.bounds(), Bounds::new(100.0, 100.0, 150.0, 60.0));
    assert_eq!(shape.custom_str(NODE_ID_KEY), Some("n1"));

    let label = find(&scene.elements, "n1-label");
    assert_eq!(label.kind, ElementKind::Text);
    assert_eq!(label.container_id.as_ref(), Some(&shape.id));
    assert_eq!(label.text.as_deref(), Some("Hello"));
    assert_eq!(label.bounds().center_x(), shape.bounds().center_x());

    assert_eq!(scene.mapping.lookup_elements(&nid("n1")).len(), 2);
    let project = derive_shadow_project(&scene.elements, &scene.mapping);
    let node = project.node(&nid("n1")).expect("derived node");
    assert_eq!(node.label, "Hello");
    assert_eq!(node.node_type, NodeType::Process);
}

#[rstest]
#[case(NodeType::Decision, ElementKind::Diamond)]
#[case(NodeType::Start, ElementKind::Ellipse)]
#[case(NodeType::End, ElementKind::Ellipse)]
#[case(NodeType::Data, ElementKind::Rectangle)]
fn node_type_picks_the_shape(#[case] node_type: NodeType, #[case] kind: ElementKind) {
    let mut scene = Scene::default();
    scene
        .apply(&[add_node("n", node_type, "x")])
        .expect("apply");
    assert_eq!(find(&scene.elements, "n").kind, kind);
}

#[test]
fn new_nodes_are_placed_right_of_existing_content() {
    let mut scene = Scene::default();
    scene
        .apply(&[
            add_node("a", NodeType::Process, "A"),
            add_node("b", NodeType::Process, "B"),
        ])
        .expect("apply");
    let a = find(&scene.elements, "a").bounds();
    let b = find(&scene.elements, "b").bounds();
    assert_eq!(b.x, a.right() + 50.0);
    assert_eq!(b.y, a.y);
}

#[test]
fn add_node_keeps_module_and_properties() {
    let mut scene = Scene::default();
    let module = ModuleId::new("billing").expect("module id");
    let mut properties = BTreeMap::new();
    properties.insert("owner".to_owned(), json!("ops"));
    properties.insert("shadowNodeId".to_owned(), json!("spoofed"));

    scene
        .apply(&[ShadowOp::AddNode {
            node_id: nid("n"),
            module_id: Some(module.clone()),
            node_type: NodeType::Entity,
            label: "Invoice".to_owned(),
            bounds: Some(Bounds::new(10.0, 20.0, 200.0, 80.0)),
            properties,
        }])
        .expect("apply");

    assert_eq!(scene.mapping.module_of(&nid("n")), Some(&module));
    let shape = find(&scene.elements, "n");
    assert_eq!(shape.bounds(), Bounds::new(10.0, 20.0, 200.0, 80.0));
    assert_eq!(shape.custom_str(NODE_ID_KEY), Some("n"));

    let project = derive_shadow_project(&scene.elements, &scene.mapping);
    let node = project.node(&nid("n")).expect("node");
    assert_eq!(node.node_type, NodeType::Entity);
    assert_eq!(node.properties.get("owner"), Some(&json!("ops")));
    assert!(project.modules().contains_key(&module));
}

#[rstest]
fn duplicate_node_is_rejected_and_nothing_changes(mut two_nodes: Scene) {
    let before = two_nodes.elements.clone();
    let mapping_before = two_nodes.mapping.clone();

    let err = two_nodes
        .apply(&[
            add_node("fresh", NodeType::Process, "Fresh"),
            add_node("start", NodeType::Process, "Again"),
        ])
        .expect_err("duplicate");
    assert_eq!(
        err,
        ApplyError::AlreadyExists {
            kind: ObjectKind::Node,
            object_id: "start".to_owned(),
        }
    );
    assert_eq!(two_nodes.elements, before);
    assert_eq!(two_nodes.mapping, mapping_before);
}

#[rstest]
fn add_edge_binds_the_primary_shapes(two_nodes: Scene) {
    let arrow = find(&two_nodes.elements, "e1");
    assert_eq!(arrow.kind, ElementKind::Arrow);
    assert_eq!(arrow.start_element_id().map(|id| id.as_str()), Some("start"));
    assert_eq!(arrow.end_element_id().map(|id| id.as_str()), Some("check"));
    assert_eq!(arrow.custom_str(EDGE_ID_KEY), Some("e1"));

    let project = derive_shadow_project(&two_nodes.elements, &two_nodes.mapping);
    let edge = project.edges().get(&edge_id("e1")).expect("edge");
    assert_eq!(edge.source_node_id, nid("start"));
    assert_eq!(edge.target_node_id, nid("check"));
    assert_eq!(project.live_edges().count(), 1);
}

#[rstest]
fn edge_to_unknown_node_is_rejected(mut two_nodes: Scene) {
    let err = two_nodes
        .apply(&[add_edge("e2", "start", "ghost")])
        .expect_err("missing node");
    assert_eq!(err, ApplyError::MissingNode { node_id: nid("ghost") });
    assert!(two_nodes
        .elements
        .iter()
        .all(|element| element.id.as_str() != "e2"));
}

#[rstest]
fn duplicate_edge_is_rejected(mut two_nodes: Scene) {
    let err = two_nodes
        .apply(&[add_edge("e1", "check", "start")])
        .expect_err("duplicate edge");
    assert_eq!(
        err,
        ApplyError::AlreadyExists {
            kind: ObjectKind::Edge,
            object_id: "e1".to_owned(),
        }
    );
}

#[rstest]
fn update_node_relabels_and_moves(mut two_nodes: Scene) {
    let version_before = find(&two_nodes.elements, "check").version;
    let result = two_nodes
        .apply(&[ShadowOp::UpdateNode {
            node_id: nid("check"),
            patch: NodePatch {
                label: Some("Valid?".to_owned()),
                bounds: Some(Bounds::new(500.0, 500.0, 100.0, 100.0)),
                ..NodePatch::default()
            },
        }])
        .expect("apply");
    assert_eq!(result.delta.updated, vec![ShadowRef::Node(nid("check"))]);

    let shape = find(&two_nodes.elements, "check");
    assert_eq!(shape.version, version_before + 1);
    let label = find(&two_nodes.elements, "check-label");
    assert_eq!(label.text.as_deref(), Some("Valid?"));
    assert_eq!(label.bounds().center_x(), 550.0);
    assert_eq!(label.bounds().center_y(), 550.0);
}

#[rstest]
fn update_node_type_reshapes_the_body(mut two_nodes: Scene) {
    two_nodes
        .apply(&[ShadowOp::UpdateNode {
            node_id: nid("check"),
            patch: NodePatch {
                node_type: Some(NodeType::Process),
                ..NodePatch::default()
            },
        }])
        .expect("apply");
    assert_eq!(find(&two_nodes.elements, "check").kind, ElementKind::Rectangle);
    let project = derive_shadow_project(&two_nodes.elements, &two_nodes.mapping);
    assert_eq!(project.node(&nid("check")).expect("node").node_type, NodeType::Process);
}

#[rstest]
fn update_node_replaces_properties_but_keeps_stamps(mut two_nodes: Scene) {
    let mut properties = BTreeMap::new();
    properties.insert("color".to_owned(), json!("red"));
    two_nodes
        .apply(&[ShadowOp::UpdateNode {
            node_id: nid("start"),
            patch: NodePatch {
                properties: Some(properties),
                ..NodePatch::default()
            },
        }])
        .expect("apply");

    let shape = find(&two_nodes.elements, "start");
    assert_eq!(shape.custom_str("color"), Some("red"));
    assert_eq!(shape.custom_str(NODE_ID_KEY), Some("start"));
}

#[test]
fn update_unknown_node_fails() {
    let mut scene = Scene::default();
    let err = scene
        .apply(&[ShadowOp::UpdateNode {
            node_id: nid("ghost"),
            patch: NodePatch::default(),
        }])
        .expect_err("unknown node");
    assert_eq!(
        err,
        ApplyError::NotFound {
            kind: ObjectKind::Node,
            object_id: "ghost".to_owned(),
        }
    );
}

#[rstest]
fn remove_node_tombstones_its_elements_and_edges(mut two_nodes: Scene) {
    let count_before = two_nodes.elements.len();
    let result = two_nodes
        .apply(&[ShadowOp::RemoveNode {
            node_id: nid("start"),
        }])
        .expect("apply");

    assert_eq!(
        result.delta.removed,
        vec![ShadowRef::Node(nid("start")), ShadowRef::Edge(edge_id("e1"))]
    );
    assert_eq!(two_nodes.elements.len(), count_before);
    for id in ["start", "start-label", "e1"] {
        assert!(find(&two_nodes.elements, id).is_deleted, "{id} should be tombstoned");
    }
    assert!(find(&two_nodes.elements, "check").is_live());
    assert!(!two_nodes.mapping.contains_node(&nid("start")));

    let project = derive_shadow_project(&two_nodes.elements, &two_nodes.mapping);
    assert!(project.node(&nid("start")).is_none());
    assert!(project.edges().is_empty());
}

#[rstest]
fn removed_node_id_can_be_reused(mut two_nodes: Scene) {
    two_nodes
        .apply(&[
            ShadowOp::RemoveNode {
                node_id: nid("start"),
            },
            add_node("start", NodeType::Start, "Again"),
        ])
        .expect("apply");
    let shape = two_nodes
        .elements
        .iter()
        .find(|element| element.is_live() && element.custom_str(NODE_ID_KEY) == Some("start"))
        .expect("new body");
    assert_eq!(shape.id.as_str(), "start-2");
}

#[rstest]
fn update_edge_relabels_retypes_and_rebinds(mut two_nodes: Scene) {
    two_nodes
        .apply(&[add_node("done", NodeType::End, "Done")])
        .expect("add");
    two_nodes
        .apply(&[ShadowOp::UpdateEdge {
            edge_id: edge_id("e1"),
            patch: EdgePatch {
                label: Some(Some("yes".to_owned())),
                edge_type: Some(EdgeType::Dependency),
                target_node_id: Some(nid("done")),
                ..EdgePatch::default()
            },
        }])
        .expect("apply");

    let project = derive_shadow_project(&two_nodes.elements, &two_nodes.mapping);
    let edge = project.edges().get(&edge_id("e1")).expect("edge");
    assert_eq!(edge.label.as_deref(), Some("yes"));
    assert_eq!(edge.edge_type, EdgeType::Dependency);
    assert_eq!(edge.target_node_id, nid("done"));

    two_nodes
        .apply(&[ShadowOp::UpdateEdge {
            edge_id: edge_id("e1"),
            patch: EdgePatch {
                label: Some(None),
                ..EdgePatch::default()
            },
        }])
        .expect("clear label");
    let project = derive_shadow_project(&two_nodes.elements, &two_nodes.mapping);
    assert_eq!(project.edges()[&edge_id("e1")].label, None);
}

#[rstest]
fn remove_edge_leaves_nodes_alone(mut two_nodes: Scene) {
    let result = two_nodes
        .apply(&[ShadowOp::RemoveEdge {
            edge_id: edge_id("e1"),
        }])
        .expect("apply");
    assert_eq!(result.delta.removed, vec![ShadowRef::Edge(edge_id("e1"))]);
    assert!(find(&two_nodes.elements, "e1").is_deleted);

    let project = derive_shadow_project(&two_nodes.elements, &two_nodes.mapping);
    assert_eq!(project.nodes().len(), 2);
    assert!(project.edges().is_empty());

    let err = two_nodes
        .apply(&[ShadowOp::RemoveEdge {
            edge_id: edge_id("e1"),
        }])
        .expect_err("already removed");
    assert!(matches!(err, ApplyError::NotFound { kind: ObjectKind::Edge, .. }));
}

#[test]
fn added_then_removed_in_one_batch_leaves_an_empty_delta() {
    let mut scene = Scene::default();
    let result = scene
        .apply(&[
            add_node("tmp", NodeType::Process, "tmp"),
            ShadowOp::RemoveNode {
                node_id: nid("tmp"),
            },
        ])
        .expect("apply");
    assert_eq!(result.applied, 2);
    assert!(result.delta.is_empty());
}

#[test]
fn empty_batch_is_a_no_op() {
    let mut scene = Scene::default();
    let result = scene.apply(&[]).expect("apply");
    assert_eq!(result.applied, 0);
    assert!(result.delta.is_empty());
    assert!(scene.elements.is_empty());
}

#[test]
fn ops_deserialize_from_tagged_json() {
    let raw = json!([
        { "op": "addNode", "nodeId": "a", "label": "A", "nodeType": "decision" },
        { "op": "addNode", "nodeId": "b", "label": "B" },
        { "op": "addEdge", "edgeId": "ab", "sourceNodeId": "a", "targetNodeId": "b" },
        { "op": "updateEdge", "edgeId": "ab", "patch": { "label": "go" } }
    ]);
    let ops: Vec<ShadowOp> = serde_json::from_value(raw).expect("parse ops");

    let mut scene = Scene::default();
    scene.apply(&ops).expect("apply");
    let project = derive_shadow_project(&scene.elements, &scene.mapping);
    assert_eq!(project.node(&nid("a")).expect("a").node_type, NodeType::Decision);
    assert_eq!(project.edges()[&edge_id("ab")].label.as_deref(), Some("go"));
}

#[test]
fn edge_patch_tells_null_from_missing() {
    let keep: EdgePatch = serde_json::from_value(json!({ "edgeType": "message" })).expect("keep");
    assert_eq!(keep.label, None);

    let clear: EdgePatch = serde_json::from_value(json!({ "label": null })).expect("clear");
    assert_eq!(clear.label, Some(None));

    let set: EdgePatch = serde_json::from_value(json!({ "label": "go" })).expect("set");
    assert_eq!(set.label, Some(Some("go".to_owned())));
}
