// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Node/edge mutation helpers used by `apply_ops`.
// Keeps `ops::mod` focused on public op types and orchestration.

/// Horizontal gap between the current content and a node added without bounds.
const NEW_NODE_GAP: f64 = 50.0;
const LABEL_CHAR_WIDTH: f64 = 8.0;
const LABEL_HEIGHT: f64 = 20.0;

/// Working copy of an element collection and its mapping.
struct Scene {
    elements: Vec<Element>,
    mapping: MappingIndex,
}

impl Scene {
    fn apply(&mut self, op: &ShadowOp, delta: &mut DeltaBuilder) -> Result<(), ApplyError> {
        match op {
            ShadowOp::AddNode {
                node_id,
                module_id,
                node_type,
                label,
                bounds,
                properties,
            } => {
                if self.node_exists(node_id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: ObjectKind::Node,
                        object_id: node_id.to_string(),
                    });
                }
                let module_id = module_id.clone().unwrap_or_else(default_module_id);
                let bounds = bounds.unwrap_or_else(|| self.next_free_bounds());

                let shape_id = self.fresh_element_id(node_id.as_str());
                let mut shape = Element::new(shape_id.clone(), shape_kind(*node_type), bounds);
                stamp_node(&mut shape, node_id, &module_id);
                shape.set_custom(NODE_TYPE_KEY, node_type.as_str());
                for (key, value) in properties.iter().filter(|(key, _)| !is_shadow_key(key)) {
                    shape.set_custom(key, value.clone());
                }
                self.elements.push(shape);
                self.mapping
                    .map(shape_id.clone(), node_id.clone(), module_id.clone());

                self.push_label(node_id, &module_id, &shape_id, bounds, label);

                delta.record_added(ShadowRef::Node(node_id.clone()));
                Ok(())
            }
            ShadowOp::UpdateNode { node_id, patch } => {
                let Some(body) = self.node_body(node_id) else {
                    return Err(ApplyError::NotFound {
                        kind: ObjectKind::Node,
                        object_id: node_id.to_string(),
                    });
                };

                self.edit(body, |element| {
                    if let Some(node_type) = patch.node_type {
                        element.set_custom(NODE_TYPE_KEY, node_type.as_str());
                        if element.kind.is_shape() {
                            element.kind = shape_kind(node_type);
                        }
                    }
                    if let Some(bounds) = patch.bounds {
                        element.set_bounds(bounds);
                    }
                    if let Some(properties) = &patch.properties {
                        let stale = element
                            .custom_data
                            .iter()
                            .flatten()
                            .map(|(key, _)| key.clone())
                            .filter(|key| !is_shadow_key(key))
                            .collect::<Vec<_>>();
                        for key in stale {
                            element.remove_custom(&key);
                        }
                        for (key, value) in properties.iter().filter(|(key, _)| !is_shadow_key(key))
                        {
                            element.set_custom(key, value.clone());
                        }
                    }
                });

                let body_id = self.elements[body].id.clone();
                let body_bounds = self.elements[body].bounds();
                match (self.node_label(node_id, &body_id), &patch.label) {
                    (Some(label), Some(text)) => self.edit(label, |element| {
                        element.text = Some(text.clone());
                        element.width = label_width(text);
                        center_in(element, body_bounds);
                    }),
                    (Some(label), None) if patch.bounds.is_some() => {
                        self.edit(label, |element| center_in(element, body_bounds));
                    }
                    (None, Some(text)) => {
                        let module_id = self
                            .mapping
                            .module_of(node_id)
                            .cloned()
                            .unwrap_or_else(default_module_id);
                        self.push_label(node_id, &module_id, &body_id, body_bounds, text);
                    }
                    _ => {}
                }

                delta.record_updated(ShadowRef::Node(node_id.clone()));
                Ok(())
            }
            ShadowOp::RemoveNode { node_id } => {
                if !self.node_exists(node_id) {
                    return Err(ApplyError::NotFound {
                        kind: ObjectKind::Node,
                        object_id: node_id.to_string(),
                    });
                }

                let mut doomed = self
                    .mapping
                    .lookup_elements(node_id)
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<_>>();

                // Arrows touching the node go with it; those that were edges are reported.
                let bound_arrows = self
                    .elements
                    .iter()
                    .filter(|element| element.is_live() && element.kind == ElementKind::Arrow)
                    .filter(|element| {
                        element.start_element_id().is_some_and(|id| doomed.contains(id))
                            || element.end_element_id().is_some_and(|id| doomed.contains(id))
                    })
                    .map(|element| (element.id.clone(), self.resolves_as_edge(element)))
                    .collect::<Vec<_>>();
                for (arrow_id, edge_id) in bound_arrows {
                    if let Some(edge_id) = edge_id {
                        delta.record_removed(ShadowRef::Edge(edge_id));
                    }
                    doomed.insert(arrow_id);
                }

                let contained_text = self
                    .elements
                    .iter()
                    .filter(|element| element.is_live() && element.kind == ElementKind::Text)
                    .filter(|element| {
                        element
                            .container_id
                            .as_ref()
                            .is_some_and(|id| doomed.contains(id))
                    })
                    .map(|element| element.id.clone())
                    .collect::<Vec<_>>();
                doomed.extend(contained_text);

                for element in self.elements.iter_mut() {
                    if doomed.contains(&element.id) {
                        element.tombstone();
                    }
                }
                self.mapping.unmap_node(node_id);
                for element_id in &doomed {
                    self.mapping.unmap(element_id);
                }

                delta.record_removed(ShadowRef::Node(node_id.clone()));
                Ok(())
            }
            ShadowOp::AddEdge {
                edge_id,
                source_node_id,
                target_node_id,
                edge_type,
                label,
            } => {
                if self.find_edge(edge_id).is_some() {
                    return Err(ApplyError::AlreadyExists {
                        kind: ObjectKind::Edge,
                        object_id: edge_id.to_string(),
                    });
                }
                let source = self.endpoint(source_node_id)?;
                let target = self.endpoint(target_node_id)?;

                let arrow_id = self.fresh_element_id(edge_id.as_str());
                let mut arrow = Element::arrow(
                    arrow_id,
                    self.elements[source].id.clone(),
                    self.elements[target].id.clone(),
                );
                route_between(
                    &mut arrow,
                    self.elements[source].bounds(),
                    self.elements[target].bounds(),
                );
                arrow.set_custom(EDGE_ID_KEY, edge_id.as_str());
                arrow.set_custom(EDGE_TYPE_KEY, edge_type.as_str());
                if let Some(label) = label {
                    arrow.set_custom(EDGE_LABEL_KEY, label.as_str());
                }
                self.elements.push(arrow);

                delta.record_added(ShadowRef::Edge(edge_id.clone()));
                Ok(())
            }
            ShadowOp::UpdateEdge { edge_id, patch } => {
                let Some(index) = self.find_edge(edge_id) else {
                    return Err(ApplyError::NotFound {
                        kind: ObjectKind::Edge,
                        object_id: edge_id.to_string(),
                    });
                };

                let source = match &patch.source_node_id {
                    Some(node_id) => Some(self.endpoint(node_id)?),
                    None => None,
                };
                let target = match &patch.target_node_id {
                    Some(node_id) => Some(self.endpoint(node_id)?),
                    None => None,
                };
                let shape_at = |i: usize| (self.elements[i].id.clone(), self.elements[i].bounds());
                let source_shape = source.map(shape_at);
                let target_shape = target.map(shape_at);
                let current_bounds = |id: Option<&ElementId>| {
                    id.and_then(|id| self.live_position(id))
                        .map(|i| self.elements[i].bounds())
                };
                let old_source = current_bounds(self.elements[index].start_element_id());
                let old_target = current_bounds(self.elements[index].end_element_id());

                self.edit(index, |element| {
                    element.set_custom(EDGE_ID_KEY, edge_id.as_str());
                    match &patch.label {
                        Some(Some(label)) => element.set_custom(EDGE_LABEL_KEY, label.as_str()),
                        Some(None) => element.remove_custom(EDGE_LABEL_KEY),
                        None => {}
                    }
                    if let Some(edge_type) = patch.edge_type {
                        element.set_custom(EDGE_TYPE_KEY, edge_type.as_str());
                    }
                    if source_shape.is_none() && target_shape.is_none() {
                        return;
                    }
                    let mut from = old_source;
                    let mut to = old_target;
                    if let Some((shape_id, bounds)) = &source_shape {
                        element.start_binding = Some(Binding::to(shape_id.clone()));
                        from = Some(*bounds);
                    }
                    if let Some((shape_id, bounds)) = &target_shape {
                        element.end_binding = Some(Binding::to(shape_id.clone()));
                        to = Some(*bounds);
                    }
                    if let (Some(from), Some(to)) = (from, to) {
                        route_between(element, from, to);
                    }
                });

                delta.record_updated(ShadowRef::Edge(edge_id.clone()));
                Ok(())
            }
            ShadowOp::RemoveEdge { edge_id } => {
                let Some(index) = self.find_edge(edge_id) else {
                    return Err(ApplyError::NotFound {
                        kind: ObjectKind::Edge,
                        object_id: edge_id.to_string(),
                    });
                };
                let arrow_id = self.elements[index].id.clone();
                self.elements[index].tombstone();
                for element in self.elements.iter_mut() {
                    if element.is_live() && element.container_id.as_ref() == Some(&arrow_id) {
                        element.tombstone();
                    }
                }
                delta.record_removed(ShadowRef::Edge(edge_id.clone()));
                Ok(())
            }
        }
    }

    /// Applies `f` to one element and bumps its version if anything changed.
    fn edit(&mut self, index: usize, f: impl FnOnce(&mut Element)) {
        let before = self.elements[index].clone();
        let element = &mut self.elements[index];
        f(element);
        if *element != before {
            element.bump_version();
        }
    }

    fn live_position(&self, element_id: &ElementId) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.is_live() && &element.id == element_id)
    }

    fn node_exists(&self, node_id: &NodeId) -> bool {
        self.node_body(node_id).is_some()
    }

    /// First live shape mapped to the node, else its first live element.
    fn node_body(&self, node_id: &NodeId) -> Option<usize> {
        let live = self
            .mapping
            .lookup_elements(node_id)
            .iter()
            .filter_map(|id| self.live_position(id))
            .collect::<Vec<_>>();
        live.iter()
            .copied()
            .find(|&i| self.elements[i].kind.is_shape())
            .or_else(|| live.first().copied())
    }

    fn node_label(&self, node_id: &NodeId, body_id: &ElementId) -> Option<usize> {
        self.mapping
            .lookup_elements(node_id)
            .iter()
            .filter_map(|id| self.live_position(id))
            .find(|&i| self.elements[i].kind == ElementKind::Text)
            .or_else(|| {
                self.elements.iter().position(|element| {
                    element.is_live()
                        && element.kind == ElementKind::Text
                        && element.container_id.as_ref() == Some(body_id)
                })
            })
    }

    fn endpoint(&self, node_id: &NodeId) -> Result<usize, ApplyError> {
        self.node_body(node_id)
            .ok_or_else(|| ApplyError::MissingNode {
                node_id: node_id.clone(),
            })
    }

    fn find_edge(&self, edge_id: &EdgeId) -> Option<usize> {
        self.elements.iter().position(|element| {
            element.is_live()
                && element.kind == ElementKind::Arrow
                && &arrow_edge_id(element) == edge_id
        })
    }

    /// Edge id of an arrow whose two bindings resolve to mapped elements.
    fn resolves_as_edge(&self, element: &Element) -> Option<EdgeId> {
        let start = element.start_element_id()?;
        let end = element.end_element_id()?;
        self.mapping.lookup_node(start)?;
        self.mapping.lookup_node(end)?;
        Some(arrow_edge_id(element))
    }

    /// `base` if no element (live or tombstoned) uses it, else `base-2`, `base-3`, ...
    fn fresh_element_id(&self, base: &str) -> ElementId {
        let taken = self
            .elements
            .iter()
            .map(|element| element.id.as_str())
            .collect::<BTreeSet<_>>();
        let mut candidate = base.to_owned();
        let mut suffix = 2_u32;
        while taken.contains(candidate.as_str()) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        ElementId::new(candidate).expect("derived from a valid id")
    }

    /// Slot right of the current content, or the layout margin for an empty scene.
    fn next_free_bounds(&self) -> Bounds {
        let options = LayoutOptions::default();
        let shapes = self
            .elements
            .iter()
            .filter(|element| element.is_live() && element.kind.is_shape())
            .map(Element::bounds)
            .collect::<Vec<_>>();
        match Bounds::enclosing(shapes.iter()) {
            Some(extent) => Bounds::new(
                extent.right() + NEW_NODE_GAP,
                extent.y,
                options.node_width,
                options.node_height,
            ),
            None => Bounds::new(
                options.margin_x,
                options.margin_y,
                options.node_width,
                options.node_height,
            ),
        }
    }

    fn push_label(
        &mut self,
        node_id: &NodeId,
        module_id: &ModuleId,
        container_id: &ElementId,
        container: Bounds,
        text: &str,
    ) {
        let label_id = self.fresh_element_id(&format!("{container_id}-label"));
        let mut label = Element::text_label(label_id.clone(), container_id.clone(), text);
        label.width = label_width(text);
        label.height = LABEL_HEIGHT;
        center_in(&mut label, container);
        stamp_node(&mut label, node_id, module_id);
        self.elements.push(label);
        self.mapping
            .map(label_id, node_id.clone(), module_id.clone());
    }
}

fn shape_kind(node_type: NodeType) -> ElementKind {
    match node_type {
        NodeType::Decision => ElementKind::Diamond,
        NodeType::Start | NodeType::End => ElementKind::Ellipse,
        _ => ElementKind::Rectangle,
    }
}

fn is_shadow_key(key: &str) -> bool {
    key.starts_with("shadow")
}

fn stamp_node(element: &mut Element, node_id: &NodeId, module_id: &ModuleId) {
    element.set_custom(NODE_ID_KEY, node_id.as_str());
    element.set_custom(MODULE_ID_KEY, module_id.as_str());
}

fn label_width(text: &str) -> f64 {
    (text.chars().count() as f64 * LABEL_CHAR_WIDTH).max(LABEL_CHAR_WIDTH)
}

fn center_in(element: &mut Element, container: Bounds) {
    element.x = container.center_x() - element.width / 2.0;
    element.y = container.center_y() - element.height / 2.0;
}

/// Straight arrow from the bottom centre of `from` to the top centre of `to`.
fn route_between(arrow: &mut Element, from: Bounds, to: Bounds) {
    let (sx, sy) = (from.center_x(), from.bottom());
    let (ex, ey) = (to.center_x(), to.y);
    let (dx, dy) = (ex - sx, ey - sy);
    arrow.set_bounds(Bounds::new(sx, sy, dx.abs(), dy.abs()));
    arrow.points = vec![[0.0, 0.0], [dx, dy]];
}
