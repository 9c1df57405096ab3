// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Two-way index between canvas elements and shadow-model nodes.
//!
//! The index is derived state: the `customData` stamped onto each element is the source of
//! truth, so [`MappingIndex::restore_from_elements`] can always rebuild it from a stored element
//! collection and [`MappingIndex::materialize_into_elements`] writes it back before persisting.
//!
//! The index is owned by whoever holds the open file (see [`crate::session::Workspace`]) and is
//! not synchronised; all mutations are expected to come from one task.

mod derive;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::element::{MODULE_ID_KEY, NODE_ID_KEY};
use crate::model::{Element, ElementId, ModuleId, NodeId};

pub(crate) use derive::arrow_edge_id;
pub use derive::derive_shadow_project;

/// Module used for mapped elements that carry no module id.
pub const DEFAULT_MODULE_ID: &str = "main";

pub fn default_module_id() -> ModuleId {
    ModuleId::new(DEFAULT_MODULE_ID).expect("hard-coded default module id is valid")
}

/// One `(element, node, module)` association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNodeMapping {
    pub element_id: ElementId,
    pub node_id: NodeId,
    pub module_id: ModuleId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingIndex {
    by_element: BTreeMap<ElementId, (NodeId, ModuleId)>,
    /// Insertion-ordered, duplicate-free element lists per node.
    by_node: BTreeMap<NodeId, Vec<ElementId>>,
}

impl MappingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Associates `element_id` with `node_id`/`module_id`.
    ///
    /// An element belongs to at most one node: re-mapping moves it out of its previous node's
    /// list. Mapping the same triple twice is a no-op.
    pub fn map(&mut self, element_id: ElementId, node_id: NodeId, module_id: ModuleId) {
        let previous = self
            .by_element
            .insert(element_id.clone(), (node_id.clone(), module_id));

        match previous {
            Some((previous_node, _)) if previous_node == node_id => return,
            Some((previous_node, _)) => self.detach(&previous_node, &element_id),
            None => {}
        }

        let elements = self.by_node.entry(node_id).or_default();
        if !elements.contains(&element_id) {
            elements.push(element_id);
        }
    }

    /// Removes an element's association; unmapped elements are ignored.
    pub fn unmap(&mut self, element_id: &ElementId) -> Option<ElementNodeMapping> {
        let (node_id, module_id) = self.by_element.remove(element_id)?;
        self.detach(&node_id, element_id);
        Some(ElementNodeMapping {
            element_id: element_id.clone(),
            node_id,
            module_id,
        })
    }

    /// Drops every element of `node_id`, returning them in mapping order.
    pub fn unmap_node(&mut self, node_id: &NodeId) -> Vec<ElementId> {
        let elements = self.by_node.remove(node_id).unwrap_or_default();
        for element_id in &elements {
            self.by_element.remove(element_id);
        }
        elements
    }

    pub fn lookup_node(&self, element_id: &ElementId) -> Option<(&NodeId, &ModuleId)> {
        self.by_element
            .get(element_id)
            .map(|(node_id, module_id)| (node_id, module_id))
    }

    pub fn lookup_elements(&self, node_id: &NodeId) -> &[ElementId] {
        self.by_node.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.by_node.contains_key(node_id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.by_node.keys()
    }

    /// Module of a node, taken from its first mapped element.
    pub fn module_of(&self, node_id: &NodeId) -> Option<&ModuleId> {
        let first = self.lookup_elements(node_id).first()?;
        self.lookup_node(first).map(|(_, module_id)| module_id)
    }

    pub fn mappings(&self) -> impl Iterator<Item = ElementNodeMapping> + '_ {
        self.by_element
            .iter()
            .map(|(element_id, (node_id, module_id))| ElementNodeMapping {
                element_id: element_id.clone(),
                node_id: node_id.clone(),
                module_id: module_id.clone(),
            })
    }

    pub fn clear(&mut self) {
        self.by_element.clear();
        self.by_node.clear();
    }

    /// Rebuilds the index from the metadata stamped on `elements`.
    ///
    /// Tombstoned elements and elements with malformed ids are skipped. Returns the number of
    /// mapped elements.
    pub fn restore_from_elements(&mut self, elements: &[Element]) -> usize {
        self.clear();

        for element in elements.iter().filter(|element| element.is_live()) {
            let Some(raw_node_id) = element.custom_str(NODE_ID_KEY) else {
                continue;
            };
            let Ok(node_id) = NodeId::new(raw_node_id) else {
                debug!(element_id = %element.id, raw_node_id, "skipping malformed node id");
                continue;
            };
            let module_id = match element.custom_str(MODULE_ID_KEY) {
                None => default_module_id(),
                Some(raw_module_id) => match ModuleId::new(raw_module_id) {
                    Ok(module_id) => module_id,
                    Err(_) => {
                        debug!(element_id = %element.id, raw_module_id, "skipping malformed module id");
                        continue;
                    }
                },
            };

            self.map(element.id.clone(), node_id, module_id);
        }

        debug!(mapped = self.len(), nodes = self.by_node.len(), "restored element mapping");
        self.len()
    }

    /// Returns `elements` with the current mapping stamped into their `customData`.
    ///
    /// Elements without a mapping pass through unchanged. An element's `version` is bumped only
    /// when its stamp actually changes, so stamping is stable under repetition.
    pub fn materialize_into_elements(&self, elements: &[Element]) -> Vec<Element> {
        let mut out = elements.to_vec();
        self.materialize_in_place(&mut out);
        out
    }

    pub fn materialize_in_place(&self, elements: &mut [Element]) {
        for element in elements.iter_mut() {
            let Some((node_id, module_id)) = self.by_element.get(&element.id) else {
                continue;
            };

            // A missing module stamp already reads back as the default module.
            let module_matches = match element.custom_str(MODULE_ID_KEY) {
                Some(stamped) => stamped == module_id.as_str(),
                None => module_id.as_str() == DEFAULT_MODULE_ID,
            };
            if element.custom_str(NODE_ID_KEY) == Some(node_id.as_str()) && module_matches {
                continue;
            }

            element.set_custom(NODE_ID_KEY, node_id.as_str());
            element.set_custom(MODULE_ID_KEY, module_id.as_str());
            element.bump_version();
        }
    }

    fn detach(&mut self, node_id: &NodeId, element_id: &ElementId) {
        let Some(elements) = self.by_node.get_mut(node_id) else {
            return;
        };
        elements.retain(|id| id != element_id);
        if elements.is_empty() {
            self.by_node.remove(node_id);
        }
    }
}
