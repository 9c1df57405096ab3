// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use vellum::model::{Bounds, Element, ElementId, ElementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DagParams {
    pub layers: usize,
    pub nodes_per_layer: usize,
    pub fanout: usize,
    /// Adds one edge per node back to the first layer, forcing cycle breaking.
    pub back_edges: bool,
}

impl DagParams {
    pub const fn new(layers: usize, nodes_per_layer: usize, fanout: usize, back_edges: bool) -> Self {
        Self { layers, nodes_per_layer, fanout, back_edges }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumDense,
    LargeCyclic,
}

pub fn params(case: Case) -> DagParams {
    match case {
        Case::Small => DagParams::new(4, 3, 2, false),
        Case::MediumDense => DagParams::new(8, 8, 3, false),
        Case::LargeCyclic => DagParams::new(16, 12, 2, true),
    }
}

pub fn fixture(case: Case) -> Vec<Element> {
    dag(params(case))
}

fn element_id(value: String) -> ElementId {
    ElementId::new(value).expect("element id")
}

fn node_id(layer: usize, idx: usize) -> ElementId {
    element_id(format!("n{layer}_{idx}"))
}

/// A layered graph of rectangles with bound arrows, scattered so layout has work to do.
pub fn dag(params: DagParams) -> Vec<Element> {
    assert!(params.layers >= 2, "layers must be >= 2");
    assert!(params.nodes_per_layer >= 1, "nodes_per_layer must be >= 1");
    assert!(params.fanout >= 1, "fanout must be >= 1");

    let mut elements = Vec::new();
    for layer in 0..params.layers {
        for idx in 0..params.nodes_per_layer {
            // Deterministic scatter: positions unrelated to the logical structure.
            let x = ((layer * 7919 + idx * 104_729) % 2000) as f64;
            let y = ((layer * 6151 + idx * 3571) % 1500) as f64;
            elements.push(Element::new(
                node_id(layer, idx),
                ElementKind::Rectangle,
                Bounds::new(x, y, 150.0, 60.0),
            ));
        }
    }

    let push_arrow = |elements: &mut Vec<Element>, from: ElementId, to: ElementId| {
        let id = element_id(format!("e{}", elements.len()));
        elements.push(Element::arrow(id, from, to));
    };

    for layer in 0..params.layers - 1 {
        for idx in 0..params.nodes_per_layer {
            for k in 0..params.fanout {
                let target = (idx * 31 + k * 17) % params.nodes_per_layer;
                push_arrow(&mut elements, node_id(layer, idx), node_id(layer + 1, target));
            }
            if params.back_edges && layer > 0 {
                push_arrow(&mut elements, node_id(layer + 1, idx), node_id(0, idx));
            }
        }
    }

    elements
}
