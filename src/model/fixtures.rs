// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::element::{Element, ElementKind};
use super::geometry::Bounds;
use super::ids::ElementId;

pub(crate) fn eid(value: &str) -> ElementId {
    ElementId::new(value).expect("element id")
}

pub(crate) fn rect(id: &str, x: f64, y: f64) -> Element {
    Element::new(eid(id), ElementKind::Rectangle, Bounds::new(x, y, 150.0, 60.0))
}

pub(crate) fn label(id: &str, container: &str, text: &str) -> Element {
    let mut element = Element::text_label(eid(id), eid(container), text);
    element.width = 40.0;
    element.height = 20.0;
    element
}

pub(crate) fn arrow(id: &str, from: &str, to: &str) -> Element {
    Element::arrow(eid(id), eid(from), eid(to))
}

/// A -> B -> C, shapes deliberately scattered.
pub(crate) fn chain_abc() -> Vec<Element> {
    vec![
        rect("A", 400.0, 10.0),
        rect("B", 0.0, 500.0),
        rect("C", 250.0, 250.0),
        label("A-label", "A", "Start"),
        arrow("ab", "A", "B"),
        arrow("bc", "B", "C"),
    ]
}

/// A -> {B, C} -> D plus a dangling arrow and a tombstoned shape.
pub(crate) fn diamond_dag() -> Vec<Element> {
    let mut deleted = rect("X", 900.0, 900.0);
    deleted.is_deleted = true;

    let mut dangling = arrow("dangling", "A", "missing");
    dangling.x = 5.0;
    dangling.y = 7.0;

    vec![
        rect("A", 0.0, 0.0),
        rect("B", 0.0, 0.0),
        rect("C", 0.0, 0.0),
        rect("D", 0.0, 0.0),
        arrow("ab", "A", "B"),
        arrow("ac", "A", "C"),
        arrow("bd", "B", "D"),
        arrow("cd", "C", "D"),
        dangling,
        deleted,
    ]
}
