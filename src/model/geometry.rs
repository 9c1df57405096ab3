// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Strict overlap; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn enclosing<'a>(mut items: impl Iterator<Item = &'a Bounds>) -> Option<Bounds> {
        let first = *items.next()?;
        Some(items.fold(first, |acc, b| acc.union(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::Bounds;

    #[test]
    fn touching_rectangles_do_not_overlap() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Bounds::new(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn enclosing_unions_all_rectangles() {
        let rects = [Bounds::new(0.0, 0.0, 10.0, 10.0), Bounds::new(20.0, -5.0, 5.0, 5.0)];
        let all = Bounds::enclosing(rects.iter()).expect("non-empty");
        assert_eq!(all, Bounds::new(0.0, -5.0, 25.0, 15.0));
        assert_eq!(Bounds::enclosing([].iter()), None);
    }
}
