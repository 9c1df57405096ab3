// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! File thumbnails.
//!
//! Thumbnails are a best-effort side effect of saving: failures only reach the log.

use std::fmt;
use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::format::escape_xml;
use crate::model::{Bounds, Element, ElementKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailError {
    EmptyScene,
    Render { reason: String },
}

impl fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScene => f.write_str("nothing to render"),
            Self::Render { reason } => write!(f, "thumbnail render failed: {reason}"),
        }
    }
}

impl std::error::Error for ThumbnailError {}

/// Turns an element collection into an image URL suitable for `DiagramFile::thumbnail`.
pub trait ThumbnailRenderer: Send + Sync {
    fn render(&self, elements: &[Element]) -> Result<String, ThumbnailError>;
}

/// Small SVG preview, returned as a `data:image/svg+xml;base64,` URL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgThumbnailRenderer {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Default for SvgThumbnailRenderer {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 160.0,
            padding: 8.0,
        }
    }
}

impl SvgThumbnailRenderer {
    pub fn render_svg(&self, elements: &[Element]) -> Result<String, ThumbnailError> {
        let live = elements
            .iter()
            .filter(|element| element.is_live())
            .collect::<Vec<_>>();
        let extents = live.iter().map(|element| element_extent(element)).collect::<Vec<_>>();
        let Some(scene) = Bounds::enclosing(extents.iter()) else {
            return Err(ThumbnailError::EmptyScene);
        };

        let inner_w = (self.width - 2.0 * self.padding).max(1.0);
        let inner_h = (self.height - 2.0 * self.padding).max(1.0);
        let scale = (inner_w / scene.width.max(1.0)).min(inner_h / scene.height.max(1.0));
        let tx = |x: f64| self.padding + (x - scene.x) * scale;
        let ty = |y: f64| self.padding + (y - scene.y) * scale;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        svg.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);

        for element in live {
            let x = tx(element.x);
            let y = ty(element.y);
            let w = element.width * scale;
            let h = element.height * scale;
            match &element.kind {
                ElementKind::Rectangle | ElementKind::Frame | ElementKind::Image => {
                    let _ = write!(
                        svg,
                        r##"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="none" stroke="#1e1e1e"/>"##
                    );
                }
                ElementKind::Ellipse => {
                    let _ = write!(
                        svg,
                        r##"<ellipse cx="{:.1}" cy="{:.1}" rx="{:.1}" ry="{:.1}" fill="none" stroke="#1e1e1e"/>"##,
                        x + w / 2.0,
                        y + h / 2.0,
                        w / 2.0,
                        h / 2.0
                    );
                }
                ElementKind::Diamond => {
                    let _ = write!(
                        svg,
                        r##"<polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="none" stroke="#1e1e1e"/>"##,
                        x + w / 2.0,
                        y,
                        x + w,
                        y + h / 2.0,
                        x + w / 2.0,
                        y + h,
                        x,
                        y + h / 2.0
                    );
                }
                ElementKind::Arrow | ElementKind::Line | ElementKind::Freedraw => {
                    if element.points.len() < 2 {
                        continue;
                    }
                    let points = element
                        .points
                        .iter()
                        .map(|[px, py]| format!("{:.1},{:.1}", x + px * scale, y + py * scale))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let _ = write!(
                        svg,
                        r##"<polyline points="{points}" fill="none" stroke="#1e1e1e"/>"##
                    );
                }
                ElementKind::Text => {
                    let Some(text) = element.text.as_deref() else {
                        continue;
                    };
                    let size = (h * 0.8).max(4.0);
                    let _ = write!(
                        svg,
                        r##"<text x="{x:.1}" y="{:.1}" font-size="{size:.1}" fill="#1e1e1e">{}</text>"##,
                        y + size,
                        escape_xml(text)
                    );
                }
                ElementKind::Other(_) => {}
            }
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

impl ThumbnailRenderer for SvgThumbnailRenderer {
    fn render(&self, elements: &[Element]) -> Result<String, ThumbnailError> {
        let svg = self.render_svg(elements)?;
        Ok(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(svg.as_bytes())
        ))
    }
}

/// Area covered by an element, including arrow points that leave its box.
fn element_extent(element: &Element) -> Bounds {
    let own = element.bounds();
    element.points.iter().fold(own, |acc, [px, py]| {
        acc.union(&Bounds::new(element.x + px, element.y + py, 0.0, 0.0))
    })
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    use super::{SvgThumbnailRenderer, ThumbnailError, ThumbnailRenderer};
    use crate::model::fixtures::{chain_abc, label};

    #[test]
    fn renders_shapes_and_escaped_labels() {
        let mut elements = chain_abc();
        elements.push(label("note", "A", "a < b & c"));

        let svg = SvgThumbnailRenderer::default()
            .render_svg(&elements)
            .expect("svg");

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<rect ").count(), 4);
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn data_url_wraps_base64_svg() {
        let url = SvgThumbnailRenderer::default()
            .render(&chain_abc())
            .expect("thumbnail");
        let encoded = url
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data url prefix");
        let decoded = String::from_utf8(STANDARD.decode(encoded).expect("base64")).expect("utf8");
        assert!(decoded.ends_with("</svg>"));
    }

    #[test]
    fn tombstones_only_scene_is_empty() {
        let mut elements = chain_abc();
        for element in &mut elements {
            element.is_deleted = true;
        }
        assert_eq!(
            SvgThumbnailRenderer::default().render(&elements),
            Err(ThumbnailError::EmptyScene)
        );
    }
}
