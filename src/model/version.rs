// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::element::Element;
use super::ids::VersionId;

/// One of the two independent version lineages of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Simple,
    Professional,
}

impl VersionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Professional => "professional",
        }
    }
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Professional,
    Modern,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementLevel {
    Basic,
    #[default]
    Standard,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructureOptions {
    pub add_swimlanes: bool,
    pub add_parallel_branches: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeOptions {
    pub use_professional_symbols: bool,
    pub add_details: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeOptions {
    pub add_condition_labels: bool,
    pub add_sequence_numbers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOptions {
    pub color_scheme: ColorScheme,
    pub add_legend: bool,
    pub add_title: bool,
}

/// How a professional render was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementOptions {
    pub structure: StructureOptions,
    pub nodes: NodeOptions,
    pub edges: EdgeOptions,
    pub style: StyleOptions,
    pub level: EnhancementLevel,
}

/// Track-specific payload of a version, tagged by `type` when persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VersionPayload {
    Simple {
        elements: Vec<Element>,
    },
    Professional {
        xml: String,
        options: EnhancementOptions,
    },
}

impl VersionPayload {
    pub fn version_type(&self) -> VersionType {
        match self {
            Self::Simple { .. } => VersionType::Simple,
            Self::Professional { .. } => VersionType::Professional,
        }
    }
}

/// An immutable snapshot within one track of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramVersion {
    id: VersionId,
    version_number: u32,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    payload: VersionPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_simple_version_id: Option<VersionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default)]
    auto_save: bool,
}

impl DiagramVersion {
    pub(crate) fn new(
        id: VersionId,
        version_number: u32,
        created_at: DateTime<Utc>,
        payload: VersionPayload,
        source_simple_version_id: Option<VersionId>,
        note: Option<String>,
        auto_save: bool,
    ) -> Self {
        Self {
            id,
            version_number,
            created_at,
            payload,
            source_simple_version_id,
            note,
            auto_save,
        }
    }

    pub fn id(&self) -> &VersionId {
        &self.id
    }

    pub fn version_number(&self) -> u32 {
        self.version_number
    }

    pub fn version_type(&self) -> VersionType {
        self.payload.version_type()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &VersionPayload {
        &self.payload
    }

    /// Elements of a simple version; `None` for professional versions.
    pub fn elements(&self) -> Option<&[Element]> {
        match &self.payload {
            VersionPayload::Simple { elements } => Some(elements),
            VersionPayload::Professional { .. } => None,
        }
    }

    /// XML and options of a professional version; `None` for simple versions.
    pub fn professional(&self) -> Option<(&str, &EnhancementOptions)> {
        match &self.payload {
            VersionPayload::Professional { xml, options } => Some((xml, options)),
            VersionPayload::Simple { .. } => None,
        }
    }

    pub fn source_simple_version_id(&self) -> Option<&VersionId> {
        self.source_simple_version_id.as_ref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn is_auto_save(&self) -> bool {
        self.auto_save
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{DiagramVersion, EnhancementOptions, VersionPayload, VersionType};
    use crate::model::VersionId;

    #[test]
    fn professional_payload_is_tagged_and_flattened() {
        let version = DiagramVersion::new(
            VersionId::new("v1").unwrap(),
            1,
            Utc::now(),
            VersionPayload::Professional {
                xml: "<mxfile/>".to_owned(),
                options: EnhancementOptions::default(),
            },
            Some(VersionId::new("s1").unwrap()),
            None,
            false,
        );

        let json = serde_json::to_value(&version).expect("serialize");
        assert_eq!(json["type"], "professional");
        assert_eq!(json["xml"], "<mxfile/>");
        assert_eq!(json["sourceSimpleVersionId"], "s1");
        assert_eq!(json["options"]["style"]["colorScheme"], "professional");

        let back: DiagramVersion = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, version);
        assert_eq!(back.version_type(), VersionType::Professional);
        assert!(back.elements().is_none());
    }

    #[test]
    fn enhancement_options_fill_missing_groups_with_defaults() {
        let raw = r#"{ "edges": { "addSequenceNumbers": true }, "level": "advanced" }"#;
        let options: EnhancementOptions = serde_json::from_str(raw).expect("parse options");
        assert!(options.edges.add_sequence_numbers);
        assert!(!options.edges.add_condition_labels);
        assert!(!options.style.add_title);
        assert_eq!(options.level, super::EnhancementLevel::Advanced);
    }
}
