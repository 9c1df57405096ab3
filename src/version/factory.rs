// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::Utc;

use crate::model::{
    DiagramFile, DiagramVersion, Element, FileId, ModuleType, VersionId, VersionPayload,
};

pub const INITIAL_VERSION_NOTE: &str = "initial";

/// Input for [`create_version`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersionParams {
    pub payload: VersionPayload,
    pub note: Option<String>,
    pub auto_save: bool,
    /// Only kept for professional payloads.
    pub source_simple_version_id: Option<VersionId>,
}

impl NewVersionParams {
    pub fn simple(elements: Vec<Element>) -> Self {
        Self {
            payload: VersionPayload::Simple { elements },
            note: None,
            auto_save: false,
            source_simple_version_id: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn auto_saved(mut self) -> Self {
        self.auto_save = true;
        self
    }
}

/// Builds the next version for the payload's track without touching `file`.
///
/// The number is one past the track's high-water mark, so numbers freed by eviction or
/// deletion are never handed out again.
pub fn create_version(file: &DiagramFile, params: NewVersionParams) -> DiagramVersion {
    let NewVersionParams {
        payload,
        note,
        auto_save,
        source_simple_version_id,
    } = params;

    let version_type = payload.version_type();
    let source_simple_version_id = match payload {
        VersionPayload::Professional { .. } => source_simple_version_id,
        VersionPayload::Simple { .. } => None,
    };

    DiagramVersion::new(
        VersionId::generate(version_type.as_str()),
        file.next_version_number(version_type),
        Utc::now(),
        payload,
        source_simple_version_id,
        note.filter(|note| !note.trim().is_empty()),
        auto_save,
    )
}

/// Input for [`create_new_file`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFileParams {
    pub name: String,
    pub module_type: ModuleType,
    pub description: String,
    pub elements: Vec<Element>,
    pub tags: Vec<String>,
}

impl NewFileParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A new file with exactly one simple version (`1`, note `"initial"`) set as current.
pub fn create_new_file(params: NewFileParams) -> DiagramFile {
    let NewFileParams {
        name,
        module_type,
        description,
        elements,
        tags,
    } = params;

    let now = Utc::now();
    let initial = DiagramVersion::new(
        VersionId::generate("simple"),
        1,
        now,
        VersionPayload::Simple { elements },
        None,
        Some(INITIAL_VERSION_NOTE.to_owned()),
        false,
    );

    DiagramFile::new(
        FileId::generate("file"),
        name,
        module_type,
        description,
        now,
        initial,
        tags,
    )
}
