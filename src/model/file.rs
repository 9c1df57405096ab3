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

use super::ids::{FileId, VersionId};
use super::version::{DiagramVersion, VersionType};

/// What kind of diagram a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    #[default]
    Flowchart,
    Architecture,
    Sequence,
    Mindmap,
    Er,
    Class,
    State,
    Other,
}

impl ModuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Architecture => "architecture",
            Self::Sequence => "sequence",
            Self::Mindmap => "mindmap",
            Self::Er => "er",
            Self::Class => "class",
            Self::State => "state",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flowchart" => Some(Self::Flowchart),
            "architecture" => Some(Self::Architecture),
            "sequence" => Some(Self::Sequence),
            "mindmap" => Some(Self::Mindmap),
            "er" => Some(Self::Er),
            "class" => Some(Self::Class),
            "state" => Some(Self::State),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A named diagram with its two version tracks.
///
/// Version lists and current pointers are only mutated by the version manager and factory;
/// everything outside the crate gets read access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramFile {
    id: FileId,
    name: String,
    module_type: ModuleType,
    #[serde(default)]
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    simple_versions: Vec<DiagramVersion>,
    #[serde(default)]
    professional_versions: Vec<DiagramVersion>,
    current_simple_version_id: VersionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_professional_version_id: Option<VersionId>,
    /// Highest number ever handed out per track; `0` in documents written before it existed.
    #[serde(default)]
    last_simple_version_number: u32,
    #[serde(default)]
    last_professional_version_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_history: Option<Vec<ChatMessage>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
}

impl DiagramFile {
    pub(crate) fn new(
        id: FileId,
        name: String,
        module_type: ModuleType,
        description: String,
        created_at: DateTime<Utc>,
        initial: DiagramVersion,
        tags: Vec<String>,
    ) -> Self {
        let current_simple_version_id = initial.id().clone();
        let last_simple_version_number = initial.version_number();
        Self {
            id,
            name,
            module_type,
            description,
            created_at,
            updated_at: created_at,
            simple_versions: vec![initial],
            professional_versions: Vec::new(),
            current_simple_version_id,
            current_professional_version_id: None,
            last_simple_version_number,
            last_professional_version_number: 0,
            chat_history: None,
            tags,
            thumbnail: None,
        }
    }

    pub fn id(&self) -> &FileId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn simple_versions(&self) -> &[DiagramVersion] {
        &self.simple_versions
    }

    pub fn professional_versions(&self) -> &[DiagramVersion] {
        &self.professional_versions
    }

    pub fn versions(&self, version_type: VersionType) -> &[DiagramVersion] {
        match version_type {
            VersionType::Simple => &self.simple_versions,
            VersionType::Professional => &self.professional_versions,
        }
    }

    pub fn current_simple_version_id(&self) -> &VersionId {
        &self.current_simple_version_id
    }

    pub fn current_professional_version_id(&self) -> Option<&VersionId> {
        self.current_professional_version_id.as_ref()
    }

    pub fn current_simple_version(&self) -> Option<&DiagramVersion> {
        self.find_version(VersionType::Simple, &self.current_simple_version_id)
    }

    pub fn current_professional_version(&self) -> Option<&DiagramVersion> {
        let id = self.current_professional_version_id.as_ref()?;
        self.find_version(VersionType::Professional, id)
    }

    pub fn find_version(
        &self,
        version_type: VersionType,
        version_id: &VersionId,
    ) -> Option<&DiagramVersion> {
        self.versions(version_type)
            .iter()
            .find(|version| version.id() == version_id)
    }

    /// Highest number ever handed out in a track, including deleted and evicted versions.
    ///
    /// Falls back to the highest number still present when the recorded mark is behind it.
    pub fn last_version_number(&self, version_type: VersionType) -> u32 {
        self.recorded_version_number(version_type)
            .max(self.highest_present_number(version_type))
    }

    /// Next number for a track, starting at 1. Numbers are never reused after deletion.
    pub fn next_version_number(&self, version_type: VersionType) -> u32 {
        self.last_version_number(version_type).saturating_add(1)
    }

    pub(crate) fn recorded_version_number(&self, version_type: VersionType) -> u32 {
        match version_type {
            VersionType::Simple => self.last_simple_version_number,
            VersionType::Professional => self.last_professional_version_number,
        }
    }

    pub(crate) fn highest_present_number(&self, version_type: VersionType) -> u32 {
        self.versions(version_type)
            .iter()
            .map(DiagramVersion::version_number)
            .max()
            .unwrap_or(0)
    }

    pub fn chat_history(&self) -> Option<&[ChatMessage]> {
        self.chat_history.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            module_type: self.module_type,
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            simple_version_count: self.simple_versions.len(),
            professional_version_count: self.professional_versions.len(),
            tags: self.tags.clone(),
            thumbnail: self.thumbnail.clone(),
        }
    }

    pub(crate) fn versions_mut(&mut self, version_type: VersionType) -> &mut Vec<DiagramVersion> {
        match version_type {
            VersionType::Simple => &mut self.simple_versions,
            VersionType::Professional => &mut self.professional_versions,
        }
    }

    /// Appends `version` to its track and raises the track's high-water mark.
    pub(crate) fn push_version(&mut self, version: DiagramVersion) {
        let version_type = version.version_type();
        let number = self.last_version_number(version_type).max(version.version_number());
        match version_type {
            VersionType::Simple => self.last_simple_version_number = number,
            VersionType::Professional => self.last_professional_version_number = number,
        }
        self.versions_mut(version_type).push(version);
    }

    pub(crate) fn set_current_simple_version_id(&mut self, version_id: VersionId) {
        self.current_simple_version_id = version_id;
    }

    pub(crate) fn set_current_professional_version_id(&mut self, version_id: Option<VersionId>) {
        self.current_professional_version_id = version_id;
    }

    pub(crate) fn apply_update(&mut self, update: FileUpdate) {
        let FileUpdate {
            name,
            description,
            tags,
            thumbnail,
            chat_history,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(thumbnail) = thumbnail {
            self.thumbnail = thumbnail;
        }
        if let Some(chat_history) = chat_history {
            self.chat_history = chat_history;
        }
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Partial metadata update; version tracks are never part of it.
///
/// Doubly-optional fields distinguish "leave as is" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub thumbnail: Option<Option<String>>,
    pub chat_history: Option<Option<Vec<ChatMessage>>>,
}

impl FileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Listing view of a file, without version payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: FileId,
    pub name: String,
    pub module_type: ModuleType,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub simple_version_count: usize,
    pub professional_version_count: usize,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
}
