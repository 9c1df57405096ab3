// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no config file at all) is valid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::FlowDirection;
use crate::store::{StoreError, WriteDurability};

pub const MAX_SIMPLE_VERSIONS: usize = 10;
pub const MAX_PROFESSIONAL_VERSIONS: usize = 10;
pub const MAX_FILES: usize = 50;
pub const MAX_RECENT_FILES: usize = 10;
pub const AUTOSAVE_DELAY_MS: u64 = 2000;

pub const ENV_DATA_DIR: &str = "VELLUM_DATA_DIR";
pub const ENV_AUTOSAVE_DELAY_MS: &str = "VELLUM_AUTOSAVE_DELAY_MS";
pub const ENV_DURABLE_WRITES: &str = "VELLUM_DURABLE_WRITES";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub max_simple_versions: usize,
    pub max_professional_versions: usize,
    pub max_files: usize,
    pub max_recent_files: usize,
    pub autosave_delay_ms: u64,
    pub data_dir: Option<PathBuf>,
    pub durable_writes: bool,
    pub layout: LayoutOptions,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_simple_versions: MAX_SIMPLE_VERSIONS,
            max_professional_versions: MAX_PROFESSIONAL_VERSIONS,
            max_files: MAX_FILES,
            max_recent_files: MAX_RECENT_FILES,
            autosave_delay_ms: AUTOSAVE_DELAY_MS,
            data_dir: None,
            durable_writes: false,
            layout: LayoutOptions::default(),
        }
    }
}

impl VaultConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Applies `VELLUM_*` overrides from `lookup` (normally `std::env::var`).
    ///
    /// Unparseable values are ignored and leave the configured value in place.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|dir| !dir.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = lookup(ENV_AUTOSAVE_DELAY_MS).and_then(|raw| raw.trim().parse().ok()) {
            self.autosave_delay_ms = ms;
        }
        if let Some(raw) = lookup(ENV_DURABLE_WRITES) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.durable_writes = true,
                "0" | "false" | "no" | "off" => self.durable_writes = false,
                _ => {}
            }
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn durability(&self) -> WriteDurability {
        if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        }
    }
}

/// Auto-layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub direction: FlowDirection,
    /// Footprint used for nodes whose element has no size.
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between neighbouring nodes of one rank.
    pub node_spacing: f64,
    /// Gap between consecutive ranks.
    pub rank_spacing: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: FlowDirection::TopToBottom,
            node_width: 150.0,
            node_height: 60.0,
            node_spacing: 50.0,
            rank_spacing: 80.0,
            margin_x: 100.0,
            margin_y: 100.0,
        }
    }
}

impl LayoutOptions {
    pub fn with_direction(mut self, direction: FlowDirection) -> Self {
        self.direction = direction;
        self
    }
}
