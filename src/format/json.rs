// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, VaultError};
use crate::model::{DiagramFile, DiagramVersion, Element, VersionType};

pub fn export_file(file: &DiagramFile) -> serde_json::Result<String> {
    serde_json::to_string_pretty(file)
}

/// Parses a file document and checks every structural invariant before handing it out.
pub fn import_file(raw: &str) -> Result<DiagramFile> {
    let file: DiagramFile = serde_json::from_str(raw)
        .map_err(|err| VaultError::invalid_import(format!("not a diagram file: {err}")))?;
    validate_file(&file)?;
    Ok(file)
}

/// Accepts either a bare element array or a scene object with an `elements` array.
pub fn import_elements(raw: &str) -> Result<Vec<Element>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| VaultError::invalid_import(format!("invalid json: {err}")))?;
    let elements = match value {
        Value::Array(_) => value,
        Value::Object(mut scene) => match scene.remove("elements") {
            Some(elements @ Value::Array(_)) => elements,
            Some(_) => return Err(VaultError::invalid_import("`elements` must be an array")),
            None => return Err(VaultError::invalid_import("scene has no `elements` array")),
        },
        _ => {
            return Err(VaultError::invalid_import(
                "expected an element array or a scene object",
            ))
        }
    };
    serde_json::from_value(elements)
        .map_err(|err| VaultError::invalid_import(format!("invalid element: {err}")))
}

#[derive(Serialize)]
struct Scene<'a> {
    elements: &'a [Element],
}

/// Writes `elements` as a `{ "elements": [...] }` scene, the shape [`import_elements`] reads.
pub fn export_elements(elements: &[Element]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Scene { elements })
}

fn validate_file(file: &DiagramFile) -> Result<()> {
    if file.simple_versions().is_empty() {
        return Err(VaultError::invalid_import("file has no simple version"));
    }

    for version_type in [VersionType::Simple, VersionType::Professional] {
        validate_track(version_type, file.versions(version_type))?;
        let recorded = file.recorded_version_number(version_type);
        let highest = file.highest_present_number(version_type);
        if recorded != 0 && recorded < highest {
            return Err(VaultError::invalid_import(format!(
                "last {version_type} version number {recorded} is below version {highest}"
            )));
        }
    }

    if file.current_simple_version().is_none() {
        return Err(VaultError::invalid_import(format!(
            "current simple version {} is not in the simple track",
            file.current_simple_version_id()
        )));
    }
    if let Some(current) = file.current_professional_version_id() {
        if file.current_professional_version().is_none() {
            return Err(VaultError::invalid_import(format!(
                "current professional version {current} is not in the professional track"
            )));
        }
    }
    Ok(())
}

fn validate_track(version_type: VersionType, versions: &[DiagramVersion]) -> Result<()> {
    let mut ids = BTreeSet::new();
    let mut previous = 0;
    for version in versions {
        if version.version_type() != version_type {
            return Err(VaultError::invalid_import(format!(
                "version {} has a {} payload in the {version_type} track",
                version.id(),
                version.version_type()
            )));
        }
        if version.version_number() == 0 {
            return Err(VaultError::invalid_import(format!(
                "version {} has number 0; numbers start at 1",
                version.id()
            )));
        }
        if !ids.insert(version.id()) {
            return Err(VaultError::invalid_import(format!(
                "duplicate {version_type} version id {}",
                version.id()
            )));
        }
        // Tracks are stored oldest first; eviction relies on it.
        if version.version_number() <= previous {
            return Err(VaultError::invalid_import(format!(
                "{version_type} version number {} does not follow {previous}",
                version.version_number()
            )));
        }
        previous = version.version_number();
    }
    Ok(())
}
