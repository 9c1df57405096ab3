// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::model::{FileId, VersionId, VersionType};
use crate::ops::ApplyError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, VaultError>;

/// Caller-facing failures of the file and version surface.
///
/// Every variant except `StorageFailure` is raised before anything is written, so a failed
/// operation leaves the stored file exactly as it was.
#[derive(Debug)]
pub enum VaultError {
    FileNotFound {
        file_id: FileId,
    },
    VersionNotFound {
        file_id: FileId,
        version_type: VersionType,
        version_id: VersionId,
    },
    CannotDeleteLastVersion {
        file_id: FileId,
    },
    FileLimitReached {
        max_files: usize,
    },
    StorageFailure {
        source: StoreError,
    },
    InvalidImportFormat {
        reason: String,
    },
    EnhancementFailed {
        reason: String,
    },
    /// A workspace operation needs an open file.
    NoFileOpen,
    EditRejected {
        source: ApplyError,
    },
}

impl VaultError {
    pub(crate) fn invalid_import(reason: impl Into<String>) -> Self {
        Self::InvalidImportFormat {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { file_id } => write!(f, "file not found (id={file_id})"),
            Self::VersionNotFound {
                file_id,
                version_type,
                version_id,
            } => write!(
                f,
                "{version_type} version {version_id} not found in file {file_id}"
            ),
            Self::CannotDeleteLastVersion { file_id } => {
                write!(f, "cannot delete the last simple version of file {file_id}")
            }
            Self::FileLimitReached { max_files } => {
                write!(f, "file limit reached ({max_files} files)")
            }
            Self::StorageFailure { source } => write!(f, "storage failure: {source}"),
            Self::InvalidImportFormat { reason } => write!(f, "invalid import format: {reason}"),
            Self::EnhancementFailed { reason } => write!(f, "enhancement failed: {reason}"),
            Self::NoFileOpen => f.write_str("no file is open"),
            Self::EditRejected { source } => write!(f, "edit rejected: {source}"),
        }
    }
}

impl std::error::Error for VaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StorageFailure { source } => Some(source),
            Self::EditRejected { source } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for VaultError {
    fn from(source: StoreError) -> Self {
        Self::StorageFailure { source }
    }
}

impl From<ApplyError> for VaultError {
    fn from(source: ApplyError) -> Self {
        Self::EditRejected { source }
    }
}
