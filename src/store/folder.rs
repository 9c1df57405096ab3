// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! On-disk backend: one JSON document per file plus small index and recency sidecars.
//!
//! Layout under the root directory:
//! - `files/<file-id>.json`: full [`DiagramFile`] documents
//! - `index.json`: [`FileSummary`] list used for listing without reading version payloads
//! - `recent.json`: recently opened file ids, most recent first

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::backend::{StorageBackend, StoreError};
use crate::model::{DiagramFile, FileId, FileSummary};

const FILES_DIR: &str = "files";
const INDEX_FILENAME: &str = "index.json";
const RECENT_FILENAME: &str = "recent.json";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug, Clone)]
pub struct FolderBackend {
    root: PathBuf,
    durability: WriteDurability,
}

impl FolderBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_path(&self, file_id: &FileId) -> PathBuf {
        let file_stem = encode_persisted_id_segment(file_id.as_str());
        self.root.join(FILES_DIR).join(format!("{file_stem}.json"))
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILENAME)
    }

    pub fn recent_path(&self) -> PathBuf {
        self.root.join(RECENT_FILENAME)
    }

    fn load_index(&self) -> Result<Option<Vec<FileSummary>>, StoreError> {
        read_json(&self.index_path())
    }

    fn save_index(&self, index: &[FileSummary]) -> Result<(), StoreError> {
        write_json(&self.root, &self.index_path(), &index, self.durability)
    }

    /// Rebuilds `index.json` from the documents under `files/`.
    pub fn rebuild_index(&self) -> Result<Vec<FileSummary>, StoreError> {
        let files_dir = self.root.join(FILES_DIR);
        let entries = match fs::read_dir(&files_dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: files_dir,
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: files_dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_document = path.extension().is_some_and(|ext| ext == "json")
                && !path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(".vellum.tmp."));
            if is_document {
                paths.push(path);
            }
        }
        paths.sort();

        let mut index = Vec::with_capacity(paths.len());
        for path in paths {
            match read_json::<DiagramFile>(&path) {
                Ok(Some(file)) => index.push(file.summary()),
                Ok(None) => {}
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable file"),
            }
        }

        self.save_index(&index)?;
        debug!(files = index.len(), "rebuilt file index");
        Ok(index)
    }

    fn index_or_rebuild(&self) -> Result<Vec<FileSummary>, StoreError> {
        match self.load_index()? {
            Some(index) => Ok(index),
            None => self.rebuild_index(),
        }
    }
}

impl StorageBackend for FolderBackend {
    fn load_file(&self, file_id: &FileId) -> Result<Option<DiagramFile>, StoreError> {
        read_json(&self.file_path(file_id))
    }

    fn save_file(&mut self, file: &DiagramFile) -> Result<(), StoreError> {
        write_json(&self.root, &self.file_path(file.id()), file, self.durability)?;

        let mut index = self.index_or_rebuild()?;
        let summary = file.summary();
        match index.iter_mut().find(|entry| &entry.id == file.id()) {
            Some(entry) => *entry = summary,
            None => index.push(summary),
        }
        self.save_index(&index)
    }

    fn remove_file(&mut self, file_id: &FileId) -> Result<bool, StoreError> {
        let path = self.file_path(file_id);
        let removed = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(source) if source.kind() == io::ErrorKind::NotFound => false,
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut index = self.index_or_rebuild()?;
        let before = index.len();
        index.retain(|entry| &entry.id != file_id);
        if index.len() != before {
            self.save_index(&index)?;
        }

        Ok(removed)
    }

    fn file_ids(&self) -> Result<Vec<FileId>, StoreError> {
        Ok(self
            .index_or_rebuild()?
            .into_iter()
            .map(|summary| summary.id)
            .collect())
    }

    fn list_summaries(&self) -> Result<Vec<FileSummary>, StoreError> {
        self.index_or_rebuild()
    }

    fn load_recent(&self) -> Result<Vec<FileId>, StoreError> {
        let raw: Vec<String> = read_json(&self.recent_path())?.unwrap_or_default();
        raw.into_iter()
            .map(|value| {
                FileId::new(value.clone()).map_err(|source| StoreError::InvalidId { value, source })
            })
            .collect()
    }

    fn save_recent(&mut self, recent: &[FileId]) -> Result<(), StoreError> {
        write_json(&self.root, &self.recent_path(), &recent, self.durability)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize + ?Sized>(
    root: &Path,
    path: &Path,
    value: &T,
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(root, path, format!("{json}\n").as_bytes(), durability)
}

fn encode_persisted_id_segment(segment: &str) -> String {
    if !needs_windows_safe_filename_segment_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn needs_windows_safe_filename_segment_encoding(segment: &str) -> bool {
    if segment.starts_with('~') || segment.starts_with('.') {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let trimmed = segment.trim_end_matches([' ', '.']);
    let base = trimmed.split('.').next().unwrap_or(trimmed);
    if is_windows_device_name(base) {
        return true;
    }

    segment.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || ch <= '\u{1f}'
            || ch == '\u{7f}'
    })
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => ["COM", "LPT"].iter().any(|prefix| {
            base.strip_prefix(prefix)
                .is_some_and(|num| matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9"))
        }),
    }
}

fn ensure_dir(root: &Path, dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut current = dir;
    while current != root {
        let md = fs::symlink_metadata(current).map_err(|source| StoreError::Io {
            path: current.to_path_buf(),
            source,
        })?;
        if md.file_type().is_symlink() {
            return Err(StoreError::SymlinkRefused {
                path: current.to_path_buf(),
            });
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Temp file + rename, so readers never observe a half-written document.
fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    ensure_dir(root, parent)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".vellum.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::{encode_persisted_id_segment, FolderBackend, WriteDurability};
    use crate::model::FileId;
    use crate::store::backend::StorageBackend;
    use crate::version::factory::{create_new_file, NewFileParams};

    struct Ctx {
        _tmp: TempDir,
        backend: FolderBackend,
    }

    #[fixture]
    fn ctx() -> Ctx {
        let tmp = tempfile::tempdir().expect("tempdir");
        let backend = FolderBackend::new(tmp.path().join("vault"));
        Ctx { _tmp: tmp, backend }
    }

    #[rstest]
    fn saved_files_load_back_and_are_indexed(mut ctx: Ctx) {
        let file = create_new_file(NewFileParams::named("Onboarding"));
        ctx.backend.save_file(&file).expect("save");

        let loaded = ctx.backend.load_file(file.id()).expect("load").expect("present");
        assert_eq!(loaded, file);

        let index_raw = std::fs::read_to_string(ctx.backend.index_path()).expect("index");
        assert!(index_raw.contains("Onboarding"));
        assert!(!index_raw.contains("\"elements\""));
        assert_eq!(ctx.backend.file_ids().expect("ids"), vec![file.id().clone()]);
    }

    #[rstest]
    fn missing_files_load_as_none(ctx: Ctx) {
        let missing = FileId::new("nope").unwrap();
        assert_eq!(ctx.backend.load_file(&missing).expect("load"), None);
        assert!(ctx.backend.list_summaries().expect("list").is_empty());
    }

    #[rstest]
    fn remove_updates_index_and_reports_absence(mut ctx: Ctx) {
        let file = create_new_file(NewFileParams::named("A"));
        ctx.backend.save_file(&file).expect("save");

        assert!(ctx.backend.remove_file(file.id()).expect("remove"));
        assert!(!ctx.backend.remove_file(file.id()).expect("remove again"));
        assert!(ctx.backend.list_summaries().expect("list").is_empty());
    }

    #[rstest]
    fn index_is_rebuilt_when_missing(mut ctx: Ctx) {
        let a = create_new_file(NewFileParams::named("A"));
        let b = create_new_file(NewFileParams::named("B"));
        ctx.backend.save_file(&a).expect("save a");
        ctx.backend.save_file(&b).expect("save b");
        std::fs::remove_file(ctx.backend.index_path()).expect("drop index");

        let mut names = ctx
            .backend
            .list_summaries()
            .expect("list")
            .into_iter()
            .map(|summary| summary.name)
            .collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["A", "B"]);
        assert!(ctx.backend.index_path().is_file());
    }

    #[rstest]
    fn recent_list_roundtrips(mut ctx: Ctx) {
        let ids = vec![FileId::new("b").unwrap(), FileId::new("a").unwrap()];
        ctx.backend.save_recent(&ids).expect("save recent");
        assert_eq!(ctx.backend.load_recent().expect("load recent"), ids);
    }

    #[rstest]
    fn durable_writes_still_roundtrip(ctx: Ctx) {
        let mut backend = ctx.backend.clone().with_durability(WriteDurability::Durable);
        let file = create_new_file(NewFileParams::named("Durable"));
        backend.save_file(&file).expect("save");
        assert!(backend.load_file(file.id()).expect("load").is_some());
    }

    #[cfg(unix)]
    #[rstest]
    fn refuses_to_write_through_symlinked_documents(mut ctx: Ctx) {
        let file = create_new_file(NewFileParams::named("A"));
        let path = ctx.backend.file_path(file.id());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let target = ctx.backend.root().join("elsewhere.json");
        std::fs::write(&target, "{}").unwrap();
        std::os::unix::fs::symlink(&target, &path).unwrap();

        let err = ctx.backend.save_file(&file).expect_err("symlink refused");
        assert!(matches!(err, super::StoreError::SymlinkRefused { .. }));
    }

    #[test]
    fn reserved_names_are_hex_encoded() {
        assert_eq!(encode_persisted_id_segment("file-1"), "file-1");
        assert_eq!(encode_persisted_id_segment("CON"), "~434f4e");
        assert_eq!(encode_persisted_id_segment("a:b"), "~613a62");
    }
}
