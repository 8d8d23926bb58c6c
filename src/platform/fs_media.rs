//! Filesystem-backed media index
//!
//! Entries live under `<root>/<relative path>/`. A pending entry is kept
//! as a hidden `.pending-<display name>` file and renamed into place when
//! it is finalized, so half-written recordings never show up under their
//! real name.

use super::traits::{MediaIndex, MediaUri, MediaValues, OutputHandle};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Collection URI entries are allocated under
pub const AUDIO_COLLECTION_URI: &str = "content://media/external_primary/audio/media";

const PENDING_PREFIX: &str = ".pending-";

/// An entry known to the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: u64,
    pub uri: MediaUri,
    pub values: MediaValues,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
struct Entries {
    next_id: u64,
    records: HashMap<u64, MediaRecord>,
}

/// Media index storing entries as plain files
#[derive(Debug)]
pub struct FsMediaIndex {
    root: PathBuf,
    entries: Mutex<Entries>,
}

impl FsMediaIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Mutex::new(Entries {
                next_id: 1,
                records: HashMap::new(),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All entries, ordered by id
    pub fn entries(&self) -> Vec<MediaRecord> {
        let mut records: Vec<MediaRecord> = self.entries.lock().records.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    pub fn record(&self, uri: &MediaUri) -> Option<MediaRecord> {
        let id = parse_id(uri)?;
        self.entries.lock().records.get(&id).cloned()
    }

    fn file_path(dir: &Path, display_name: &str, pending: bool) -> PathBuf {
        if pending {
            dir.join(format!("{PENDING_PREFIX}{display_name}"))
        } else {
            dir.join(display_name)
        }
    }

    /// Pick a display name no other entry or file in `dir` already uses
    fn unique_name(entries: &Entries, dir: &Path, display_name: &str) -> String {
        let taken = |name: &str| {
            entries.records.values().any(|r| r.values.display_name == name)
                || dir.join(name).exists()
                || dir.join(format!("{PENDING_PREFIX}{name}")).exists()
        };
        if !taken(display_name) {
            return display_name.to_string();
        }

        let (stem, ext) = match display_name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (display_name, String::new()),
        };
        (1..)
            .map(|n| format!("{stem} ({n}){ext}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| display_name.to_string())
    }

    fn create_entry(&self, values: &MediaValues) -> io::Result<MediaUri> {
        let relative = Path::new(&values.relative_path);
        if !stays_inside(relative) {
            return Err(invalid_input(format!("relative path {:?} escapes the index root", values.relative_path)));
        }
        let name = Path::new(&values.display_name);
        if name.components().count() != 1 || !stays_inside(name) {
            return Err(invalid_input(format!("display name {:?} is not a plain file name", values.display_name)));
        }

        let dir = self.root.join(relative);
        fs::create_dir_all(&dir)?;

        let mut entries = self.entries.lock();
        let display_name = Self::unique_name(&entries, &dir, &values.display_name);
        let path = Self::file_path(&dir, &display_name, values.is_pending);
        OpenOptions::new().write(true).create_new(true).open(&path)?;

        let id = entries.next_id;
        entries.next_id += 1;
        let uri = MediaUri::new(format!("{AUDIO_COLLECTION_URI}/{id}"));
        let record = MediaRecord {
            id,
            uri: uri.clone(),
            values: MediaValues {
                display_name,
                ..values.clone()
            },
            path,
        };
        entries.records.insert(id, record);
        Ok(uri)
    }
}

/// Only plain components, so joining onto the root cannot leave it
fn stays_inside(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn parse_id(uri: &MediaUri) -> Option<u64> {
    uri.as_str()
        .strip_prefix(AUDIO_COLLECTION_URI)?
        .strip_prefix('/')?
        .parse()
        .ok()
}

fn not_found(uri: &MediaUri) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no media entry for {uri}"))
}

impl MediaIndex for FsMediaIndex {
    fn insert(&self, values: &MediaValues) -> Option<MediaUri> {
        match self.create_entry(values) {
            Ok(uri) => {
                tracing::debug!(%uri, name = %values.display_name, "Media entry created");
                Some(uri)
            }
            Err(e) => {
                tracing::error!("Failed to create media entry {}: {}", values.display_name, e);
                None
            }
        }
    }

    fn open_write(&self, uri: &MediaUri) -> io::Result<Option<OutputHandle>> {
        let Some(record) = self.record(uri) else {
            return Ok(None);
        };
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&record.path)?;
        Ok(Some(OutputHandle::new(uri.clone(), Box::new(file))))
    }

    fn set_pending(&self, uri: &MediaUri, pending: bool) -> io::Result<()> {
        let id = parse_id(uri).ok_or_else(|| not_found(uri))?;
        let mut entries = self.entries.lock();
        let record = entries.records.get_mut(&id).ok_or_else(|| not_found(uri))?;
        if record.values.is_pending == pending {
            return Ok(());
        }

        let dir = record
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        let target = Self::file_path(&dir, &record.values.display_name, pending);
        fs::rename(&record.path, &target)?;
        record.path = target;
        record.values.is_pending = pending;
        Ok(())
    }

    fn delete(&self, uri: &MediaUri) -> io::Result<()> {
        let id = parse_id(uri).ok_or_else(|| not_found(uri))?;
        let mut entries = self.entries.lock();
        let record = entries.records.remove(&id).ok_or_else(|| not_found(uri))?;
        match fs::remove_file(&record.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
