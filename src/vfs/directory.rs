//! Asset store over a directory tree.
//!
//! Changes made through the store are announced; changes made to the
//! directory by other processes are not. The store is not versioned: history
//! holds the current content only.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use log::debug;
use parking_lot::Mutex;
use walkdir::WalkDir;

use crate::error::{Result, RuledexError};
use crate::term::AssetPath;
use crate::vfs::{AssetStore, AssetVersion, ChangeEvent, ChangeKind, ChangeNotifier, Revision};

#[derive(Debug)]
pub struct DirectoryAssetStore {
    root: PathBuf,
    notifier: ChangeNotifier,
    /// Revision of the last write made through this store, per path.
    revisions: Mutex<HashMap<AssetPath, Revision>>,
}

impl DirectoryAssetStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        if !root.is_dir() {
            return Err(RuledexError::invalid_argument(format!(
                "not a directory: {}",
                root.display()
            )));
        }
        Ok(DirectoryAssetStore {
            root,
            notifier: ChangeNotifier::new(),
            revisions: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File system location of `path`.
    pub fn file_path(&self, path: &AssetPath) -> PathBuf {
        let mut file = self.root.clone();
        for segment in path.as_str().split('/').filter(|s| !s.is_empty()) {
            file.push(segment);
        }
        file
    }

    fn asset_path(&self, file: &Path) -> Result<AssetPath> {
        let relative = file
            .strip_prefix(&self.root)
            .map_err(|e| RuledexError::internal(e.to_string()))?;
        let segments: Vec<String> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        AssetPath::new(&segments.join("/"))
    }

    fn write_file(file: &Path, content: &str) -> Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = file.with_extension("tmp~");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, file)?;
        Ok(())
    }
}

impl AssetStore for DirectoryAssetStore {
    fn write(&self, path: &AssetPath, content: &str) -> Result<Revision> {
        let mut revisions = self.revisions.lock();
        let file = self.file_path(path);
        let existed = file.is_file();
        Self::write_file(&file, content)?;

        let revision = self.notifier.next_revision();
        revisions.insert(path.clone(), revision);
        let kind = if existed {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        self.notifier.publish(revision, kind, path.clone());
        Ok(revision)
    }

    fn read(&self, path: &AssetPath) -> Result<Option<String>> {
        match fs::read_to_string(self.file_path(path)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, path: &AssetPath) -> Result<Revision> {
        let mut revisions = self.revisions.lock();
        match fs::remove_file(self.file_path(path)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RuledexError::not_found(format!("asset {path}")));
            }
            Err(e) => return Err(e.into()),
        }

        let revision = self.notifier.next_revision();
        revisions.remove(path);
        self.notifier.publish(revision, ChangeKind::Deleted, path.clone());
        Ok(revision)
    }

    fn rename(&self, from: &AssetPath, to: &AssetPath) -> Result<Revision> {
        let mut revisions = self.revisions.lock();
        let source = self.file_path(from);
        if !source.is_file() {
            return Err(RuledexError::not_found(format!("asset {from}")));
        }
        if from == to {
            return Err(RuledexError::invalid_argument(format!(
                "cannot rename {from} onto itself"
            )));
        }
        let target = self.file_path(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source, &target)?;

        let revision = self.notifier.next_revision();
        revisions.remove(from);
        revisions.insert(to.clone(), revision);
        self.notifier.publish(
            revision,
            ChangeKind::Renamed { from: from.clone() },
            to.clone(),
        );
        Ok(revision)
    }

    fn list(&self) -> Result<Vec<AssetPath>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| RuledexError::storage(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') || name.ends_with(".tmp~") {
                debug!("Skipping {}", entry.path().display());
                continue;
            }
            paths.push(self.asset_path(entry.path())?);
        }
        paths.sort();
        Ok(paths)
    }

    fn history(&self, path: &AssetPath) -> Result<Vec<AssetVersion>> {
        let file = self.file_path(path);
        let Some(content) = self.read(path)? else {
            return Ok(Vec::new());
        };
        let written_at: DateTime<Utc> = fs::metadata(&file)
            .and_then(|meta| meta.modified())
            .map(DateTime::from)
            .unwrap_or_else(|_| Utc::now());
        let revision = self.revisions.lock().get(path).copied().unwrap_or(0);

        Ok(vec![AssetVersion {
            revision,
            content: Some(content),
            written_at,
        }])
    }

    fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    fn last_revision(&self) -> Revision {
        self.notifier.last_revision()
    }
}
