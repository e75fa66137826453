//! Versioned in-memory asset store.

use std::collections::BTreeMap;

use chrono::Utc;
use crossbeam_channel::Receiver;
use parking_lot::RwLock;

use crate::error::{Result, RuledexError};
use crate::term::AssetPath;
use crate::vfs::{AssetStore, AssetVersion, ChangeEvent, ChangeKind, ChangeNotifier, Revision};

/// Keeps every version ever written, including deletions.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    versions: RwLock<BTreeMap<AssetPath, Vec<AssetVersion>>>,
    notifier: ChangeNotifier,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn latest(versions: &[AssetVersion]) -> Option<&str> {
        versions.last().and_then(|version| version.content.as_deref())
    }

    fn push_version(
        versions: &mut BTreeMap<AssetPath, Vec<AssetVersion>>,
        path: &AssetPath,
        revision: Revision,
        content: Option<String>,
    ) {
        versions.entry(path.clone()).or_default().push(AssetVersion {
            revision,
            content,
            written_at: Utc::now(),
        });
    }
}

impl AssetStore for MemoryAssetStore {
    fn write(&self, path: &AssetPath, content: &str) -> Result<Revision> {
        let mut versions = self.versions.write();
        let exists = versions
            .get(path)
            .is_some_and(|history| Self::latest(history).is_some());

        let revision = self.notifier.next_revision();
        Self::push_version(&mut versions, path, revision, Some(content.to_string()));
        let kind = if exists {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        self.notifier.publish(revision, kind, path.clone());
        Ok(revision)
    }

    fn read(&self, path: &AssetPath) -> Result<Option<String>> {
        Ok(self
            .versions
            .read()
            .get(path)
            .and_then(|history| Self::latest(history))
            .map(str::to_string))
    }

    fn delete(&self, path: &AssetPath) -> Result<Revision> {
        let mut versions = self.versions.write();
        if versions.get(path).and_then(|h| Self::latest(h)).is_none() {
            return Err(RuledexError::not_found(format!("asset {path}")));
        }

        let revision = self.notifier.next_revision();
        Self::push_version(&mut versions, path, revision, None);
        self.notifier.publish(revision, ChangeKind::Deleted, path.clone());
        Ok(revision)
    }

    fn rename(&self, from: &AssetPath, to: &AssetPath) -> Result<Revision> {
        let mut versions = self.versions.write();
        let content = versions
            .get(from)
            .and_then(|history| Self::latest(history))
            .map(str::to_string)
            .ok_or_else(|| RuledexError::not_found(format!("asset {from}")))?;
        if from == to {
            return Err(RuledexError::invalid_argument(format!(
                "cannot rename {from} onto itself"
            )));
        }

        let revision = self.notifier.next_revision();
        Self::push_version(&mut versions, from, revision, None);
        Self::push_version(&mut versions, to, revision, Some(content));
        self.notifier.publish(
            revision,
            ChangeKind::Renamed { from: from.clone() },
            to.clone(),
        );
        Ok(revision)
    }

    fn list(&self) -> Result<Vec<AssetPath>> {
        Ok(self
            .versions
            .read()
            .iter()
            .filter(|(_, history)| Self::latest(history).is_some())
            .map(|(path, _)| path.clone())
            .collect())
    }

    fn history(&self, path: &AssetPath) -> Result<Vec<AssetVersion>> {
        Ok(self.versions.read().get(path).cloned().unwrap_or_default())
    }

    fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    fn last_revision(&self) -> Revision {
        self.notifier.last_revision()
    }
}
