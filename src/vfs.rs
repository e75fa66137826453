//! Asset stores: where rule assets live and how changes to them are announced.
//!
//! Every mutating call returns the store-wide [`Revision`] of the change and
//! publishes a [`ChangeEvent`] carrying the same number to every subscriber.
//! Events are published in revision order.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::trace;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::term::AssetPath;

pub mod directory;
pub mod memory;

pub use directory::DirectoryAssetStore;
pub use memory::MemoryAssetStore;

/// Store-wide sequence number of a change.
pub type Revision = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed { from: AssetPath },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub sequence: Revision,
    pub kind: ChangeKind,
    pub path: AssetPath,
}

/// One stored version of an asset. `content` is `None` for a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetVersion {
    pub revision: Revision,
    pub content: Option<String>,
    pub written_at: DateTime<Utc>,
}

pub trait AssetStore: Send + Sync + Debug {
    /// Create or overwrite the asset at `path`.
    fn write(&self, path: &AssetPath, content: &str) -> Result<Revision>;

    /// Latest content, or `None` if nothing is stored at `path`.
    fn read(&self, path: &AssetPath) -> Result<Option<String>>;

    /// Delete the asset at `path`; fails if it does not exist.
    fn delete(&self, path: &AssetPath) -> Result<Revision>;

    /// Move the asset at `from` to `to`, replacing anything stored there.
    fn rename(&self, from: &AssetPath, to: &AssetPath) -> Result<Revision>;

    /// Paths of all stored assets, sorted.
    fn list(&self) -> Result<Vec<AssetPath>>;

    /// Known versions of `path`, oldest first.
    fn history(&self, path: &AssetPath) -> Result<Vec<AssetVersion>>;

    /// Receive every change published after this call.
    fn subscribe(&self) -> Receiver<ChangeEvent>;

    /// Revision of the latest change, 0 if none.
    fn last_revision(&self) -> Revision;
}

/// Sequence counter and subscriber fan-out shared by the store backends.
///
/// Callers publish while holding their own write lock so that revisions
/// and delivery order agree.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    sequence: AtomicU64,
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    pub fn last_revision(&self) -> Revision {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Take the next revision without announcing anything.
    pub fn next_revision(&self) -> Revision {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Announce a change made under `revision`.
    pub fn publish(&self, revision: Revision, kind: ChangeKind, path: AssetPath) {
        let event = ChangeEvent {
            sequence: revision,
            kind,
            path,
        };
        trace!("Publishing {event:?}");

        // Disconnected subscribers are dropped.
        self.subscribers
            .lock()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_fans_out_in_order() {
        let notifier = ChangeNotifier::new();
        let first = notifier.subscribe();
        let second = notifier.subscribe();
        let path = AssetPath::new("a.scgd").unwrap();

        for kind in [ChangeKind::Added, ChangeKind::Modified] {
            let revision = notifier.next_revision();
            notifier.publish(revision, kind, path.clone());
        }

        let sequences: Vec<Revision> = first.try_iter().map(|event| event.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(second.try_iter().count(), 2);
        assert_eq!(notifier.last_revision(), 2);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let notifier = ChangeNotifier::new();
        drop(notifier.subscribe());
        let alive = notifier.subscribe();

        let revision = notifier.next_revision();
        notifier.publish(revision, ChangeKind::Deleted, AssetPath::new("a").unwrap());

        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(alive.recv().unwrap().kind, ChangeKind::Deleted);
    }

    #[test]
    fn test_change_event_json() {
        let event = ChangeEvent {
            sequence: 4,
            kind: ChangeKind::Renamed {
                from: AssetPath::new("a.rdrl").unwrap(),
            },
            path: AssetPath::new("b.rdrl").unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["kind"], "renamed");
        assert_eq!(json["kind"]["from"], "/a.rdrl");
    }
}
