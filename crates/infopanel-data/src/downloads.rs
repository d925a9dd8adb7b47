// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Download manager view of in-flight transfers.
//!
//! Only the read side matters to the info panel: the current loading list
//! and a "list changed" notification. Hosts feed it with `start`,
//! `progress` and `finish`.

use crate::ids::FullMsgId;
use crate::Producer;
use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

/// Object being downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadObject {
    /// Message owning the downloaded document.
    pub item: FullMsgId,
}

/// One entry of the loading list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadingId {
    pub object: DownloadObject,
    /// Start time in milliseconds.
    pub started: i64,
    pub ready: u64,
    pub total: u64,
}

/// Tracks in-flight downloads and notifies about list changes.
pub struct DownloadManager {
    loading: RwLock<Vec<DownloadingId>>,
    changes: broadcast::Sender<()>,
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadManager {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            loading: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Current loading list, in insertion order.
    pub fn loading_list(&self) -> Vec<DownloadingId> {
        self.loading.read().clone()
    }

    /// Fires every time the loading list changes.
    pub fn loading_list_changes(&self) -> Producer<()> {
        // A lagged receiver still means "something changed".
        BroadcastStream::new(self.changes.subscribe())
            .map(|_| ())
            .boxed()
    }

    /// Start tracking a download of `item`.
    pub fn start(&self, item: FullMsgId, started: i64, total: u64) {
        debug!("Download started for {}", item);
        self.loading.write().push(DownloadingId {
            object: DownloadObject { item },
            started,
            ready: 0,
            total,
        });
        self.notify();
    }

    /// Update progress of a tracked download. Returns `false` if unknown.
    pub fn progress(&self, item: FullMsgId, ready: u64) -> bool {
        let found = {
            let mut loading = self.loading.write();
            match loading.iter_mut().find(|entry| entry.object.item == item) {
                Some(entry) => {
                    entry.ready = ready.min(entry.total);
                    true
                }
                None => false,
            }
        };
        if found {
            self.notify();
        }
        found
    }

    /// Stop tracking `item`, finished or cancelled.
    pub fn finish(&self, item: FullMsgId) -> bool {
        let removed = {
            let mut loading = self.loading.write();
            let before = loading.len();
            loading.retain(|entry| entry.object.item != item);
            loading.len() != before
        };
        if removed {
            debug!("Download finished for {}", item);
            self.notify();
        }
        removed
    }

    fn notify(&self) {
        let _ = self.changes.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{MsgId, PeerId};

    fn item(msg: i64) -> FullMsgId {
        FullMsgId::new(PeerId(1), MsgId(msg))
    }

    #[test]
    fn test_progress_and_finish() {
        let manager = DownloadManager::new();
        manager.start(item(1), 100, 50);
        assert!(manager.progress(item(1), 80));
        assert_eq!(manager.loading_list()[0].ready, 50);
        assert!(!manager.progress(item(2), 1));
        assert!(manager.finish(item(1)));
        assert!(!manager.finish(item(1)));
        assert!(manager.loading_list().is_empty());
    }

    #[tokio::test]
    async fn test_changes_fire_per_mutation() {
        let manager = DownloadManager::new();
        let mut changes = manager.loading_list_changes();
        manager.start(item(1), 100, 10);
        manager.finish(item(1));
        assert_eq!(changes.next().await, Some(()));
        assert_eq!(changes.next().await, Some(()));
    }
}
