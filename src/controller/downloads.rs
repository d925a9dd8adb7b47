// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Downloads list as seen by the downloads section.

use async_stream::stream;
use futures::StreamExt;
use infopanel_data::{DownloadManager, FullMsgId, Producer};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadsEntry {
    pub item: FullMsgId,
    pub started: i64,
}

/// Snapshot of the loading list, ascending by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadsSlice {
    pub entries: Vec<DownloadsEntry>,
}

impl DownloadsSlice {
    fn from_manager(manager: &DownloadManager) -> Self {
        let mut entries: Vec<DownloadsEntry> = manager
            .loading_list()
            .into_iter()
            .map(|id| DownloadsEntry {
                item: id.object.item,
                started: id.started,
            })
            .collect();
        // Stable: equal start times keep loading-list order.
        entries.sort_by_key(|entry| entry.started);
        Self { entries }
    }
}

/// Current slice, then a fresh one after every loading-list change.
pub fn downloads_source(manager: &Arc<DownloadManager>) -> Producer<DownloadsSlice> {
    let manager = Arc::clone(manager);
    let mut changes = manager.loading_list_changes();
    Box::pin(stream! {
        yield DownloadsSlice::from_manager(&manager);
        while changes.next().await.is_some() {
            yield DownloadsSlice::from_manager(&manager);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use infopanel_data::{MsgId, PeerId};

    fn item(msg: i64) -> FullMsgId {
        FullMsgId::new(PeerId(1), MsgId(msg))
    }

    fn started(slice: &DownloadsSlice) -> Vec<i64> {
        slice.entries.iter().map(|entry| entry.started).collect()
    }

    #[tokio::test]
    async fn test_entries_sorted_by_start_time() {
        let manager = Arc::new(DownloadManager::new());
        manager.start(item(1), 30, 100);
        manager.start(item(2), 10, 100);
        manager.start(item(3), 20, 100);

        let mut source = downloads_source(&manager);
        let slice = source.next().await.expect("initial slice");
        assert_eq!(started(&slice), vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_equal_start_times_keep_list_order() {
        let manager = Arc::new(DownloadManager::new());
        manager.start(item(5), 10, 100);
        manager.start(item(4), 10, 100);

        let mut source = downloads_source(&manager);
        let slice = source.next().await.expect("initial slice");
        let items: Vec<FullMsgId> = slice.entries.iter().map(|entry| entry.item).collect();
        assert_eq!(items, vec![item(5), item(4)]);
    }

    #[tokio::test]
    async fn test_reemits_on_change() {
        let manager = Arc::new(DownloadManager::new());
        let mut source = downloads_source(&manager);
        assert!(source.next().await.expect("initial slice").entries.is_empty());

        manager.start(item(1), 50, 10);
        assert_eq!(started(&source.next().await.expect("after start")), vec![50]);

        manager.start(item(2), 5, 10);
        assert_eq!(started(&source.next().await.expect("after second start")), vec![5, 50]);

        manager.finish(item(1));
        assert_eq!(started(&source.next().await.expect("after finish")), vec![5]);
    }

    mod property_tests {
        use super::*;

        fn assert_sorted_and_stable(slice: &DownloadsSlice) {
            for pair in slice.entries.windows(2) {
                assert!(pair[0].started <= pair[1].started, "{:?}", slice);
                if pair[0].started == pair[1].started {
                    // Items were started in ascending message order.
                    assert!(pair[0].item.msg < pair[1].item.msg, "{:?}", slice);
                }
            }
        }

        proptest::proptest! {
            #[test]
            fn test_any_loading_list_is_emitted_sorted(
                started in proptest::collection::vec(0i64..20, 0..32),
                finished in proptest::collection::vec(proptest::bool::ANY, 32)
            ) {
                futures::executor::block_on(async {
                    let manager = Arc::new(DownloadManager::new());
                    for (index, started) in started.iter().enumerate() {
                        manager.start(item(index as i64), *started, 100);
                    }
                    let mut source = downloads_source(&manager);
                    let slice = source.next().await.expect("initial slice");
                    assert_eq!(slice.entries.len(), started.len());
                    assert_sorted_and_stable(&slice);

                    for index in 0..started.len() {
                        if finished[index] {
                            manager.finish(item(index as i64));
                            let slice = source.next().await.expect("slice after finish");
                            assert_sorted_and_stable(&slice);
                        }
                    }
                });
            }
        }
    }
}
