// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-memory session store.
//!
//! Holds peers, messages and polls, keeps the shared-media index of every
//! peer up to date, and publishes change notifications that the live
//! viewers re-evaluate on.
//!
//! # Notifications
//!
//! ```text
//! add_message / remove_message ──► media_updates ──► merged / scheduled viewers
//! add_peer / migrate           ──► peer_updates  ──► peer_flags_value()
//! ```

use crate::ids::{FullMsgId, MsgId, PeerId, PollId, UniversalMsgId};
use crate::message::{MessageData, PollData};
use crate::peer::{PeerData, PeerUpdate, PeerUpdateFlags};
use crate::shared_media::{MediaType, SharedMediaMergedKey, SliceOrigin, SparseIdsMergedSlice};
use crate::Producer;
use async_stream::stream;
use futures::StreamExt;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// Capacity of the change notification channels.
const UPDATES_CAPACITY: usize = 256;

/// Notification that the shared media of a peer changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedMediaUpdate {
    pub peer: PeerId,
    /// Whether the change was in the scheduled timeline.
    pub scheduled: bool,
}

#[derive(Default)]
struct Store {
    peers: HashMap<PeerId, PeerData>,
    messages: HashMap<FullMsgId, MessageData>,
    scheduled_messages: HashMap<FullMsgId, MessageData>,
    polls: HashMap<PollId, PollData>,
    history_media: HashMap<(PeerId, MediaType), BTreeSet<MsgId>>,
    scheduled_media: HashMap<(PeerId, MediaType), BTreeSet<MsgId>>,
}

impl Store {
    fn messages_for(&mut self, scheduled: bool) -> &mut HashMap<FullMsgId, MessageData> {
        if scheduled {
            &mut self.scheduled_messages
        } else {
            &mut self.messages
        }
    }

    fn index_for(&mut self, scheduled: bool) -> &mut HashMap<(PeerId, MediaType), BTreeSet<MsgId>> {
        if scheduled {
            &mut self.scheduled_media
        } else {
            &mut self.history_media
        }
    }

    fn media_ids(&self, scheduled: bool, peer: PeerId, media_type: MediaType) -> Option<&BTreeSet<MsgId>> {
        let index = if scheduled {
            &self.scheduled_media
        } else {
            &self.history_media
        };
        index.get(&(peer, media_type))
    }
}

/// Session data shared by every info panel of one account.
pub struct Session {
    store: RwLock<Store>,
    peer_updates: broadcast::Sender<PeerUpdate>,
    media_updates: broadcast::Sender<SharedMediaUpdate>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        let (peer_updates, _) = broadcast::channel(UPDATES_CAPACITY);
        let (media_updates, _) = broadcast::channel(UPDATES_CAPACITY);
        Self {
            store: RwLock::new(Store::default()),
            peer_updates,
            media_updates,
        }
    }

    // ==================== Peers ====================

    /// Insert or replace a peer.
    pub fn add_peer(&self, peer: PeerData) {
        let id = peer.id;
        let replaced = self.store.write().peers.insert(id, peer).is_some();
        if replaced {
            self.notify_peer(id, PeerUpdateFlags::NAME);
        }
    }

    pub fn peer(&self, id: PeerId) -> Option<PeerData> {
        self.store.read().peers.get(&id).cloned()
    }

    /// Record that basic chat `chat` was converted into `channel`.
    ///
    /// Returns `false` if either peer is unknown.
    pub fn migrate(&self, chat: PeerId, channel: PeerId) -> bool {
        {
            let mut store = self.store.write();
            if !store.peers.contains_key(&chat) || !store.peers.contains_key(&channel) {
                warn!("Cannot migrate {} to {}: unknown peer", chat, channel);
                return false;
            }
            if let Some(peer) = store.peers.get_mut(&chat) {
                peer.migrate_to = Some(channel);
            }
            if let Some(peer) = store.peers.get_mut(&channel) {
                peer.migrate_from = Some(chat);
            }
        }
        debug!("Migrated {} to {}", chat, channel);
        self.notify_peer(chat, PeerUpdateFlags::MIGRATION);
        self.notify_peer(channel, PeerUpdateFlags::MIGRATION);
        true
    }

    /// Publish a peer change notification.
    pub fn notify_peer(&self, peer: PeerId, flags: PeerUpdateFlags) {
        // No receivers is fine.
        let _ = self.peer_updates.send(PeerUpdate { peer, flags });
    }

    /// Changes of `peer` touching any of `flags`, starting with one
    /// notification for the current state.
    pub fn peer_flags_value(&self, peer: PeerId, flags: PeerUpdateFlags) -> Producer<PeerUpdate> {
        let changes = BroadcastStream::new(self.peer_updates.subscribe()).filter_map(move |update| {
            let result = match update {
                Ok(update) if update.peer == peer && update.flags.intersects(flags) => Some(update),
                Ok(_) => None,
                Err(lagged) => {
                    warn!("Peer updates lagged for {}: {}", peer, lagged);
                    Some(PeerUpdate { peer, flags })
                }
            };
            futures::future::ready(result)
        });
        futures::stream::once(futures::future::ready(PeerUpdate { peer, flags }))
            .chain(changes)
            .boxed()
    }

    // ==================== Messages ====================

    /// Insert or replace a message and update the shared-media index.
    ///
    /// Scheduled messages live in their own timeline: a scheduled message
    /// never replaces a regular one with the same id, or the other way round.
    pub fn add_message(&self, message: MessageData) {
        let id = message.id;
        let scheduled = message.scheduled;
        {
            let mut store = self.store.write();
            if let Some(previous) = store.messages_for(scheduled).remove(&id) {
                Self::unindex(&mut store, &previous);
            }
            for media_type in message.shared_media_types() {
                store
                    .index_for(scheduled)
                    .entry((id.peer, media_type))
                    .or_default()
                    .insert(id.msg);
            }
            store.messages_for(scheduled).insert(id, message);
        }
        self.notify_media(id.peer, scheduled);
    }

    /// Remove a regular message. Returns the removed message, if it existed.
    pub fn remove_message(&self, id: FullMsgId) -> Option<MessageData> {
        self.remove_from(id, false)
    }

    /// Remove a scheduled message. Returns the removed message, if it existed.
    pub fn remove_scheduled_message(&self, id: FullMsgId) -> Option<MessageData> {
        self.remove_from(id, true)
    }

    fn remove_from(&self, id: FullMsgId, scheduled: bool) -> Option<MessageData> {
        let removed = {
            let mut store = self.store.write();
            let removed = store.messages_for(scheduled).remove(&id);
            if let Some(message) = &removed {
                Self::unindex(&mut store, message);
            }
            removed
        };
        if removed.is_some() {
            self.notify_media(id.peer, scheduled);
        }
        removed
    }

    fn unindex(store: &mut Store, message: &MessageData) {
        for media_type in message.shared_media_types() {
            if let Some(ids) = store
                .index_for(message.scheduled)
                .get_mut(&(message.id.peer, media_type))
            {
                ids.remove(&message.id.msg);
            }
        }
    }

    fn notify_media(&self, peer: PeerId, scheduled: bool) {
        let _ = self.media_updates.send(SharedMediaUpdate { peer, scheduled });
    }

    pub fn message(&self, peer: PeerId, msg: MsgId) -> Option<MessageData> {
        self.message_by_id(FullMsgId::new(peer, msg))
    }

    /// Regular message with `id`.
    pub fn message_by_id(&self, id: FullMsgId) -> Option<MessageData> {
        self.store.read().messages.get(&id).cloned()
    }

    /// Scheduled message with `id`.
    pub fn scheduled_message(&self, id: FullMsgId) -> Option<MessageData> {
        self.store.read().scheduled_messages.get(&id).cloned()
    }

    // ==================== Polls ====================

    pub fn add_poll(&self, poll: PollData) {
        self.store.write().polls.insert(poll.id, poll);
    }

    pub fn poll(&self, id: PollId) -> Option<PollData> {
        self.store.read().polls.get(&id).cloned()
    }

    // ==================== Shared media ====================

    /// All ids of `media_type` in the merged history of `peer` and
    /// `migrated`, ascending.
    pub fn merged_media_ids(
        &self,
        peer: PeerId,
        migrated: Option<PeerId>,
        media_type: MediaType,
    ) -> Vec<UniversalMsgId> {
        let store = self.store.read();
        let mut result = Vec::new();
        if let Some(migrated) = migrated {
            if let Some(ids) = store.media_ids(false, migrated, media_type) {
                result.extend(ids.iter().map(|id| UniversalMsgId::from_migrated(*id)));
            }
        }
        if let Some(ids) = store.media_ids(false, peer, media_type) {
            result.extend(ids.iter().map(|id| UniversalMsgId::from_main(*id)));
        }
        result
    }

    /// All ids of `media_type` in the scheduled timeline of `peer`, ascending.
    pub fn scheduled_media_ids(&self, peer: PeerId, media_type: MediaType) -> Vec<UniversalMsgId> {
        self.store
            .read()
            .media_ids(true, peer, media_type)
            .map(|ids| ids.iter().map(|id| UniversalMsgId::from_main(*id)).collect())
            .unwrap_or_default()
    }

    /// Ids of regular messages of `peer` in the `media_type` list whose text
    /// contains `query`, ignoring case. Ascending.
    pub fn search_media(&self, peer: PeerId, media_type: MediaType, query: &str) -> Vec<MsgId> {
        let needle = query.to_lowercase();
        let store = self.store.read();
        let Some(ids) = store.media_ids(false, peer, media_type) else {
            return Vec::new();
        };
        ids.iter()
            .filter(|id| {
                store
                    .messages
                    .get(&FullMsgId::new(peer, **id))
                    .map(|message| message.text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    /// Notifications about shared-media changes of any peer.
    pub fn media_updates(&self) -> broadcast::Receiver<SharedMediaUpdate> {
        self.media_updates.subscribe()
    }

    /// Live window over the merged history media of the key's peers.
    pub fn shared_media_merged_viewer(
        self: &Arc<Self>,
        key: SharedMediaMergedKey,
        limit_before: usize,
        limit_after: usize,
    ) -> Producer<SparseIdsMergedSlice> {
        let session = Arc::clone(self);
        let build = move || {
            let all = session.merged_media_ids(key.merged.peer, key.merged.migrated, key.media_type);
            SparseIdsMergedSlice::from_sorted(key, SliceOrigin::Merged, &all, limit_before, limit_after)
        };
        let peer = key.merged.peer;
        let migrated = key.merged.migrated;
        Self::live(
            self.media_updates(),
            move |update| !update.scheduled && (update.peer == peer || Some(update.peer) == migrated),
            build,
        )
    }

    /// Live window over the scheduled media of the key's peer.
    pub fn shared_scheduled_media_viewer(
        self: &Arc<Self>,
        key: SharedMediaMergedKey,
        limit_before: usize,
        limit_after: usize,
    ) -> Producer<SparseIdsMergedSlice> {
        let session = Arc::clone(self);
        let build = move || {
            let all = session.scheduled_media_ids(key.merged.peer, key.media_type);
            SparseIdsMergedSlice::from_sorted(key, SliceOrigin::Scheduled, &all, limit_before, limit_after)
        };
        let peer = key.merged.peer;
        Self::live(
            self.media_updates(),
            move |update| update.scheduled && update.peer == peer,
            build,
        )
    }

    /// Emit `build()` now and again after every relevant media update.
    pub fn live<T, F, B>(
        mut updates: broadcast::Receiver<SharedMediaUpdate>,
        relevant: F,
        mut build: B,
    ) -> Producer<T>
    where
        T: Send + 'static,
        F: Fn(&SharedMediaUpdate) -> bool + Send + 'static,
        B: FnMut() -> T + Send + 'static,
    {
        Box::pin(stream! {
            yield build();
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        if relevant(&update) {
                            yield build();
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Shared media updates lagged by {} messages", skipped);
                        yield build();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MediaPayload;
    use crate::shared_media::SparseIdsMergedKey;
    use futures::StreamExt;

    fn photo(peer: u64, msg: i64, text: &str) -> MessageData {
        MessageData::new(FullMsgId::new(PeerId(peer), MsgId(msg)), text).with_media(MediaPayload::Photo)
    }

    fn session_with_migration() -> Arc<Session> {
        let session = Arc::new(Session::new());
        session.add_peer(PeerData::chat(PeerId(1), "Old chat"));
        session.add_peer(PeerData::channel(PeerId(2), "Supergroup"));
        session.migrate(PeerId(1), PeerId(2));
        session.add_message(photo(1, 10, "old"));
        session.add_message(photo(1, 11, "old cat"));
        session.add_message(photo(2, 1, "new"));
        session
    }

    #[test]
    fn test_migrate_links_both_peers() {
        let session = session_with_migration();
        assert_eq!(session.peer(PeerId(1)).and_then(|p| p.migrate_to), Some(PeerId(2)));
        assert_eq!(session.peer(PeerId(2)).and_then(|p| p.migrate_from), Some(PeerId(1)));
        assert!(!session.migrate(PeerId(1), PeerId(99)));
    }

    #[test]
    fn test_merged_ids_put_migrated_first() {
        let session = session_with_migration();
        let ids = session.merged_media_ids(PeerId(2), Some(PeerId(1)), MediaType::Photo);
        assert_eq!(
            ids,
            vec![
                UniversalMsgId::from_migrated(MsgId(10)),
                UniversalMsgId::from_migrated(MsgId(11)),
                UniversalMsgId::from_main(MsgId(1)),
            ]
        );
        assert_eq!(session.merged_media_ids(PeerId(2), None, MediaType::Photo).len(), 1);
        assert!(session.merged_media_ids(PeerId(2), None, MediaType::File).is_empty());
    }

    #[test]
    fn test_remove_message_unindexes() {
        let session = session_with_migration();
        let removed = session.remove_message(FullMsgId::new(PeerId(2), MsgId(1)));
        assert!(removed.is_some());
        assert!(session.merged_media_ids(PeerId(2), None, MediaType::PhotoVideo).is_empty());
    }

    #[test]
    fn test_search_media_ignores_case() {
        let session = session_with_migration();
        assert_eq!(session.search_media(PeerId(1), MediaType::Photo, "CAT"), vec![MsgId(11)]);
        assert!(session.search_media(PeerId(2), MediaType::Photo, "cat").is_empty());
    }

    #[test]
    fn test_scheduled_kept_apart() {
        let session = session_with_migration();
        session.add_message(photo(2, 500, "later").scheduled());
        assert_eq!(session.merged_media_ids(PeerId(2), None, MediaType::Photo).len(), 1);
        assert_eq!(
            session.scheduled_media_ids(PeerId(2), MediaType::Photo),
            vec![UniversalMsgId(500)]
        );
    }

    #[test]
    fn test_scheduled_does_not_replace_regular_with_same_id() {
        let session = session_with_migration();
        session.add_message(photo(2, 1, "later").scheduled());

        assert_eq!(
            session.merged_media_ids(PeerId(2), None, MediaType::Photo),
            vec![UniversalMsgId::from_main(MsgId(1))]
        );
        assert_eq!(
            session.scheduled_media_ids(PeerId(2), MediaType::Photo),
            vec![UniversalMsgId(1)]
        );
        let id = FullMsgId::new(PeerId(2), MsgId(1));
        assert_eq!(session.message_by_id(id).map(|m| m.text), Some("new".to_string()));
        assert_eq!(session.scheduled_message(id).map(|m| m.text), Some("later".to_string()));

        assert!(session.remove_scheduled_message(id).is_some());
        assert!(session.scheduled_media_ids(PeerId(2), MediaType::Photo).is_empty());
        assert_eq!(session.merged_media_ids(PeerId(2), None, MediaType::Photo).len(), 1);
    }

    #[tokio::test]
    async fn test_merged_viewer_reemits_on_change() {
        let session = session_with_migration();
        let key = SharedMediaMergedKey::new(
            SparseIdsMergedKey::new(PeerId(2), Some(PeerId(1)), UniversalMsgId(1)),
            MediaType::Photo,
        );
        let mut viewer = session.shared_media_merged_viewer(key, 10, 10);
        let first = viewer.next().await.expect("initial slice");
        assert_eq!(first.full_count(), 3);
        assert_eq!(first.origin(), SliceOrigin::Merged);

        // Scheduled changes do not touch the history viewer.
        session.add_message(photo(2, 700, "later").scheduled());
        session.add_message(photo(2, 2, "newer"));
        let second = viewer.next().await.expect("updated slice");
        assert_eq!(second.full_count(), 4);
    }

    #[tokio::test]
    async fn test_peer_flags_value_starts_with_current() {
        let session = session_with_migration();
        let mut updates = session.peer_flags_value(PeerId(1), PeerUpdateFlags::MIGRATION);
        let first = updates.next().await.expect("initial");
        assert_eq!(first.peer, PeerId(1));

        session.notify_peer(PeerId(1), PeerUpdateFlags::NAME);
        session.notify_peer(PeerId(3), PeerUpdateFlags::MIGRATION);
        session.notify_peer(PeerId(1), PeerUpdateFlags::MIGRATION);
        let next = updates.next().await.expect("migration update");
        assert_eq!(next.flags, PeerUpdateFlags::MIGRATION);
        assert_eq!(next.peer, PeerId(1));
    }
}
