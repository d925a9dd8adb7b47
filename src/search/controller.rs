// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content search over a peer's shared media.
//!
//! [`SearchController`] keeps one result list per query it has seen.
//! [`DelayedSearchController`] sits in front of it and waits a moment
//! before applying a query that is not cached yet, so typing does not start
//! a search per keystroke.

use super::{SavedSearchState, SearchQuery};
use infopanel_data::{
    MsgId, Producer, Session, SharedMediaMergedKey, SliceOrigin, SparseIdsMergedKey,
    SparseIdsMergedSlice, UniversalMsgId,
};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, trace};

/// Results of one query.
#[derive(Debug, Clone, Default)]
struct CacheEntry {
    peer_list: Vec<MsgId>,
    migrated_list: Option<Vec<MsgId>>,
}

impl CacheEntry {
    fn merged(&self) -> Vec<UniversalMsgId> {
        let mut result: Vec<UniversalMsgId> = self
            .migrated_list
            .iter()
            .flatten()
            .map(|id| UniversalMsgId::from_migrated(*id))
            .collect();
        result.extend(self.peer_list.iter().map(|id| UniversalMsgId::from_main(*id)));
        result
    }
}

fn run_search(session: &Session, query: &SearchQuery) -> CacheEntry {
    if query.query.is_empty() {
        return CacheEntry::default();
    }
    CacheEntry {
        peer_list: session.search_media(query.peer_id, query.media_type, &query.query),
        migrated_list: query
            .migrated_peer_id
            .map(|migrated| session.search_media(migrated, query.media_type, &query.query)),
    }
}

/// Searches the session's local media index and caches results per query.
pub struct SearchController {
    session: Arc<Session>,
    cache: HashMap<SearchQuery, CacheEntry>,
    current: SearchQuery,
}

impl SearchController {
    /// Create a controller positioned at the saved state.
    pub fn new(session: Arc<Session>, state: SavedSearchState) -> Self {
        let mut result = Self {
            session,
            cache: HashMap::new(),
            current: state.query.clone(),
        };
        result.restore_state(state);
        result
    }

    /// Make `query` current, searching if it is not cached.
    ///
    /// An empty query drops every cached result.
    pub fn set_query(&mut self, query: SearchQuery) {
        if query.query.is_empty() {
            self.cache.clear();
        }
        if !self.cache.contains_key(&query) {
            let entry = run_search(&self.session, &query);
            trace!("Search for {:?} found {} ids", query.query, entry.peer_list.len());
            self.cache.insert(query.clone(), entry);
        }
        self.current = query;
    }

    pub fn query(&self) -> &SearchQuery {
        &self.current
    }

    /// Whether applying `query` needs no new search.
    pub fn has_in_cache(&self, query: &SearchQuery) -> bool {
        query.query.is_empty() || self.cache.contains_key(query)
    }

    /// Cached merged results of `query`.
    fn cached_ids(&self, query: &SearchQuery) -> Option<Vec<UniversalMsgId>> {
        self.cache.get(query).map(CacheEntry::merged)
    }

    pub fn save_state(&self) -> SavedSearchState {
        let entry = self.cache.get(&self.current);
        SavedSearchState {
            query: self.current.clone(),
            peer_list: entry.map(|entry| entry.peer_list.clone()),
            migrated_list: entry.and_then(|entry| entry.migrated_list.clone()),
        }
    }

    /// Make the saved query current, reusing saved results when present.
    pub fn restore_state(&mut self, state: SavedSearchState) {
        let entry = match state.peer_list {
            Some(peer_list) => CacheEntry {
                peer_list,
                migrated_list: state.migrated_list,
            },
            None => run_search(&self.session, &state.query),
        };
        self.cache.insert(state.query.clone(), entry);
        self.current = state.query;
    }
}

struct DelayedInner {
    controller: SearchController,
    next_query: Option<SearchQuery>,
    timer: Option<JoinHandle<()>>,
}

impl DelayedInner {
    fn cancel_timer(&mut self) {
        self.next_query = None;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Content-search delegate of a media section.
///
/// Shared between the controller and the field-to-search subscription, so
/// it lives in an `Arc`. Setting a query needs a tokio runtime for the delay
/// timer.
pub struct DelayedSearchController {
    session: Arc<Session>,
    delay: Duration,
    inner: Mutex<DelayedInner>,
    current_query_changes: watch::Sender<String>,
}

impl DelayedSearchController {
    pub fn new(session: Arc<Session>, delay: Duration, state: SavedSearchState) -> Arc<Self> {
        let (current_query_changes, _) = watch::channel(state.query.query.clone());
        Arc::new(Self {
            session: Arc::clone(&session),
            delay,
            inner: Mutex::new(DelayedInner {
                controller: SearchController::new(session, state),
                next_query: None,
                timer: None,
            }),
            current_query_changes,
        })
    }

    /// Apply `query` after the default delay.
    pub fn set_query(self: &Arc<Self>, query: SearchQuery) {
        self.set_query_delayed(query, self.delay);
    }

    /// Apply `query` after `delay`, or at once if it is cached.
    ///
    /// A newer query replaces a pending one and restarts the delay.
    pub fn set_query_delayed(self: &Arc<Self>, query: SearchQuery, delay: Duration) {
        let mut inner = self.inner.lock();
        if *inner.controller.query() == query {
            inner.cancel_timer();
            return;
        }
        if inner.controller.has_in_cache(&query) {
            drop(inner);
            self.set_query_fast(query);
            return;
        }
        debug!("Delaying search for {:?} by {:?}", query.query, delay);
        inner.cancel_timer();
        inner.next_query = Some(query);
        let weak: Weak<Self> = Arc::downgrade(self);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(this) = weak.upgrade() {
                this.apply_next_query();
            }
        }));
    }

    /// Apply `query` now.
    pub fn set_query_fast(&self, query: SearchQuery) {
        let text = query.query.clone();
        {
            let mut inner = self.inner.lock();
            inner.cancel_timer();
            inner.controller.set_query(query);
        }
        self.current_query_changes.send_replace(text);
    }

    fn apply_next_query(&self) {
        let query = {
            let mut inner = self.inner.lock();
            inner.timer = None;
            inner.next_query.take()
        };
        if let Some(query) = query {
            self.set_query_fast(query);
        }
    }

    /// Query that is currently applied (not a pending one).
    pub fn current_query(&self) -> SearchQuery {
        self.inner.lock().controller.query().clone()
    }

    /// Text of the applied query, then the text of every applied change.
    pub fn current_query_value(&self) -> Producer<String> {
        WatchStream::new(self.current_query_changes.subscribe()).boxed()
    }

    pub fn has_in_cache(&self, query: &SearchQuery) -> bool {
        self.inner.lock().controller.has_in_cache(query)
    }

    /// Query waiting for its delay to pass, if any.
    pub fn pending_query(&self) -> Option<SearchQuery> {
        self.inner.lock().next_query.clone()
    }

    /// Live window over the results of the applied query.
    ///
    /// Starts from the cached results, then searches again whenever the
    /// shared media of either searched peer changes.
    pub fn ids_slice(
        &self,
        around: UniversalMsgId,
        limit_before: usize,
        limit_after: usize,
    ) -> Producer<SparseIdsMergedSlice> {
        let (query, mut cached) = {
            let inner = self.inner.lock();
            let query = inner.controller.query().clone();
            let cached = inner.controller.cached_ids(&query);
            (query, cached)
        };
        let key = SharedMediaMergedKey::new(
            SparseIdsMergedKey::new(query.peer_id, query.migrated_peer_id, around),
            query.media_type,
        );
        let peer = query.peer_id;
        let migrated = query.migrated_peer_id;
        let session = Arc::clone(&self.session);
        Session::live(
            self.session.media_updates(),
            move |update| !update.scheduled && (update.peer == peer || Some(update.peer) == migrated),
            move || {
                let all = cached
                    .take()
                    .unwrap_or_else(|| run_search(&session, &query).merged());
                SparseIdsMergedSlice::from_sorted(key, SliceOrigin::Search, &all, limit_before, limit_after)
            },
        )
    }

    /// State to store in a memento. A pending query wins over the applied
    /// one; its results are not known yet.
    pub fn save_state(&self) -> SavedSearchState {
        let inner = self.inner.lock();
        match &inner.next_query {
            Some(next) => SavedSearchState::new(next.clone()),
            None => inner.controller.save_state(),
        }
    }

    pub fn restore_state(&self, state: SavedSearchState) {
        let text = state.query.query.clone();
        {
            let mut inner = self.inner.lock();
            inner.cancel_timer();
            inner.controller.restore_state(state);
        }
        self.current_query_changes.send_replace(text);
    }
}

impl Drop for DelayedSearchController {
    fn drop(&mut self) {
        self.inner.get_mut().cancel_timer();
    }
}
