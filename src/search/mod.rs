// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Search delegates of an info panel.
//!
//! - [`SearchFieldController`] holds the text of the query field.
//! - [`DelayedSearchController`] runs content searches over shared media,
//!   applying new queries after a short delay.

pub mod controller;
pub mod field;

pub use controller::{DelayedSearchController, SearchController};
pub use field::SearchFieldController;

use infopanel_data::{MediaType, MsgId, PeerId};

/// Parameters of a content search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub media_type: MediaType,
    pub peer_id: PeerId,
    pub migrated_peer_id: Option<PeerId>,
    pub query: String,
}

impl SearchQuery {
    /// Query with no search text for the given media list.
    pub fn empty(media_type: MediaType, peer_id: PeerId, migrated_peer_id: Option<PeerId>) -> Self {
        Self {
            media_type,
            peer_id,
            migrated_peer_id,
            query: String::new(),
        }
    }
}

/// Search state kept in a media memento across navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSearchState {
    pub query: SearchQuery,
    /// Results found in the main peer, if a search had run.
    pub peer_list: Option<Vec<MsgId>>,
    /// Results found in the migrated peer, if a search had run.
    pub migrated_list: Option<Vec<MsgId>>,
}

impl SavedSearchState {
    pub fn new(query: SearchQuery) -> Self {
        Self {
            query,
            peer_list: None,
            migrated_list: None,
        }
    }
}
