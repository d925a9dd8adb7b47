// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Shared-media kinds, merged timeline keys and id slices.
//!
//! A merged slice is a window over the union of a peer's media ids and its
//! migrated predecessor's media ids, expressed as [`UniversalMsgId`]s.

use crate::ids::{PeerId, UniversalMsgId};
use serde::{Deserialize, Serialize};

/// Kind of shared media list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
    PhotoVideo,
    MusicFile,
    File,
    VoiceFile,
    Link,
    ChatPhoto,
    RoundVoiceFile,
    Gif,
    RoundFile,
    Pinned,
}

impl MediaType {
    pub const ALL: [MediaType; 12] = [
        Self::Photo,
        Self::Video,
        Self::PhotoVideo,
        Self::MusicFile,
        Self::File,
        Self::VoiceFile,
        Self::Link,
        Self::ChatPhoto,
        Self::RoundVoiceFile,
        Self::Gif,
        Self::RoundFile,
        Self::Pinned,
    ];
}

/// Anchor of a merged timeline window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SparseIdsMergedKey {
    pub peer: PeerId,
    pub migrated: Option<PeerId>,
    pub universal_id: UniversalMsgId,
}

impl SparseIdsMergedKey {
    pub fn new(peer: PeerId, migrated: Option<PeerId>, universal_id: UniversalMsgId) -> Self {
        Self {
            peer,
            migrated,
            universal_id,
        }
    }
}

/// Merged timeline anchor plus the media list to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SharedMediaMergedKey {
    pub merged: SparseIdsMergedKey,
    pub media_type: MediaType,
}

impl SharedMediaMergedKey {
    pub fn new(merged: SparseIdsMergedKey, media_type: MediaType) -> Self {
        Self { merged, media_type }
    }
}

/// Which viewer produced a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOrigin {
    /// Regular history of the peer merged with its migrated peer.
    Merged,
    /// Scheduled-messages timeline of the peer.
    Scheduled,
    /// Results of a content search.
    Search,
}

/// Window of ids over a merged timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseIdsMergedSlice {
    key: SharedMediaMergedKey,
    origin: SliceOrigin,
    ids: Vec<UniversalMsgId>,
    full_count: usize,
    skipped_before: usize,
    skipped_after: usize,
}

impl SparseIdsMergedSlice {
    /// Cut a window out of `all` (sorted ascending) around the key's anchor.
    ///
    /// The anchor position is the first id not less than the anchor. The
    /// window holds up to `limit_before` ids before that position and the
    /// position itself plus up to `limit_after` ids after it.
    pub fn from_sorted(
        key: SharedMediaMergedKey,
        origin: SliceOrigin,
        all: &[UniversalMsgId],
        limit_before: usize,
        limit_after: usize,
    ) -> Self {
        let around = key.merged.universal_id;
        let position = all.partition_point(|id| *id < around);
        let from = position.saturating_sub(limit_before);
        let till = position
            .saturating_add(limit_after)
            .saturating_add(1)
            .min(all.len())
            .max(from);
        Self {
            key,
            origin,
            ids: all[from..till].to_vec(),
            full_count: all.len(),
            skipped_before: from,
            skipped_after: all.len() - till,
        }
    }

    pub fn key(&self) -> &SharedMediaMergedKey {
        &self.key
    }

    pub fn origin(&self) -> SliceOrigin {
        self.origin
    }

    pub fn ids(&self) -> &[UniversalMsgId] {
        &self.ids
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn get(&self, index: usize) -> Option<UniversalMsgId> {
        self.ids.get(index).copied()
    }

    pub fn index_of(&self, id: UniversalMsgId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// Closest id in the window to `id`, preferring the later one on ties.
    pub fn nearest(&self, id: UniversalMsgId) -> Option<UniversalMsgId> {
        let position = self.ids.partition_point(|value| *value < id);
        let after = self.ids.get(position).copied();
        let before = position.checked_sub(1).and_then(|i| self.ids.get(i).copied());
        match (before, after) {
            (Some(before), Some(after)) => {
                if id.0 - before.0 < after.0 - id.0 {
                    Some(before)
                } else {
                    Some(after)
                }
            }
            (before, after) => after.or(before),
        }
    }

    pub fn full_count(&self) -> usize {
        self.full_count
    }

    pub fn skipped_before(&self) -> usize {
        self.skipped_before
    }

    pub fn skipped_after(&self) -> usize {
        self.skipped_after
    }
}
