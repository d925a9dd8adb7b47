// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Identifier types shared by the session store and the info controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset applied to migrated-peer message ids inside a merged timeline.
pub const SERVER_MAX_MSG_ID: i64 = 1 << 56;

/// Identifier of a peer (user, basic chat or channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Message id local to one peer's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MsgId(pub i64);

/// Identifier of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PollId(pub u64);

/// Globally unique message reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FullMsgId {
    pub peer: PeerId,
    pub msg: MsgId,
}

impl FullMsgId {
    pub fn new(peer: PeerId, msg: MsgId) -> Self {
        Self { peer, msg }
    }
}

impl fmt::Display for FullMsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.peer, self.msg.0)
    }
}

/// Position of a message in the merged timeline of a peer and its
/// migrated predecessor.
///
/// Messages of the main peer keep their own id. Messages of the migrated
/// peer are shifted down by [`SERVER_MAX_MSG_ID`], so the whole migrated
/// history sorts before the main one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniversalMsgId(pub i64);

impl UniversalMsgId {
    /// Universal id of a message from the main peer.
    pub fn from_main(msg: MsgId) -> Self {
        Self(msg.0)
    }

    /// Universal id of a message from the migrated peer.
    pub fn from_migrated(msg: MsgId) -> Self {
        Self(msg.0 - SERVER_MAX_MSG_ID)
    }

    /// Whether this id points into the migrated peer's history.
    pub fn is_migrated(self) -> bool {
        self.0 < 0
    }

    /// Message id inside the owning peer's history.
    pub fn local(self) -> MsgId {
        if self.is_migrated() {
            MsgId(self.0 + SERVER_MAX_MSG_ID)
        } else {
            MsgId(self.0)
        }
    }

    /// Resolve to a full id given the merged pair of peers.
    pub fn resolve(self, peer: PeerId, migrated: Option<PeerId>) -> Option<FullMsgId> {
        if self.is_migrated() {
            migrated.map(|migrated| FullMsgId::new(migrated, self.local()))
        } else {
            Some(FullMsgId::new(peer, self.local()))
        }
    }
}
