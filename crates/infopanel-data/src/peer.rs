// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Peer records and peer change notifications.

use crate::ids::PeerId;
use bitflags::bitflags;

/// What kind of conversation a peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    User,
    /// Basic group chat. May be migrated to a channel once.
    Chat,
    /// Supergroup or broadcast channel.
    Channel,
}

/// A peer as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerData {
    pub id: PeerId,
    pub kind: PeerKind,
    pub name: String,
    /// Channel this chat was converted into.
    pub migrate_to: Option<PeerId>,
    /// Chat this channel was converted from.
    pub migrate_from: Option<PeerId>,
}

impl PeerData {
    pub fn user(id: PeerId, name: impl Into<String>) -> Self {
        Self::new(id, PeerKind::User, name)
    }

    pub fn chat(id: PeerId, name: impl Into<String>) -> Self {
        Self::new(id, PeerKind::Chat, name)
    }

    pub fn channel(id: PeerId, name: impl Into<String>) -> Self {
        Self::new(id, PeerKind::Channel, name)
    }

    fn new(id: PeerId, kind: PeerKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            migrate_to: None,
            migrate_from: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == PeerKind::User
    }

    pub fn is_chat(&self) -> bool {
        self.kind == PeerKind::Chat
    }

    pub fn is_channel(&self) -> bool {
        self.kind == PeerKind::Channel
    }
}

bitflags! {
    /// Set of peer properties a change notification is about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PeerUpdateFlags: u32 {
        const NAME = 1 << 0;
        const MIGRATION = 1 << 1;
        const MEMBERS = 1 << 2;
    }
}

/// Notification that some properties of a peer changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerUpdate {
    pub peer: PeerId,
    pub flags: PeerUpdateFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let flags = PeerUpdateFlags::NAME | PeerUpdateFlags::MIGRATION;
        assert!(flags.contains(PeerUpdateFlags::MIGRATION));
        assert!(flags.intersects(PeerUpdateFlags::NAME | PeerUpdateFlags::MEMBERS));
        assert!(!flags.contains(PeerUpdateFlags::MEMBERS));
        assert!(PeerUpdateFlags::empty().is_empty());
        assert_eq!(PeerUpdateFlags::default(), PeerUpdateFlags::empty());
    }

    #[test]
    fn test_peer_kinds() {
        assert!(PeerData::chat(PeerId(1), "a").is_chat());
        assert!(PeerData::channel(PeerId(2), "b").is_channel());
        assert!(PeerData::user(PeerId(3), "c").is_user());
    }
}
