// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Identity of the subject an info panel shows.

use infopanel_data::{FullMsgId, PeerId, PollId};
use std::fmt;

/// What an info panel is about. Exactly one variant is active.
///
/// Ids are non-owning handles into the [`Session`](infopanel_data::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A conversation: user, chat or channel.
    Peer(PeerId),
    /// Settings owned by the given (self) user.
    Settings { self_user: PeerId },
    /// The global downloads list.
    Downloads,
    /// Results of a poll, anchored to the message that posted it.
    Poll { poll: PollId, context: FullMsgId },
}

impl Key {
    pub fn peer(&self) -> Option<PeerId> {
        match self {
            Self::Peer(peer) => Some(*peer),
            _ => None,
        }
    }

    pub fn settings_self(&self) -> Option<PeerId> {
        match self {
            Self::Settings { self_user } => Some(*self_user),
            _ => None,
        }
    }

    pub fn is_downloads(&self) -> bool {
        matches!(self, Self::Downloads)
    }

    pub fn poll(&self) -> Option<PollId> {
        match self {
            Self::Poll { poll, .. } => Some(*poll),
            _ => None,
        }
    }

    pub fn poll_context_id(&self) -> Option<FullMsgId> {
        match self {
            Self::Poll { context, .. } => Some(*context),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peer(peer) => write!(f, "{}", peer),
            Self::Settings { self_user } => write!(f, "settings of {}", self_user),
            Self::Downloads => write!(f, "downloads"),
            Self::Poll { poll, context } => write!(f, "poll#{} in {}", poll.0, context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infopanel_data::MsgId;

    fn present(key: &Key) -> [bool; 4] {
        [
            key.peer().is_some(),
            key.settings_self().is_some(),
            key.is_downloads(),
            key.poll().is_some(),
        ]
    }

    #[test]
    fn test_exactly_one_accessor_present() {
        let context = FullMsgId::new(PeerId(5), MsgId(77));
        let keys = [
            Key::Peer(PeerId(1)),
            Key::Settings { self_user: PeerId(2) },
            Key::Downloads,
            Key::Poll { poll: PollId(3), context },
        ];
        for (index, key) in keys.iter().enumerate() {
            let flags = present(key);
            assert_eq!(flags.iter().filter(|flag| **flag).count(), 1, "{key}");
            assert!(flags[index], "{key}");
        }
    }

    #[test]
    fn test_poll_context_only_for_polls() {
        let context = FullMsgId::new(PeerId(5), MsgId(77));
        let key = Key::Poll { poll: PollId(3), context };
        assert_eq!(key.poll(), Some(PollId(3)));
        assert_eq!(key.poll_context_id(), Some(context));
        assert_eq!(Key::Peer(PeerId(5)).poll_context_id(), None);
        assert_eq!(Key::Downloads.peer(), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_key() -> impl Strategy<Value = Key> {
            prop_oneof![
                any::<u64>().prop_map(|peer| Key::Peer(PeerId(peer))),
                any::<u64>().prop_map(|peer| Key::Settings { self_user: PeerId(peer) }),
                Just(Key::Downloads),
                (any::<u64>(), any::<u64>(), any::<i64>()).prop_map(|(poll, peer, msg)| Key::Poll {
                    poll: PollId(poll),
                    context: FullMsgId::new(PeerId(peer), MsgId(msg)),
                }),
            ]
        }

        proptest! {
            #[test]
            fn test_any_key_has_exactly_one_accessor(key in any_key()) {
                let flags = present(&key);
                prop_assert_eq!(flags.iter().filter(|flag| **flag).count(), 1);
                prop_assert_eq!(key.poll_context_id().is_some(), key.poll().is_some());
            }
        }
    }
}
