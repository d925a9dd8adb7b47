// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Session data layer for the info panel controller.
//!
//! Peers, messages, polls and their shared-media index live in a
//! [`Session`]; in-flight transfers live in a [`DownloadManager`]. Both hand
//! out live [`Producer`]s that yield the current value first and then a new
//! value after every relevant change.

pub mod downloads;
pub mod ids;
pub mod message;
pub mod peer;
pub mod session;
pub mod shared_media;

pub use downloads::{DownloadManager, DownloadObject, DownloadingId};
pub use ids::{FullMsgId, MsgId, PeerId, PollId, UniversalMsgId, SERVER_MAX_MSG_ID};
pub use message::{MediaPayload, MessageData, PollData};
pub use peer::{PeerData, PeerKind, PeerUpdate, PeerUpdateFlags};
pub use session::{Session, SharedMediaUpdate};
pub use shared_media::{
    MediaType, SharedMediaMergedKey, SliceOrigin, SparseIdsMergedKey, SparseIdsMergedSlice,
};

/// Push-based stream of values, delivered in emission order.
pub type Producer<T> = futures::stream::BoxStream<'static, T>;
