// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Info panel controllers.
//!
//! [`AbstractController`] is the navigation behavior every info panel
//! shares: resolving the subject from its [`Key`], building the merged
//! media and downloads sources, and forwarding navigation requests to the
//! window. [`Controller`] is the concrete, widget-bound implementation with
//! search state and migration handling.

pub mod downloads;
pub mod panel;

pub use downloads::{DownloadsEntry, DownloadsSlice};
pub use panel::Controller;

use crate::config::InfoConfig;
use crate::error::{InfoError, InfoResult};
use crate::key::Key;
use crate::memento::SectionMemento;
use crate::section::Section;
use futures::StreamExt;
use infopanel_data::{
    DownloadManager, FullMsgId, MsgId, PeerId, PollId, Producer, Session, SharedMediaMergedKey,
    SparseIdsMergedKey, SparseIdsMergedSlice, UniversalMsgId,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Direction of a navigation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Way {
    #[default]
    Forward,
    Backward,
    ClearStack,
}

/// Animation used for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimType {
    #[default]
    Normal,
    Instant,
}

/// Whether the navigation was started by the user or by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Foreground,
    Background,
}

/// Parameters of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionShow {
    pub way: Way,
    pub anim: AnimType,
    pub activation: Activation,
}

impl SectionShow {
    pub fn new(way: Way, anim: AnimType, activation: Activation) -> Self {
        Self {
            way,
            anim,
            activation,
        }
    }

    pub fn with_way(way: Way) -> Self {
        Self {
            way,
            ..Self::default()
        }
    }
}

/// Presentation mode of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    Layer,
    Narrow,
    Side,
    Search,
}

/// Window-level navigation stack.
pub trait WindowNavigator: Send + Sync {
    fn show_section(&self, memento: SectionMemento, params: SectionShow);
    fn show_back_from_stack(&self, params: SectionShow);
    fn show_peer_history(&self, peer: PeerId, params: SectionShow, msg: Option<MsgId>);
}

/// The panel widget a [`Controller`] is bound to.
pub trait PanelWidget: Send + Sync {
    /// Show `memento` inside the panel without a stack push. Returns
    /// `false` if the panel cannot.
    fn show_internal(&self, memento: &SectionMemento, params: &SectionShow) -> bool;

    /// Go back inside the panel. Returns `false` if there is nothing to
    /// go back to.
    fn show_back_from_stack_internal(&self, params: &SectionShow) -> bool;

    fn wrap(&self) -> Wrap;

    fn wrap_value(&self) -> Producer<Wrap>;
}

/// Session-scoped dependencies of a controller.
///
/// The controller only holds ids into `session`; it must not outlive it.
#[derive(Clone)]
pub struct Services {
    pub session: Arc<Session>,
    pub downloads: Arc<DownloadManager>,
    pub config: Arc<InfoConfig>,
}

impl Services {
    pub fn new(session: Arc<Session>, downloads: Arc<DownloadManager>, config: InfoConfig) -> Self {
        Self {
            session,
            downloads,
            config: Arc::new(config),
        }
    }
}

/// Navigation behavior shared by every info panel.
pub trait AbstractController {
    fn key(&self) -> Key;

    fn section(&self) -> Section;

    fn migrated_peer_id(&self) -> Option<PeerId>;

    fn services(&self) -> &Services;

    fn parent_controller(&self) -> &Arc<dyn WindowNavigator>;

    fn session(&self) -> &Arc<Session> {
        &self.services().session
    }

    fn peer(&self) -> Option<PeerId> {
        self.key().peer()
    }

    fn settings_self(&self) -> Option<PeerId> {
        self.key().settings_self()
    }

    fn is_downloads(&self) -> bool {
        self.key().is_downloads()
    }

    fn poll_context_id(&self) -> Option<FullMsgId> {
        self.key().poll_context_id()
    }

    /// Poll attached to the context message.
    fn poll(&self) -> Option<PollId> {
        let context = self.poll_context_id()?;
        let message = self.session().message_by_id(context)?;
        message.media.as_ref()?.poll()
    }

    /// Live window over the media of the current section.
    fn media_source(
        &self,
        around: UniversalMsgId,
        limit_before: usize,
        limit_after: usize,
    ) -> InfoResult<Producer<SparseIdsMergedSlice>> {
        self.merged_media_source(around, limit_before, limit_after)
    }

    /// Media window from history, ignoring any search.
    ///
    /// A scheduled anchor reads the scheduled timeline instead of the
    /// merged history.
    fn merged_media_source(
        &self,
        around: UniversalMsgId,
        limit_before: usize,
        limit_after: usize,
    ) -> InfoResult<Producer<SparseIdsMergedSlice>> {
        let key = self.key();
        let Some(peer) = key.peer() else {
            error!("Media source requested for non-peer key {}", key);
            return Err(InfoError::NotAPeer(key.to_string()));
        };
        let section = self.section();
        let Some(media_type) = section.media_type() else {
            error!("Media source requested for {:?} section", section);
            return Err(InfoError::NotAMediaSection(section.section_type()));
        };
        let migrated = self.migrated_peer_id();
        let session = self.session();
        // Timelines are disjoint; an id present in history is a history anchor.
        let is_scheduled = around
            .resolve(peer, migrated)
            .filter(|id| session.message_by_id(*id).is_none())
            .and_then(|id| session.scheduled_message(id))
            .is_some();

        let merged_key = SharedMediaMergedKey::new(
            SparseIdsMergedKey::new(peer, migrated, around),
            media_type,
        );
        debug!(
            "Media source for {} around {:?} (scheduled: {})",
            peer, around, is_scheduled
        );
        Ok(if is_scheduled {
            session.shared_scheduled_media_viewer(merged_key, limit_before, limit_after)
        } else {
            session.shared_media_merged_viewer(merged_key, limit_before, limit_after)
        })
    }

    /// Text of the active media search. No search here.
    fn media_source_query_value(&self) -> Producer<String> {
        futures::stream::once(futures::future::ready(String::new())).boxed()
    }

    /// Live downloads list, sorted by start time.
    fn downloads_source(&self) -> Producer<DownloadsSlice> {
        downloads::downloads_source(&self.services().downloads)
    }

    fn show_section(&self, memento: SectionMemento, params: SectionShow) {
        self.parent_controller().show_section(memento, params);
    }

    fn show_back_from_stack(&self, params: SectionShow) {
        self.parent_controller().show_back_from_stack(params);
    }

    fn show_peer_history(&self, peer: PeerId, params: SectionShow, msg: Option<MsgId>) {
        self.parent_controller().show_peer_history(peer, params, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infopanel_data::{
        MediaPayload, MediaType, MessageData, PeerData, PollData, SliceOrigin,
    };
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        calls: Mutex<Vec<String>>,
    }

    impl WindowNavigator for RecordingNavigator {
        fn show_section(&self, memento: SectionMemento, params: SectionShow) {
            self.calls
                .lock()
                .push(format!("section {:?} {:?}", memento.section(), params.way));
        }

        fn show_back_from_stack(&self, params: SectionShow) {
            self.calls.lock().push(format!("back {:?}", params.way));
        }

        fn show_peer_history(&self, peer: PeerId, _params: SectionShow, msg: Option<MsgId>) {
            self.calls.lock().push(format!("history {} {:?}", peer, msg));
        }
    }

    /// Controller with no widget and no search.
    struct PlainController {
        key: Key,
        section: Section,
        migrated: Option<PeerId>,
        services: Services,
        window: Arc<dyn WindowNavigator>,
    }

    impl AbstractController for PlainController {
        fn key(&self) -> Key {
            self.key
        }

        fn section(&self) -> Section {
            self.section
        }

        fn migrated_peer_id(&self) -> Option<PeerId> {
            self.migrated
        }

        fn services(&self) -> &Services {
            &self.services
        }

        fn parent_controller(&self) -> &Arc<dyn WindowNavigator> {
            &self.window
        }
    }

    fn services() -> Services {
        let session = Arc::new(Session::new());
        session.add_peer(PeerData::channel(PeerId(2), "Channel"));
        for msg in 1..=5 {
            session.add_message(
                MessageData::new(FullMsgId::new(PeerId(2), MsgId(msg)), "")
                    .with_media(MediaPayload::Photo),
            );
        }
        session.add_message(
            MessageData::new(FullMsgId::new(PeerId(2), MsgId(1000)), "")
                .with_media(MediaPayload::Photo)
                .scheduled(),
        );
        Services::new(session, Arc::new(DownloadManager::new()), InfoConfig::default())
    }

    fn plain_controller(key: Key, section: Section) -> (PlainController, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        let window: Arc<dyn WindowNavigator> = navigator.clone();
        let controller = PlainController {
            key,
            section,
            migrated: None,
            services: services(),
            window,
        };
        (controller, navigator)
    }

    #[tokio::test]
    async fn test_media_source_uses_merged_viewer() {
        let (controller, _) = plain_controller(Key::Peer(PeerId(2)), Section::Media(MediaType::Photo));
        let mut source = controller
            .media_source(UniversalMsgId(3), 1, 1)
            .expect("peer key");
        let slice = source.next().await.expect("slice");
        assert_eq!(slice.origin(), SliceOrigin::Merged);
        assert_eq!(slice.ids(), &[UniversalMsgId(2), UniversalMsgId(3), UniversalMsgId(4)]);
        assert_eq!(
            *slice.key(),
            SharedMediaMergedKey::new(
                SparseIdsMergedKey::new(PeerId(2), None, UniversalMsgId(3)),
                MediaType::Photo,
            )
        );
    }

    #[tokio::test]
    async fn test_scheduled_anchor_uses_scheduled_viewer() {
        let (controller, _) = plain_controller(Key::Peer(PeerId(2)), Section::Media(MediaType::Photo));
        let mut source = controller
            .media_source(UniversalMsgId(1000), 5, 5)
            .expect("peer key");
        let slice = source.next().await.expect("slice");
        assert_eq!(slice.origin(), SliceOrigin::Scheduled);
        assert_eq!(slice.full_count(), 1);
    }

    #[tokio::test]
    async fn test_history_anchor_wins_over_scheduled_with_same_id() {
        let (controller, _) = plain_controller(Key::Peer(PeerId(2)), Section::Media(MediaType::Photo));
        controller.session().add_message(
            MessageData::new(FullMsgId::new(PeerId(2), MsgId(3)), "later")
                .with_media(MediaPayload::Photo)
                .scheduled(),
        );
        let mut source = controller
            .media_source(UniversalMsgId(3), 1, 1)
            .expect("peer key");
        let slice = source.next().await.expect("slice");
        assert_eq!(slice.origin(), SliceOrigin::Merged);
        assert_eq!(slice.full_count(), 5);
    }

    #[test]
    fn test_media_source_requires_peer_and_media_section() {
        let (controller, _) = plain_controller(Key::Downloads, Section::Downloads);
        assert!(matches!(
            controller.media_source(UniversalMsgId(1), 1, 1),
            Err(InfoError::NotAPeer(_))
        ));

        let (controller, _) = plain_controller(Key::Peer(PeerId(2)), Section::Profile);
        assert!(matches!(
            controller.media_source(UniversalMsgId(1), 1, 1),
            Err(InfoError::NotAMediaSection(_))
        ));
    }

    #[tokio::test]
    async fn test_base_query_value_is_empty() {
        let (controller, _) = plain_controller(Key::Peer(PeerId(2)), Section::Media(MediaType::Photo));
        let values: Vec<String> = controller.media_source_query_value().collect().await;
        assert_eq!(values, vec![String::new()]);
    }

    #[test]
    fn test_navigation_is_forwarded() {
        let (controller, navigator) = plain_controller(Key::Peer(PeerId(2)), Section::Profile);
        controller.show_section(
            SectionMemento::peer(PeerId(2), Section::Members),
            SectionShow::default(),
        );
        controller.show_back_from_stack(SectionShow::with_way(Way::Backward));
        controller.show_peer_history(PeerId(2), SectionShow::default(), Some(MsgId(5)));
        assert_eq!(
            *navigator.calls.lock(),
            vec![
                "section Members Forward".to_string(),
                "back Backward".to_string(),
                "history peer#2 Some(MsgId(5))".to_string(),
            ]
        );
    }

    #[test]
    fn test_poll_resolves_through_context_message() {
        let context = FullMsgId::new(PeerId(2), MsgId(77));
        let (controller, _) = plain_controller(
            Key::Poll {
                poll: PollId(9),
                context,
            },
            Section::PollResults,
        );
        assert_eq!(controller.poll(), None);

        let session = controller.session();
        session.add_poll(PollData {
            id: PollId(9),
            question: "Lunch?".to_string(),
        });
        session.add_message(MessageData::new(context, "").with_media(MediaPayload::Poll(PollId(9))));
        assert_eq!(controller.poll(), Some(PollId(9)));
        assert_eq!(controller.peer(), None);
    }
}
