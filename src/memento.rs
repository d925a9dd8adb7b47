// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Navigation snapshots.
//!
//! A [`ContentMemento`] records one entry of an info panel: what it shows,
//! which section, and the search state to bring back. A [`SectionMemento`]
//! is what the window navigator is asked to show.

use crate::error::{InfoError, InfoResult};
use crate::key::Key;
use crate::search::{SavedSearchState, SearchQuery};
use crate::section::{Section, SectionType, SettingsType};
use infopanel_data::{FullMsgId, MediaType, PeerId, PollId, Session};
use tracing::debug;

/// Media-section part of a memento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMemento {
    pub media_type: MediaType,
    pub search_state: SavedSearchState,
}

/// Section-specific part of a memento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    Profile,
    Media(MediaMemento),
    CommonGroups,
    Members,
    Settings(SettingsType),
    Downloads,
    PollResults,
}

impl ContentKind {
    pub fn section(&self) -> Section {
        match self {
            Self::Profile => Section::Profile,
            Self::Media(media) => Section::Media(media.media_type),
            Self::CommonGroups => Section::CommonGroups,
            Self::Members => Section::Members,
            Self::Settings(settings_type) => Section::Settings(*settings_type),
            Self::Downloads => Section::Downloads,
            Self::PollResults => Section::PollResults,
        }
    }
}

/// Snapshot of one info panel entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMemento {
    key: Key,
    migrated_peer_id: Option<PeerId>,
    kind: ContentKind,
    search_field_query: String,
    search_enabled_by_content: bool,
    search_starts_focused: bool,
}

impl ContentMemento {
    fn new(key: Key, migrated_peer_id: Option<PeerId>, kind: ContentKind) -> Self {
        Self {
            key,
            migrated_peer_id,
            kind,
            search_field_query: String::new(),
            search_enabled_by_content: false,
            search_starts_focused: false,
        }
    }

    pub fn profile(peer: PeerId, migrated: Option<PeerId>) -> Self {
        Self::new(Key::Peer(peer), migrated, ContentKind::Profile)
    }

    /// Media list of `peer` merged with `migrated`, with an empty search.
    pub fn media(peer: PeerId, migrated: Option<PeerId>, media_type: MediaType) -> Self {
        let search_state = SavedSearchState::new(SearchQuery::empty(media_type, peer, migrated));
        Self::new(
            Key::Peer(peer),
            migrated,
            ContentKind::Media(MediaMemento {
                media_type,
                search_state,
            }),
        )
    }

    pub fn common_groups(user: PeerId) -> Self {
        Self::new(Key::Peer(user), None, ContentKind::CommonGroups)
    }

    pub fn members(peer: PeerId, migrated: Option<PeerId>) -> Self {
        Self::new(Key::Peer(peer), migrated, ContentKind::Members)
    }

    pub fn settings(self_user: PeerId, settings_type: SettingsType) -> Self {
        Self::new(
            Key::Settings { self_user },
            None,
            ContentKind::Settings(settings_type),
        )
    }

    pub fn downloads() -> Self {
        Self::new(Key::Downloads, None, ContentKind::Downloads)
    }

    pub fn poll_results(poll: PollId, context: FullMsgId) -> Self {
        Self::new(Key::Poll { poll, context }, None, ContentKind::PollResults)
    }

    /// Default entry for `section` of `peer`.
    ///
    /// A migrated chat is replaced by the channel it became, and the
    /// channel's predecessor is recorded as the migrated peer.
    pub fn default_for_peer(session: &Session, peer: PeerId, section: Section) -> InfoResult<Self> {
        let data = session.peer(peer);
        let peer = data
            .as_ref()
            .and_then(|data| data.migrate_to)
            .unwrap_or(peer);
        let resolved = session.peer(peer);
        let migrated = resolved.as_ref().and_then(|data| data.migrate_from);
        debug!("Default content for {} ({:?}), migrated {:?}", peer, section, migrated);
        match section {
            Section::Profile => Ok(Self::profile(peer, migrated)),
            Section::Media(media_type) => Ok(Self::media(peer, migrated, media_type)),
            Section::CommonGroups => match resolved {
                Some(data) if data.is_user() => Ok(Self::common_groups(peer)),
                _ => Err(InfoError::UnsupportedDefaultSection(SectionType::CommonGroups)),
            },
            Section::Members => Ok(Self::members(peer, migrated)),
            Section::Settings(_) | Section::Downloads | Section::PollResults => {
                Err(InfoError::UnsupportedDefaultSection(section.section_type()))
            }
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn kind(&self) -> &ContentKind {
        &self.kind
    }

    pub fn section(&self) -> Section {
        self.kind.section()
    }

    pub fn peer(&self) -> Option<PeerId> {
        self.key.peer()
    }

    pub fn migrated_peer_id(&self) -> Option<PeerId> {
        self.migrated_peer_id
    }

    pub fn settings_self(&self) -> Option<PeerId> {
        self.key.settings_self()
    }

    pub fn poll(&self) -> Option<PollId> {
        self.key.poll()
    }

    pub fn poll_context_id(&self) -> Option<FullMsgId> {
        self.key.poll_context_id()
    }

    pub fn search_field_query(&self) -> &str {
        &self.search_field_query
    }

    pub fn set_search_field_query(&mut self, query: impl Into<String>) {
        self.search_field_query = query.into();
    }

    pub fn search_enabled_by_content(&self) -> bool {
        self.search_enabled_by_content
    }

    pub fn set_search_enabled_by_content(&mut self, enabled: bool) {
        self.search_enabled_by_content = enabled;
    }

    pub fn search_starts_focused(&self) -> bool {
        self.search_starts_focused
    }

    pub fn set_search_starts_focused(&mut self, focused: bool) {
        self.search_starts_focused = focused;
    }

    /// Saved content search. Only media mementos carry one.
    pub fn media_search_state(&self) -> InfoResult<&SavedSearchState> {
        match &self.kind {
            ContentKind::Media(media) => Ok(&media.search_state),
            other => Err(InfoError::MementoKindMismatch {
                expected: SectionType::Media,
                found: other.section().section_type(),
            }),
        }
    }

    pub fn set_media_search_state(&mut self, state: SavedSearchState) -> InfoResult<()> {
        match &mut self.kind {
            ContentKind::Media(media) => {
                media.search_state = state;
                Ok(())
            }
            other => Err(InfoError::MementoKindMismatch {
                expected: SectionType::Media,
                found: other.section().section_type(),
            }),
        }
    }
}

/// Request handed to the window navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionMemento {
    /// Fresh panel for a peer; the navigator picks the default content.
    Peer { peer: PeerId, section: Section },
    /// A fully specified entry.
    Content(ContentMemento),
}

impl SectionMemento {
    pub fn peer(peer: PeerId, section: Section) -> Self {
        Self::Peer { peer, section }
    }

    pub fn section(&self) -> Section {
        match self {
            Self::Peer { section, .. } => *section,
            Self::Content(content) => content.section(),
        }
    }

    /// Turn the request into a concrete entry.
    pub fn resolve(self, session: &Session) -> InfoResult<ContentMemento> {
        match self {
            Self::Peer { peer, section } => ContentMemento::default_for_peer(session, peer, section),
            Self::Content(content) => Ok(content),
        }
    }
}

impl From<ContentMemento> for SectionMemento {
    fn from(content: ContentMemento) -> Self {
        Self::Content(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infopanel_data::{MsgId, PeerData};

    fn session() -> Session {
        let session = Session::new();
        session.add_peer(PeerData::chat(PeerId(1), "Chat"));
        session.add_peer(PeerData::channel(PeerId(2), "Channel"));
        session.add_peer(PeerData::user(PeerId(3), "User"));
        session
    }

    #[test]
    fn test_media_memento_carries_initial_search_state() {
        let memento = ContentMemento::media(PeerId(2), Some(PeerId(1)), MediaType::File);
        let state = memento.media_search_state().expect("media memento");
        assert_eq!(state.query, SearchQuery::empty(MediaType::File, PeerId(2), Some(PeerId(1))));
        assert_eq!(memento.section(), Section::Media(MediaType::File));
    }

    #[test]
    fn test_search_state_only_on_media() {
        let mut memento = ContentMemento::members(PeerId(2), None);
        assert_eq!(
            memento.media_search_state(),
            Err(InfoError::MementoKindMismatch {
                expected: SectionType::Media,
                found: SectionType::Members,
            })
        );
        let state = SavedSearchState::new(SearchQuery::empty(MediaType::File, PeerId(2), None));
        assert!(memento.set_media_search_state(state).is_err());
    }

    #[test]
    fn test_default_content_follows_migration() {
        let session = session();
        session.migrate(PeerId(1), PeerId(2));
        let memento = ContentMemento::default_for_peer(&session, PeerId(1), Section::Media(MediaType::Photo))
            .expect("media default");
        assert_eq!(memento.peer(), Some(PeerId(2)));
        assert_eq!(memento.migrated_peer_id(), Some(PeerId(1)));

        let request = SectionMemento::peer(PeerId(1), Section::Profile);
        let resolved = request.resolve(&session).expect("profile default");
        assert_eq!(resolved.key(), Key::Peer(PeerId(2)));
    }

    #[test]
    fn test_default_content_rejects_non_peer_sections() {
        let session = session();
        assert_eq!(
            ContentMemento::default_for_peer(&session, PeerId(2), Section::Downloads),
            Err(InfoError::UnsupportedDefaultSection(SectionType::Downloads))
        );
        assert!(ContentMemento::default_for_peer(&session, PeerId(2), Section::CommonGroups).is_err());
        assert!(ContentMemento::default_for_peer(&session, PeerId(3), Section::CommonGroups).is_ok());
    }

    #[test]
    fn test_poll_memento_key() {
        let context = FullMsgId::new(PeerId(2), MsgId(40));
        let memento = ContentMemento::poll_results(PollId(9), context);
        assert_eq!(memento.poll(), Some(PollId(9)));
        assert_eq!(memento.poll_context_id(), Some(context));
        assert_eq!(memento.peer(), None);
        assert_eq!(memento.section(), Section::PollResults);
    }
}
