// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Controller bound to one info panel widget.

use super::{
    AbstractController, Activation, AnimType, PanelWidget, SectionShow, Services,
    WindowNavigator, Way, Wrap,
};
use crate::error::{InfoError, InfoResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::memento::{ContentMemento, SectionMemento};
use crate::search::{DelayedSearchController, SearchFieldController, SearchQuery};
use crate::section::Section;
use futures::StreamExt;
use infopanel_data::{
    PeerId, PeerUpdateFlags, Producer, SharedMediaMergedKey, SparseIdsMergedKey,
    SparseIdsMergedSlice, UniversalMsgId,
};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info};

/// Info panel controller.
///
/// Holds the panel's subject and section, owns its search delegates and
/// watches a chat for migration. Must be created inside a tokio runtime;
/// every subscription ends when the controller is dropped.
pub struct Controller {
    widget: Weak<dyn PanelWidget>,
    window: Arc<dyn WindowNavigator>,
    services: Services,
    key: Key,
    migrated: Option<PeerId>,
    // Shared with the migration watcher, which reads it when it fires.
    section: Arc<RwLock<Section>>,
    search_field_controller: Option<SearchFieldController>,
    search_controller: Option<Arc<DelayedSearchController>>,
    search_enabled_by_content: watch::Sender<bool>,
    search_starts_focused: bool,
    lifetime: Lifetime,
}

impl Controller {
    pub fn new(
        widget: Weak<dyn PanelWidget>,
        window: Arc<dyn WindowNavigator>,
        services: Services,
        memento: &ContentMemento,
    ) -> InfoResult<Self> {
        let (search_enabled_by_content, _) = watch::channel(false);
        let mut controller = Self {
            widget,
            window,
            services,
            key: memento.key(),
            migrated: memento.migrated_peer_id(),
            section: Arc::new(RwLock::new(memento.section())),
            search_field_controller: None,
            search_controller: None,
            search_enabled_by_content,
            search_starts_focused: false,
            lifetime: Lifetime::new(),
        };
        controller.update_search_controllers(memento)?;
        controller.setup_migration_viewer();
        info!(
            "Info controller for {} created ({:?})",
            controller.key,
            controller.section()
        );
        Ok(controller)
    }

    /// Switch to the section of `memento` and take over its search state.
    ///
    /// On error the previous section and delegates stay in place.
    pub fn set_section(&mut self, memento: &ContentMemento) -> InfoResult<()> {
        let previous = std::mem::replace(&mut *self.section.write(), memento.section());
        if let Err(e) = self.update_search_controllers(memento) {
            error!("Cannot switch to {:?}: {}", memento.section(), e);
            *self.section.write() = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Rebuild the search delegates for the current section from `memento`.
    pub fn update_search_controllers(&mut self, memento: &ContentMemento) -> InfoResult<()> {
        let section = self.section();
        let media_type = section.media_type();
        let has_media_search = media_type
            .map(|media_type| self.services.config.search.allows(media_type))
            .unwrap_or(false);
        let has_common_groups_search = section == Section::CommonGroups;
        let has_members_search = matches!(section, Section::Members | Section::Profile);
        let has_search = has_media_search || has_common_groups_search || has_members_search;

        let (search_controller, template) = match media_type {
            Some(media_type) => {
                let state = memento.media_search_state()?.clone();
                let template = SearchQuery::empty(media_type, self.require_peer()?, self.migrated);
                let search = DelayedSearchController::new(
                    Arc::clone(&self.services.session),
                    self.services.config.search.delay(),
                    state,
                );
                (Some(search), Some(template))
            }
            None => (None, None),
        };

        self.search_field_controller = None;
        self.search_controller = search_controller;
        if !has_search {
            debug!("No search for {:?}", section);
            return Ok(());
        }

        let mut field = SearchFieldController::new(memento.search_field_query());
        if let (Some(search), Some(template)) = (&self.search_controller, template) {
            let search = Arc::clone(search);
            field.set_on_change(move |text| {
                search.set_query(SearchQuery {
                    query: text.to_string(),
                    ..template.clone()
                });
            });
        }
        self.search_field_controller = Some(field);
        self.search_enabled_by_content
            .send_if_modified(|enabled| set_flag(enabled, memento.search_enabled_by_content()));
        self.search_starts_focused = memento.search_starts_focused();
        Ok(())
    }

    /// Write the search state into `memento`.
    pub fn save_search_state(&self, memento: &mut ContentMemento) -> InfoResult<()> {
        let search_state = match &self.search_controller {
            Some(search) => {
                memento.media_search_state()?;
                Some(search.save_state())
            }
            None => None,
        };
        if let Some(field) = &self.search_field_controller {
            memento.set_search_field_query(field.query());
            memento.set_search_enabled_by_content(*self.search_enabled_by_content.borrow());
        }
        if let Some(state) = search_state {
            memento.set_media_search_state(state)?;
        }
        Ok(())
    }

    /// Whether a memento can be shown by this controller in place.
    pub fn validate_memento_peer(&self, memento: &ContentMemento) -> bool {
        memento.peer() == self.key.peer()
            && memento.migrated_peer_id() == self.migrated
            && memento.settings_self() == self.key.settings_self()
    }

    /// Content-search query for `text` in the current media section.
    pub fn produce_search_query(&self, text: impl Into<String>) -> InfoResult<SearchQuery> {
        let section = self.section();
        let Some(media_type) = section.media_type() else {
            return Err(InfoError::NotAMediaSection(section.section_type()));
        };
        Ok(SearchQuery {
            query: text.into(),
            ..SearchQuery::empty(media_type, self.require_peer()?, self.migrated)
        })
    }

    pub fn wrap(&self) -> Wrap {
        self.widget
            .upgrade()
            .map(|widget| widget.wrap())
            .unwrap_or_default()
    }

    pub fn wrap_value(&self) -> Producer<Wrap> {
        match self.widget.upgrade() {
            Some(widget) => widget.wrap_value(),
            None => futures::stream::once(futures::future::ready(Wrap::default())).boxed(),
        }
    }

    pub fn search_field_controller(&self) -> Option<&SearchFieldController> {
        self.search_field_controller.as_ref()
    }

    pub fn search_controller(&self) -> Option<&Arc<DelayedSearchController>> {
        self.search_controller.as_ref()
    }

    pub fn search_enabled_by_content(&self) -> Producer<bool> {
        WatchStream::new(self.search_enabled_by_content.subscribe()).boxed()
    }

    pub fn set_search_enabled_by_content(&self, enabled: bool) {
        self.search_enabled_by_content
            .send_if_modified(|current| set_flag(current, enabled));
    }

    pub fn search_starts_focused(&self) -> bool {
        self.search_starts_focused
    }

    fn require_peer(&self) -> InfoResult<PeerId> {
        self.key.peer().ok_or_else(|| {
            error!("Media search requested for non-peer key {}", self.key);
            InfoError::NotAPeer(self.key.to_string())
        })
    }

    /// Re-open the panel for a chat that migrated, or gained a migrated
    /// predecessor, while it was shown.
    fn setup_migration_viewer(&mut self) {
        let Some(peer) = self.key.peer() else {
            return;
        };
        let session = Arc::clone(&self.services.session);
        let Some(data) = session.peer(peer) else {
            return;
        };
        if (!data.is_chat() && !data.is_channel()) || self.migrated.is_some() {
            return;
        }

        let migrations = session
            .peer_flags_value(peer, PeerUpdateFlags::MIGRATION)
            .filter(move |_| {
                let migrated = session
                    .peer(peer)
                    .map(|data| data.migrate_to.is_some() || data.migrate_from.is_some())
                    .unwrap_or(false);
                futures::future::ready(migrated)
            });
        let window = Arc::clone(&self.window);
        let widget = self.widget.clone();
        let section = Arc::clone(&self.section);
        self.lifetime.start_with_next(migrations, move |_| {
            let section = *section.read();
            info!("{} migrated, reopening {:?}", peer, section);
            let window = Arc::clone(&window);
            invoke_queued(widget.clone(), move || {
                window.show_section(
                    SectionMemento::peer(peer, section),
                    SectionShow::new(Way::Backward, AnimType::Instant, Activation::Background),
                );
            });
        });
    }
}

impl AbstractController for Controller {
    fn key(&self) -> Key {
        self.key
    }

    fn section(&self) -> Section {
        *self.section.read()
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

    fn media_source(
        &self,
        around: UniversalMsgId,
        limit_before: usize,
        limit_after: usize,
    ) -> InfoResult<Producer<SparseIdsMergedSlice>> {
        let Some(search) = &self.search_controller else {
            return self.merged_media_source(around, limit_before, limit_after);
        };
        let query = search.current_query();
        if !query.query.is_empty() {
            return Ok(search.ids_slice(around, limit_before, limit_after));
        }
        let key = SharedMediaMergedKey::new(
            SparseIdsMergedKey::new(query.peer_id, query.migrated_peer_id, around),
            query.media_type,
        );
        Ok(self
            .session()
            .shared_media_merged_viewer(key, limit_before, limit_after))
    }

    fn media_source_query_value(&self) -> Producer<String> {
        // TODO: follow the downloads search field once the downloads list
        // can be filtered.
        match &self.search_controller {
            Some(search) => search.current_query_value(),
            None => futures::stream::once(futures::future::ready(String::new())).boxed(),
        }
    }

    fn show_section(&self, memento: SectionMemento, params: SectionShow) {
        if let Some(widget) = self.widget.upgrade() {
            if widget.show_internal(&memento, &params) {
                return;
            }
        }
        self.window.show_section(memento, params);
    }

    fn show_back_from_stack(&self, params: SectionShow) {
        if let Some(widget) = self.widget.upgrade() {
            if widget.show_back_from_stack_internal(&params) {
                return;
            }
        }
        self.window.show_back_from_stack(params);
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        debug!("Info controller for {} destroyed", self.key);
    }
}

fn set_flag(current: &mut bool, value: bool) -> bool {
    let changed = *current != value;
    *current = value;
    changed
}

/// Run `callback` on a later turn of the runtime if `guard` is still alive.
fn invoke_queued<G, F>(guard: Weak<G>, callback: F)
where
    G: ?Sized + Send + Sync + 'static,
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        if guard.upgrade().is_some() {
            callback();
        } else {
            debug!("Queued navigation dropped, panel is gone");
        }
    });
}
