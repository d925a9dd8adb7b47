// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infopanel demo - drives a controller against an in-memory session.

use futures::StreamExt;
use infopanel::{
    AbstractController, ConfigManager, ContentMemento, Controller, InfoConfig, PanelWidget,
    Section, SectionMemento, SectionShow, Services, WindowNavigator, Wrap,
};
use infopanel_data::{
    DownloadManager, FullMsgId, MediaPayload, MediaType, MessageData, MsgId, PeerData, PeerId,
    Producer, Session, UniversalMsgId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Navigator that only reports what it was asked to show.
struct LoggingNavigator {
    session: Arc<Session>,
}

impl WindowNavigator for LoggingNavigator {
    fn show_section(&self, memento: SectionMemento, params: SectionShow) {
        match memento.resolve(&self.session) {
            Ok(content) => info!(
                "Navigator: show {:?} of {} (migrated {:?}) {:?}",
                content.section(),
                content.key(),
                content.migrated_peer_id(),
                params
            ),
            Err(e) => warn!("Navigator: cannot show section: {}", e),
        }
    }

    fn show_back_from_stack(&self, params: SectionShow) {
        info!("Navigator: back {:?}", params);
    }

    fn show_peer_history(&self, peer: PeerId, params: SectionShow, msg: Option<MsgId>) {
        info!("Navigator: history of {} at {:?} {:?}", peer, msg, params);
    }
}

/// Widget that never handles navigation itself.
struct StaticWidget;

impl PanelWidget for StaticWidget {
    fn show_internal(&self, _memento: &SectionMemento, _params: &SectionShow) -> bool {
        false
    }

    fn show_back_from_stack_internal(&self, _params: &SectionShow) -> bool {
        false
    }

    fn wrap(&self) -> Wrap {
        Wrap::Layer
    }

    fn wrap_value(&self) -> Producer<Wrap> {
        futures::stream::once(futures::future::ready(Wrap::Layer)).boxed()
    }
}

fn load_config() -> (InfoConfig, Option<String>) {
    match ConfigManager::new().and_then(|manager| manager.load_config()) {
        Ok(config) => (config, None),
        Err(e) => (InfoConfig::default(), Some(e.to_string())),
    }
}

fn demo_session() -> Arc<Session> {
    let session = Arc::new(Session::new());
    session.add_peer(PeerData::chat(PeerId(10), "Book club"));
    session.add_peer(PeerData::channel(PeerId(20), "Book club (supergroup)"));
    for (msg, text) in [(1, "meeting notes.pdf"), (2, "reading list.pdf"), (3, "cover.png")] {
        session.add_message(
            MessageData::new(FullMsgId::new(PeerId(10), MsgId(msg)), text)
                .with_media(MediaPayload::File),
        );
    }
    session
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_error) = load_config();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.as_str()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Starting infopanel demo");
    if let Some(e) = config_error {
        warn!("Using default config: {}", e);
    }

    let session = demo_session();
    let downloads = Arc::new(DownloadManager::new());
    let services = Services::new(Arc::clone(&session), Arc::clone(&downloads), config);
    let navigator: Arc<dyn WindowNavigator> = Arc::new(LoggingNavigator {
        session: Arc::clone(&session),
    });
    let widget: Arc<dyn PanelWidget> = Arc::new(StaticWidget);

    let memento = ContentMemento::default_for_peer(
        &session,
        PeerId(10),
        Section::Media(MediaType::File),
    )?;
    let controller = Controller::new(Arc::downgrade(&widget), navigator, services, &memento)?;

    let mut files = controller.media_source(UniversalMsgId(1), 10, 10)?;
    if let Some(slice) = files.next().await {
        info!("Files: {:?} of {}", slice.ids(), slice.full_count());
    }

    if let Some(field) = controller.search_field_controller() {
        field.set_query("pdf");
    }
    tokio::time::sleep(Duration::from_millis(300)).await;
    let mut results = controller.media_source(UniversalMsgId(1), 10, 10)?;
    if let Some(slice) = results.next().await {
        info!("Search results: {:?} ({:?})", slice.ids(), slice.origin());
    }

    downloads.start(FullMsgId::new(PeerId(10), MsgId(2)), 2_000, 1024);
    downloads.start(FullMsgId::new(PeerId(10), MsgId(1)), 1_000, 2048);
    if let Some(slice) = controller.downloads_source().next().await {
        info!("Downloads: {:?}", slice.entries);
    }

    session.migrate(PeerId(10), PeerId(20));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut saved = memento.clone();
    controller.save_search_state(&mut saved)?;
    info!("Saved search field: {:?}", saved.search_field_query());

    drop(controller);
    info!("Demo finished");
    Ok(())
}
