// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Query field delegate.

use infopanel_data::Producer;
use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

type QueryCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Text of the search field, observable.
pub struct SearchFieldController {
    query: watch::Sender<String>,
    on_change: Option<QueryCallback>,
}

impl SearchFieldController {
    pub fn new(query: impl Into<String>) -> Self {
        let (query, _) = watch::channel(query.into());
        Self {
            query,
            on_change: None,
        }
    }

    /// Current text.
    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    /// Current text, then the text after each edit.
    ///
    /// Edits made faster than the subscriber reads are coalesced into the
    /// latest text.
    pub fn query_value(&self) -> Producer<String> {
        WatchStream::new(self.query.subscribe()).boxed()
    }

    /// Replace the text, as if typed by the user. No-op if unchanged.
    ///
    /// The change callback has run by the time this returns.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let changed = self.query.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                current.clone_from(&text);
                true
            }
        });
        if changed {
            if let Some(on_change) = &self.on_change {
                on_change(&text);
            }
        }
    }

    /// Call `callback` with the current text now, and with the new text on
    /// every edit. Replaces a previous callback.
    pub fn set_on_change(&mut self, callback: impl Fn(&str) + Send + Sync + 'static) {
        let current = self.query();
        callback(&current);
        self.on_change = Some(Box::new(callback));
    }
}
