// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infopanel - navigation controller for a messenger's info panel.
//!
//! Given what a panel shows (a [`Key`]) and which part of it (a
//! [`Section`]), the [`Controller`] resolves the subject, keeps the panel's
//! search state across navigation, provides live media and downloads
//! sources, and reopens the panel when a group chat migrates.

pub mod config;
pub mod controller;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod memento;
pub mod search;
pub mod section;

pub use config::{ConfigManager, InfoConfig};
pub use controller::{
    AbstractController, Activation, AnimType, Controller, DownloadsEntry, DownloadsSlice,
    PanelWidget, SectionShow, Services, WindowNavigator, Way, Wrap,
};
pub use error::{InfoError, InfoResult};
pub use key::Key;
pub use lifetime::Lifetime;
pub use memento::{ContentKind, ContentMemento, MediaMemento, SectionMemento};
pub use search::{DelayedSearchController, SavedSearchState, SearchFieldController, SearchQuery};
pub use section::{Section, SectionType, SettingsType};
