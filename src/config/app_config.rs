// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Controller configuration (search behavior, logging).

use infopanel_data::MediaType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Delay before a new, uncached query is applied.
    pub delay_ms: u64,
    /// Media lists that get a search field.
    pub searchable_media: Vec<MediaType>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delay_ms: 200,
            searchable_media: vec![MediaType::MusicFile, MediaType::File, MediaType::Link],
        }
    }
}

impl SearchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether a media list of `media_type` can be searched.
    pub fn allows(&self, media_type: MediaType) -> bool {
        self.searchable_media.contains(&media_type)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "infopanel=debug".to_string(),
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl InfoConfig {
    /// Load config from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
