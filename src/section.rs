// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Which sub-view of a subject is active.

use infopanel_data::MediaType;

/// Payload-free section discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Profile,
    Media,
    CommonGroups,
    Members,
    Settings,
    Downloads,
    PollResults,
}

/// Settings pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SettingsType {
    #[default]
    Main,
    Information,
    Notifications,
    PrivacySecurity,
    Advanced,
    Chat,
    Calls,
    Folders,
}

/// Active section of an info panel.
///
/// Equality compares the section type and, for media and settings, the
/// list or page shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Profile,
    Media(MediaType),
    CommonGroups,
    Members,
    Settings(SettingsType),
    Downloads,
    PollResults,
}

impl Section {
    pub fn section_type(&self) -> SectionType {
        match self {
            Self::Profile => SectionType::Profile,
            Self::Media(_) => SectionType::Media,
            Self::CommonGroups => SectionType::CommonGroups,
            Self::Members => SectionType::Members,
            Self::Settings(_) => SectionType::Settings,
            Self::Downloads => SectionType::Downloads,
            Self::PollResults => SectionType::PollResults,
        }
    }

    /// Media list shown, only for media sections.
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            Self::Media(media_type) => Some(*media_type),
            _ => None,
        }
    }

    pub fn settings_type(&self) -> Option<SettingsType> {
        match self {
            Self::Settings(settings_type) => Some(*settings_type),
            _ => None,
        }
    }
}
