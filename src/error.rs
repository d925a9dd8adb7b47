// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contract violations reported by the info controller.
//!
//! None of these are user-facing. They mean a caller passed a key, section
//! or memento that does not fit the operation and must be fixed at the call
//! site.

use crate::section::SectionType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoError {
    #[error("Operation requires a peer key, got {0}")]
    NotAPeer(String),

    #[error("Operation requires a media section, got {0:?}")]
    NotAMediaSection(SectionType),

    #[error("Memento kind mismatch: expected {expected:?}, found {found:?}")]
    MementoKindMismatch {
        expected: SectionType,
        found: SectionType,
    },

    #[error("Section {0:?} has no default content for a peer")]
    UnsupportedDefaultSection(SectionType),
}

/// Result type for info controller operations.
pub type InfoResult<T> = Result<T, InfoError>;
