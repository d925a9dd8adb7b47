// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Messages, their media payloads and polls.

use crate::ids::{FullMsgId, PollId};
use crate::shared_media::MediaType;

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    Photo,
    Video,
    Gif,
    File,
    Music,
    Voice,
    RoundVideo,
    /// Message with a link preview.
    WebPage,
    /// Chat photo change service message.
    ChatPhoto,
    Poll(PollId),
}

impl MediaPayload {
    /// Poll carried by this payload, if any.
    pub fn poll(&self) -> Option<PollId> {
        match self {
            Self::Poll(poll) => Some(*poll),
            _ => None,
        }
    }
}

/// A message as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageData {
    pub id: FullMsgId,
    pub text: String,
    pub media: Option<MediaPayload>,
    /// Queued for future delivery; lives in the scheduled timeline.
    pub scheduled: bool,
    pub pinned: bool,
}

impl MessageData {
    pub fn new(id: FullMsgId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            media: None,
            scheduled: false,
            pinned: false,
        }
    }

    pub fn with_media(mut self, media: MediaPayload) -> Self {
        self.media = Some(media);
        self
    }

    pub fn scheduled(mut self) -> Self {
        self.scheduled = true;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Shared-media lists this message belongs to.
    pub fn shared_media_types(&self) -> Vec<MediaType> {
        let mut result = match &self.media {
            Some(MediaPayload::Photo) => vec![MediaType::Photo, MediaType::PhotoVideo],
            Some(MediaPayload::Video) => vec![MediaType::Video, MediaType::PhotoVideo],
            Some(MediaPayload::Gif) => vec![MediaType::Gif],
            Some(MediaPayload::File) => vec![MediaType::File],
            Some(MediaPayload::Music) => vec![MediaType::MusicFile],
            Some(MediaPayload::Voice) => vec![MediaType::VoiceFile, MediaType::RoundVoiceFile],
            Some(MediaPayload::RoundVideo) => {
                vec![MediaType::RoundFile, MediaType::RoundVoiceFile]
            }
            Some(MediaPayload::WebPage) => vec![MediaType::Link],
            Some(MediaPayload::ChatPhoto) => vec![MediaType::ChatPhoto],
            Some(MediaPayload::Poll(_)) | None => Vec::new(),
        };
        if self.pinned {
            result.push(MediaType::Pinned);
        }
        result
    }
}

/// A poll as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollData {
    pub id: PollId,
    pub question: String,
}
