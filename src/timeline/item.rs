//! Marshaled view-model items making up the rendered timeline sequence.

use chrono::{Local, LocalResult, TimeZone};
use tracing::debug;

use crate::markup::{self, Document};
use crate::protocol::{MediaInfo, Profile, RawPayload, VirtualItem};

/// One slot in the rendered timeline sequence.
///
/// Sequence order is the authoritative display order; indices are stable
/// only between diff applications.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineItem {
    Event(EventItem),
    Virtual(VirtualItem),
    /// Placeholder for a slot whose real content has not arrived yet;
    /// keeps indices valid for out-of-range Set operations.
    Fill,
}

impl TimelineItem {
    /// Sender id, for Event items only.
    pub fn sender(&self) -> Option<&str> {
        match self {
            TimelineItem::Event(event) => Some(&event.sender),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventItem> {
        match self {
            TimelineItem::Event(event) => Some(event),
            _ => None,
        }
    }
}

/// Marshaled view-model for a single chat event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventItem {
    /// Local list identity, monotonically increasing per timeline.
    /// Distinct from `event_id`, which is stable across re-marshals.
    pub list_id: u64,
    pub event_id: String,
    pub sender: String,
    pub sender_profile: Profile,
    /// Origin timestamp in milliseconds.
    pub timestamp: u64,
    pub payload: Payload,
    pub reply_to: Option<String>,
    pub thread_root: Option<String>,
    /// The immediately preceding visible event shares this sender;
    /// rendering collapses the repeated sender header.
    pub grouped_by_user: bool,
}

impl EventItem {
    /// Wall-clock time of the event for display, e.g. "14:05".
    pub fn format_time(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp as i64) {
            LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
            _ => String::new(),
        }
    }
}

/// Human-readable label for a day divider, e.g. "Monday, 3 August 2026".
pub fn day_divider_label(timestamp_ms: u64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms as i64) {
        LocalResult::Single(dt) => dt.format("%A, %-d %B %Y").to_string(),
        _ => String::new(),
    }
}

/// Rendered message payload. Mirrors [`RawPayload`] except that text
/// carries the parsed document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text {
        body: String,
        /// Parsed formatted body, or the plain body wrapped as a single
        /// text/unhandled node.
        document: Document,
    },
    Image(MediaInfo),
    Video(MediaInfo),
    Audio(MediaInfo),
    File(MediaInfo),
    Notice { body: String },
    Emote { body: String },
    Sticker { body: String, source: String },
    RoomMembership { user_id: String, change: String },
    ProfileChange {
        display_name: Option<String>,
        prev_display_name: Option<String>,
    },
    State { event_type: String },
    RedactedMessage,
    UnableToDecrypt { cause: String },
    FailedToParse { event_type: String, error: String },
}

impl Payload {
    /// Marshal a raw payload into its rendered form.
    ///
    /// Formatted text bodies run through the markup parser; on failure
    /// the whole input is demoted to a single unparsed node, which is the
    /// caller-side fallback the parser contract expects.
    pub(crate) fn marshal(raw: RawPayload) -> Payload {
        match raw {
            RawPayload::Text { body, formatted_body } => {
                let document = match formatted_body.as_deref() {
                    Some(formatted) => markup::parse(formatted).unwrap_or_else(|err| {
                        debug!(%err, "formatted body rejected, falling back to plain text");
                        Document::Unhandled(body.clone())
                    }),
                    None => Document::Text(body.clone()),
                };
                Payload::Text { body, document }
            }
            RawPayload::Image(info) => Payload::Image(info),
            RawPayload::Video(info) => Payload::Video(info),
            RawPayload::Audio(info) => Payload::Audio(info),
            RawPayload::File(info) => Payload::File(info),
            RawPayload::Notice { body } => Payload::Notice { body },
            RawPayload::Emote { body } => Payload::Emote { body },
            RawPayload::Sticker { body, source } => Payload::Sticker { body, source },
            RawPayload::RoomMembership { user_id, change } => {
                Payload::RoomMembership { user_id, change }
            }
            RawPayload::ProfileChange { display_name, prev_display_name } => {
                Payload::ProfileChange { display_name, prev_display_name }
            }
            RawPayload::State { event_type } => Payload::State { event_type },
            RawPayload::RedactedMessage => Payload::RedactedMessage,
            RawPayload::UnableToDecrypt { cause } => Payload::UnableToDecrypt { cause },
            RawPayload::FailedToParse { event_type, error } => {
                Payload::FailedToParse { event_type, error }
            }
        }
    }
}
