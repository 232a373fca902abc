//! Raw protocol types exchanged with the remote sync source, plus the
//! outbound actions the timeline sends to the owning room object.

use serde::{Deserialize, Serialize};

/// Resolved profile of an event sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Delivery state of an event we sent ourselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendState {
    NotSentYet,
    Sent,
    SendingFailed(String),
}

/// Attachment descriptor shared by the media payload kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Human-readable body, usually the file name.
    pub body: String,
    /// Opaque content source URI resolved by the media layer.
    pub source: String,
    pub mimetype: Option<String>,
}

/// Message payload as delivered by the sync source, before marshaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawPayload {
    Text {
        body: String,
        /// Restricted-markup body, parsed by [`crate::markup::parse`]
        /// during marshaling.
        formatted_body: Option<String>,
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

/// A single chat event as delivered by the sync source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Protocol-level unique identifier, stable across re-marshals.
    pub event_id: String,
    pub sender: String,
    pub sender_profile: Profile,
    /// Origin timestamp in milliseconds.
    pub timestamp: u64,
    pub payload: RawPayload,
    /// Event id this event replies to, if any.
    pub reply_to: Option<String>,
    /// Root event id of the thread this event belongs to, if any.
    pub thread_root: Option<String>,
    pub editable: bool,
    pub is_local: bool,
    pub is_own: bool,
    pub is_remote: bool,
    pub send_state: SendState,
}

/// Non-event placeholder occupying a slot in the timeline sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VirtualItem {
    /// Divider between days; carries the day's timestamp in milliseconds.
    DayDivider(u64),
    /// Back-pagination request in flight.
    LoadingIndicator,
    ReadMarker,
    /// Very beginning of the room's history.
    TimelineStart,
}

/// One timeline slot as delivered by the sync source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawTimelineItem {
    Event(RawEvent),
    Virtual(VirtualItem),
}

/// Fire-and-forget requests from the timeline to the owning room/session
/// object. Retry and failure handling live with the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    SendMessage { body: String },
    SendReply { in_reply_to: String, body: String },
    SendReaction { event_id: String, key: String },
    EditMessage { event_id: String, new_body: String },
    /// Request `count` older events from history.
    PaginateBack { count: u16 },
}
