//! The owned timeline sequence and the diff application algorithm.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{trace, warn};

use crate::protocol::{RawEvent, RawTimelineItem, SendState, VirtualItem};

use super::diff::TimelineDiff;
use super::item::{EventItem, Payload, TimelineItem};

/// Per-event flags that rendering does not need, kept out of the main
/// sequence. An entry exists exactly as long as the event is present in
/// the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    pub editable: bool,
    pub is_local: bool,
    pub is_own: bool,
    pub is_remote: bool,
    pub send_state: SendState,
}

/// Most recent event seen for a thread root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEntry {
    pub event_id: String,
    pub timestamp: u64,
}

/// Whether older history can be requested. Derived purely from the first
/// sequence item after every applied diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStatus {
    /// More history may exist; no request in flight.
    Idle,
    /// A back-pagination request is in flight.
    Paginating,
    /// The start of the timeline has been reached.
    EndReached,
}

/// The ordered timeline sequence plus its derived indexes.
///
/// Not synchronized: exactly one owner applies diffs, one at a time, and
/// publishes snapshots to readers (see [`TimelineController`]).
///
/// [`TimelineController`]: super::TimelineController
#[derive(Debug, Default)]
pub struct TimelineState {
    items: Vec<TimelineItem>,
    metadata: HashMap<String, EventMeta>,
    threads: HashMap<String, ThreadEntry>,
    next_list_id: u64,
}

impl TimelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current ordered sequence.
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Metadata for an event currently in the sequence.
    pub fn metadata(&self, event_id: &str) -> Option<&EventMeta> {
        self.metadata.get(event_id)
    }

    /// Latest event seen for the given thread root.
    pub fn thread_latest(&self, thread_root: &str) -> Option<&ThreadEntry> {
        self.threads.get(thread_root)
    }

    pub fn pagination_status(&self) -> PaginationStatus {
        match self.items.first() {
            Some(TimelineItem::Virtual(VirtualItem::TimelineStart)) => PaginationStatus::EndReached,
            Some(TimelineItem::Virtual(VirtualItem::LoadingIndicator)) => {
                PaginationStatus::Paginating
            }
            _ => PaginationStatus::Idle,
        }
    }

    /// Apply one diff operation, completing all derived updates (grouping,
    /// metadata, thread index) before returning.
    pub fn apply_diff(&mut self, diff: TimelineDiff) {
        trace!(op = diff.kind(), len = self.items.len(), "applying timeline diff");
        match diff {
            TimelineDiff::Append { values } => {
                for value in values {
                    self.push_back(value);
                }
            }
            TimelineDiff::Clear => self.clear(),
            TimelineDiff::Insert { index, value } => {
                let index = index.min(self.items.len());
                let prev = self.sender_before(index);
                let item = self.marshal(value, prev.as_deref());
                self.items.insert(index, item);
            }
            TimelineDiff::Set { index, value } => self.set(index, value),
            TimelineDiff::Remove { index } => {
                if index < self.items.len() {
                    let removed = self.items.remove(index);
                    self.forget(removed);
                } else {
                    warn!(index, len = self.items.len(), "remove index out of range, ignoring");
                }
            }
            TimelineDiff::PushBack { value } => self.push_back(value),
            TimelineDiff::PushFront { value } => {
                // No predecessor: a front item is never grouped itself.
                let item = self.marshal(value, None);
                let sender = item.sender().map(str::to_owned);
                self.items.insert(0, item);
                if let (Some(sender), Some(TimelineItem::Event(old_first))) =
                    (sender, self.items.get_mut(1))
                {
                    if old_first.sender == sender {
                        old_first.grouped_by_user = true;
                    }
                }
            }
            TimelineDiff::PopBack => match self.items.pop() {
                Some(item) => self.forget(item),
                None => warn!("pop_back on empty sequence, ignoring"),
            },
            TimelineDiff::PopFront => {
                if self.items.is_empty() {
                    warn!("pop_front on empty sequence, ignoring");
                } else {
                    let item = self.items.remove(0);
                    self.forget(item);
                }
            }
            TimelineDiff::Reset { values } => {
                self.clear();
                for value in values {
                    self.push_back(value);
                }
            }
        }
    }

    fn push_back(&mut self, value: RawTimelineItem) {
        let prev = self.items.last().and_then(|it| it.sender().map(str::to_owned));
        let item = self.marshal(value, prev.as_deref());
        self.items.push(item);
    }

    fn set(&mut self, index: usize, value: RawTimelineItem) {
        // Out-of-range Set pads rather than failing, so a later-arriving
        // slot keeps earlier indices valid.
        while self.items.len() < index {
            self.items.push(TimelineItem::Fill);
        }
        let prev = self.sender_before(index);
        let item = self.marshal(value, prev.as_deref());
        let new_sender = item.sender().map(str::to_owned);
        if index == self.items.len() {
            self.items.push(item);
        } else {
            let old = std::mem::replace(&mut self.items[index], item);
            if let TimelineItem::Event(old_event) = old {
                let still_present = matches!(
                    self.items.get(index),
                    Some(TimelineItem::Event(new)) if new.event_id == old_event.event_id
                );
                if !still_present {
                    self.metadata.remove(&old_event.event_id);
                }
            }
        }
        // Narrow, index-local re-evaluation: only the immediate successor
        // can lose its grouping when the sender at `index` changed.
        if let Some(TimelineItem::Event(next)) = self.items.get_mut(index + 1) {
            if next.grouped_by_user && Some(next.sender.as_str()) != new_sender.as_deref() {
                next.grouped_by_user = false;
            }
        }
    }

    /// Sender of the item currently at `index - 1`, if it is an event.
    fn sender_before(&self, index: usize) -> Option<String> {
        let prev = index.checked_sub(1)?;
        self.items.get(prev).and_then(|it| it.sender().map(str::to_owned))
    }

    fn clear(&mut self) {
        self.items.clear();
        self.metadata.clear();
        // The thread index is derived from the sequence; an empty
        // sequence has no threads.
        self.threads.clear();
    }

    /// Drop the metadata entry of a removed item, keeping the side table
    /// consistent with the sequence.
    fn forget(&mut self, item: TimelineItem) {
        if let TimelineItem::Event(event) = item {
            self.metadata.remove(&event.event_id);
        }
    }

    fn marshal(&mut self, value: RawTimelineItem, prev_sender: Option<&str>) -> TimelineItem {
        match value {
            RawTimelineItem::Virtual(virt) => TimelineItem::Virtual(virt),
            RawTimelineItem::Event(raw) => TimelineItem::Event(self.marshal_event(raw, prev_sender)),
        }
    }

    fn marshal_event(&mut self, raw: RawEvent, prev_sender: Option<&str>) -> EventItem {
        let list_id = self.next_list_id;
        self.next_list_id += 1;

        self.metadata.insert(
            raw.event_id.clone(),
            EventMeta {
                editable: raw.editable,
                is_local: raw.is_local,
                is_own: raw.is_own,
                is_remote: raw.is_remote,
                send_state: raw.send_state,
            },
        );

        if let Some(root) = &raw.thread_root {
            match self.threads.entry(root.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(ThreadEntry {
                        event_id: raw.event_id.clone(),
                        timestamp: raw.timestamp,
                    });
                }
                Entry::Occupied(mut entry) => {
                    if raw.timestamp > entry.get().timestamp {
                        entry.insert(ThreadEntry {
                            event_id: raw.event_id.clone(),
                            timestamp: raw.timestamp,
                        });
                    }
                }
            }
            trace!(thread = %root, event = %raw.event_id, "thread index updated");
        }

        let grouped_by_user = prev_sender.is_some_and(|sender| sender == raw.sender);

        EventItem {
            list_id,
            event_id: raw.event_id,
            sender: raw.sender,
            sender_profile: raw.sender_profile,
            timestamp: raw.timestamp,
            payload: Payload::marshal(raw.payload),
            reply_to: raw.reply_to,
            thread_root: raw.thread_root,
            grouped_by_user,
        }
    }
}
