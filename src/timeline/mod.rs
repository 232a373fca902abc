//! Timeline reconciliation: an ordered sequence of rendered chat items
//! kept in sync with a remote source through a stream of positional
//! diffs.
//!
//! All mutation is owned by a single worker task applying diffs strictly
//! in arrival order; readers observe immutable snapshots published after
//! each completed mutation and never contend with an in-flight update.

mod diff;
mod item;
mod state;

pub use diff::TimelineDiff;
pub use item::{day_divider_label, EventItem, Payload, TimelineItem};
pub use state::{EventMeta, PaginationStatus, ThreadEntry, TimelineState};

use std::sync::Arc;

use crossbeam_channel::Sender;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::TimelineConfig;
use crate::protocol::{RawTimelineItem, RoomAction};

/// The owning room stopped listening for outbound actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("room action channel disconnected")]
pub struct RoomDisconnected;

/// Handle to a live room timeline subscription.
///
/// Created at room-subscription time with the initial snapshot; mutated
/// by the diff stream for the room's lifetime; disposed when the room
/// view goes away.
pub struct TimelineController {
    items_rx: watch::Receiver<Arc<Vec<TimelineItem>>>,
    pagination_rx: watch::Receiver<PaginationStatus>,
    initialized_rx: watch::Receiver<bool>,
    action_tx: Sender<RoomAction>,
    config: TimelineConfig,
    worker: JoinHandle<()>,
}

impl TimelineController {
    /// Start a subscription: apply `initial` as the first snapshot, then
    /// keep the sequence synchronized with diffs arriving on `diff_rx`.
    ///
    /// Must be called within a tokio runtime; the worker task owns all
    /// mutation. Outbound actions are delivered on `action_tx` to the
    /// external room object.
    pub fn subscribe(
        config: TimelineConfig,
        initial: Vec<RawTimelineItem>,
        diff_rx: mpsc::UnboundedReceiver<TimelineDiff>,
        action_tx: Sender<RoomAction>,
    ) -> Self {
        let (items_tx, items_rx) = watch::channel(Arc::new(Vec::new()));
        let (pagination_tx, pagination_rx) = watch::channel(PaginationStatus::Idle);
        let (initialized_tx, initialized_rx) = watch::channel(false);

        let worker = tokio::spawn(run_worker(
            initial,
            diff_rx,
            items_tx,
            pagination_tx,
            initialized_tx,
        ));

        Self {
            items_rx,
            pagination_rx,
            initialized_rx,
            action_tx,
            config,
            worker,
        }
    }

    /// Snapshot of the current sequence. Cheap to call; never blocks on
    /// a pending mutation.
    pub fn items(&self) -> Arc<Vec<TimelineItem>> {
        self.items_rx.borrow().clone()
    }

    /// Watch handle for the sequence, for render loops that want change
    /// notifications.
    pub fn watch_items(&self) -> watch::Receiver<Arc<Vec<TimelineItem>>> {
        let mut rx = self.items_rx.clone();
        rx.mark_unchanged();
        rx
    }

    pub fn pagination_status(&self) -> PaginationStatus {
        *self.pagination_rx.borrow()
    }

    pub fn watch_pagination(&self) -> watch::Receiver<PaginationStatus> {
        let mut rx = self.pagination_rx.clone();
        rx.mark_unchanged();
        rx
    }

    /// True once the initial snapshot has been applied.
    pub fn is_initialized(&self) -> bool {
        *self.initialized_rx.borrow()
    }

    /// Wait for the initial snapshot to be applied.
    pub async fn initialized(&self) {
        let mut rx = self.initialized_rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn send_message(&self, body: impl Into<String>) -> Result<(), RoomDisconnected> {
        self.act(RoomAction::SendMessage { body: body.into() })
    }

    pub fn send_reply(
        &self,
        in_reply_to: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<(), RoomDisconnected> {
        self.act(RoomAction::SendReply {
            in_reply_to: in_reply_to.into(),
            body: body.into(),
        })
    }

    pub fn send_reaction(
        &self,
        event_id: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<(), RoomDisconnected> {
        self.act(RoomAction::SendReaction {
            event_id: event_id.into(),
            key: key.into(),
        })
    }

    pub fn edit_message(
        &self,
        event_id: impl Into<String>,
        new_body: impl Into<String>,
    ) -> Result<(), RoomDisconnected> {
        self.act(RoomAction::EditMessage {
            event_id: event_id.into(),
            new_body: new_body.into(),
        })
    }

    /// Request older history; `count` falls back to the configured page
    /// size.
    pub fn paginate_back(&self, count: Option<u16>) -> Result<(), RoomDisconnected> {
        self.act(RoomAction::PaginateBack {
            count: count.unwrap_or(self.config.pagination_page_size),
        })
    }

    /// End the subscription. The worker's only suspension point is
    /// waiting for the next diff, so an in-flight mutation always runs
    /// to completion and the metadata table stays consistent.
    pub fn dispose(self) {
        drop(self);
    }

    fn act(&self, action: RoomAction) -> Result<(), RoomDisconnected> {
        self.action_tx.send(action).map_err(|_| RoomDisconnected)
    }
}

impl Drop for TimelineController {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker(
    initial: Vec<RawTimelineItem>,
    mut diff_rx: mpsc::UnboundedReceiver<TimelineDiff>,
    items_tx: watch::Sender<Arc<Vec<TimelineItem>>>,
    pagination_tx: watch::Sender<PaginationStatus>,
    initialized_tx: watch::Sender<bool>,
) {
    let mut state = TimelineState::new();
    state.apply_diff(TimelineDiff::Reset { values: initial });
    publish(&state, &items_tx, &pagination_tx);
    let _ = initialized_tx.send(true);
    debug!(len = state.len(), "timeline initialized");

    while let Some(diff) = diff_rx.recv().await {
        state.apply_diff(diff);
        publish(&state, &items_tx, &pagination_tx);
    }
    debug!("timeline diff stream closed");
}

fn publish(
    state: &TimelineState,
    items_tx: &watch::Sender<Arc<Vec<TimelineItem>>>,
    pagination_tx: &watch::Sender<PaginationStatus>,
) {
    let _ = items_tx.send(Arc::new(state.items().to_vec()));
    let _ = pagination_tx.send(state.pagination_status());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Profile, RawEvent, RawPayload, SendState, VirtualItem};
    use crossbeam_channel::unbounded;

    fn raw_event(id: &str, sender: &str, timestamp: u64) -> RawTimelineItem {
        RawTimelineItem::Event(RawEvent {
            event_id: id.to_string(),
            sender: sender.to_string(),
            sender_profile: Profile::default(),
            timestamp,
            payload: RawPayload::Text {
                body: format!("body of {id}"),
                formatted_body: None,
            },
            reply_to: None,
            thread_root: None,
            editable: true,
            is_local: false,
            is_own: false,
            is_remote: true,
            send_state: SendState::Sent,
        })
    }

    fn subscribe_with(
        initial: Vec<RawTimelineItem>,
    ) -> (
        TimelineController,
        mpsc::UnboundedSender<TimelineDiff>,
        crossbeam_channel::Receiver<RoomAction>,
    ) {
        let (diff_tx, diff_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = unbounded();
        let controller =
            TimelineController::subscribe(TimelineConfig::default(), initial, diff_rx, action_tx);
        (controller, diff_tx, action_rx)
    }

    #[tokio::test]
    async fn test_initialized_flips_after_snapshot() {
        let (controller, _diff_tx, _action_rx) =
            subscribe_with(vec![raw_event("$1", "alice", 1)]);
        controller.initialized().await;
        assert!(controller.is_initialized());
        assert_eq!(controller.items().len(), 1);
    }

    #[tokio::test]
    async fn test_diffs_update_published_snapshot() {
        let (controller, diff_tx, _action_rx) = subscribe_with(vec![]);
        controller.initialized().await;

        let mut items_rx = controller.watch_items();
        diff_tx
            .send(TimelineDiff::PushBack { value: raw_event("$1", "alice", 1) })
            .unwrap();
        items_rx.changed().await.unwrap();
        assert_eq!(controller.items().len(), 1);

        diff_tx
            .send(TimelineDiff::PushBack { value: raw_event("$2", "alice", 2) })
            .unwrap();
        items_rx.changed().await.unwrap();
        let items = controller.items();
        assert_eq!(items.len(), 2);
        assert!(items[1].as_event().unwrap().grouped_by_user);
    }

    #[tokio::test]
    async fn test_diff_burst_applies_in_order() {
        let (controller, diff_tx, _action_rx) = subscribe_with(vec![]);

        for i in 0..50u64 {
            diff_tx
                .send(TimelineDiff::PushBack {
                    value: raw_event(&format!("${i}"), "alice", i),
                })
                .unwrap();
        }
        diff_tx.send(TimelineDiff::PopFront).unwrap();

        let mut items_rx = controller.watch_items();
        loop {
            if items_rx.borrow_and_update().len() == 49 {
                break;
            }
            items_rx.changed().await.unwrap();
        }
        let items = controller.items();
        assert_eq!(items[0].as_event().unwrap().event_id, "$1");
        assert_eq!(items[48].as_event().unwrap().event_id, "$49");
    }

    #[tokio::test]
    async fn test_pagination_status_published() {
        let (controller, diff_tx, _action_rx) = subscribe_with(vec![raw_event("$1", "alice", 1)]);
        controller.initialized().await;
        assert_eq!(controller.pagination_status(), PaginationStatus::Idle);

        let mut pagination_rx = controller.watch_pagination();
        diff_tx
            .send(TimelineDiff::PushFront {
                value: RawTimelineItem::Virtual(VirtualItem::TimelineStart),
            })
            .unwrap();
        pagination_rx.changed().await.unwrap();
        assert_eq!(controller.pagination_status(), PaginationStatus::EndReached);
    }

    #[tokio::test]
    async fn test_actions_reach_the_room() {
        let (controller, _diff_tx, action_rx) = subscribe_with(vec![]);

        controller.send_message("hi there").unwrap();
        controller.send_reply("$1", "replying").unwrap();
        controller.send_reaction("$1", "👍").unwrap();
        controller.edit_message("$1", "edited").unwrap();
        controller.paginate_back(None).unwrap();

        assert_eq!(
            action_rx.recv().unwrap(),
            RoomAction::SendMessage { body: "hi there".into() }
        );
        assert_eq!(
            action_rx.recv().unwrap(),
            RoomAction::SendReply { in_reply_to: "$1".into(), body: "replying".into() }
        );
        assert_eq!(
            action_rx.recv().unwrap(),
            RoomAction::SendReaction { event_id: "$1".into(), key: "👍".into() }
        );
        assert_eq!(
            action_rx.recv().unwrap(),
            RoomAction::EditMessage { event_id: "$1".into(), new_body: "edited".into() }
        );
        assert_eq!(
            action_rx.recv().unwrap(),
            RoomAction::PaginateBack { count: TimelineConfig::default().pagination_page_size }
        );
    }

    #[tokio::test]
    async fn test_action_after_room_gone() {
        let (controller, _diff_tx, action_rx) = subscribe_with(vec![]);
        drop(action_rx);
        assert_eq!(controller.send_message("nobody home"), Err(RoomDisconnected));
    }

    #[tokio::test]
    async fn test_dispose_stops_the_worker() {
        let (controller, diff_tx, _action_rx) = subscribe_with(vec![]);
        controller.initialized().await;
        controller.dispose();
        // The worker is gone; sending another diff must not panic even
        // though nobody will apply it.
        let _ = diff_tx.send(TimelineDiff::PopBack);
    }
}
