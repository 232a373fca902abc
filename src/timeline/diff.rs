//! Positional diff operations streamed from the remote sync source.

use crate::protocol::RawTimelineItem;

/// One incremental instruction describing how the remote view of the
/// timeline changed since the last update.
///
/// Indices address the post-state of the sequence. Operations must be
/// applied one at a time, in arrival order: each marshal step depends on
/// the sequence state left by the previous operation.
#[derive(Debug, Clone)]
pub enum TimelineDiff {
    /// Append the values, in order, to the end of the sequence.
    Append { values: Vec<RawTimelineItem> },
    /// Empty the sequence and the event metadata table.
    Clear,
    /// Insert at `index`, shifting later items right.
    Insert { index: usize, value: RawTimelineItem },
    /// Overwrite `index`, padding with Fill markers if it is past the
    /// current end.
    Set { index: usize, value: RawTimelineItem },
    /// Delete `index`; out of range is a no-op.
    Remove { index: usize },
    PushBack { value: RawTimelineItem },
    PushFront { value: RawTimelineItem },
    /// Remove the last item; empty sequence is a no-op.
    PopBack,
    /// Remove the first item; empty sequence is a no-op.
    PopFront,
    /// Replace the whole sequence with the given values.
    Reset { values: Vec<RawTimelineItem> },
}

impl TimelineDiff {
    /// Operation name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TimelineDiff::Append { .. } => "append",
            TimelineDiff::Clear => "clear",
            TimelineDiff::Insert { .. } => "insert",
            TimelineDiff::Set { .. } => "set",
            TimelineDiff::Remove { .. } => "remove",
            TimelineDiff::PushBack { .. } => "push_back",
            TimelineDiff::PushFront { .. } => "push_front",
            TimelineDiff::PopBack => "pop_back",
            TimelineDiff::PopFront => "pop_front",
            TimelineDiff::Reset { .. } => "reset",
        }
    }
}
