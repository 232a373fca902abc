//! chatline: chat timeline core.
//!
//! Two independently useful components consumed by a presentation layer:
//!
//! - [`markup`] — a streaming parser for the restricted HTML subset used
//!   in rich-text chat messages, producing an immutable [`Document`]
//!   tree ready for rendering.
//! - [`timeline`] — a reconciler maintaining the ordered sequence of
//!   rendered chat events under a stream of positional diff operations
//!   from a remote sync source.
//!
//! Everything around them (widgets, session plumbing, media caching) is
//! expected to live in the embedding application.

pub mod config;
pub mod markup;
pub mod protocol;
pub mod timeline;


pub use config::TimelineConfig;
pub use markup::{parse, Document, ParseError};
pub use timeline::{PaginationStatus, TimelineController, TimelineDiff, TimelineItem};
