//! Hand observation sources.
//!
//! - [`line`] - Text frames from a file, a pipe or a terminal
//! - [`feed`] - Runs any [`HandSource`](handservo_common::hand::HandSource) on its own thread

pub mod feed;
pub mod line;

pub use feed::{FeedEvent, FrameFeed};
pub use line::LineSource;
