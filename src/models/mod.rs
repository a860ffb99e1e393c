mod feed;
mod viewer;

pub use feed::{FeedRecord, NewFeed, ValidationError};
pub use viewer::{Notice, NoticeLevel, ViewerState};
