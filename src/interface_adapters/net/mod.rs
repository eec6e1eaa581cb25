// Network adapters: the streaming connection to the position feed.

pub mod feed;

pub use feed::{FeedCommand, FeedHandle, FeedSettings, spawn_feed};
