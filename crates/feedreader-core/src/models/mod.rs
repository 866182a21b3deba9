//! Data models for aggregator entities.
//!
//! - `Feed`: a followed RSS/Atom source, listed publicly
//! - `Post`: an item scraped from a feed, visible to signed-up users

pub mod feed;
pub mod post;

pub use feed::{Feed, NullTime};
pub use post::Post;
