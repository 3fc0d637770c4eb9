//! External source adapters for ScriptSpy.
//!
//! Each client fetches raw items from one provider: Google Trends RSS,
//! NewsAPI headlines, Reddit hot posts, and Instagram profile posts via the
//! Apify actor API. Clients keep no state between calls.

pub mod adapter;
pub mod error;
pub mod google_trends;
pub mod http;
pub mod instagram;
pub mod news;
pub mod reddit;
pub mod types;

mod fields;
mod retry;

pub use adapter::TrendAdapter;
pub use error::SourceError;
pub use google_trends::GoogleTrendsClient;
pub use http::HttpSettings;
pub use instagram::InstagramClient;
pub use news::NewsClient;
pub use reddit::{RedditClient, RedditCredentials};
pub use types::{InstagramPost, SourceItem};
