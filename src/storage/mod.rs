//! Storage abstractions for collected documents.
//!
//! Every save creates a session directory named after the local time of the
//! save and writes one file per document, numbered from 1 in input order.
//!
//! ## Directory Structure
//!
//! ```text
//! Texts/
//! ├── Parsed Posts/                 # Collected posts
//! │   └── 17-10-2026 14-03-59/
//! │       ├── 1
//! │       └── 2
//! ├── Uploaded Texts/               # Plain texts
//! │   └── 17-10-2026 14-05-10/
//! │       └── 1
//! └── ML Examples/
//!     └── Examples.txt              # text|label lines
//! ```

pub mod codec;
pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, SentimentLabel, SentimentText};

// Re-export for convenience
pub use codec::LineCodec;
pub use local::LocalStorage;

/// Trait for document storage backends.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Save posts into a new session. Returns the session directory.
    async fn save_posts(&self, posts: &[Post]) -> Result<PathBuf>;

    /// Save plain texts into a new session. Returns the session directory.
    async fn save_texts(&self, texts: &[SentimentText]) -> Result<PathBuf>;

    /// Load every post of a session, in file number order.
    async fn load_posts(&self, session: &Path) -> Result<Vec<Post>>;

    /// Load every plain text of a session, in file number order.
    async fn load_texts(&self, session: &Path) -> Result<Vec<SentimentText>>;

    /// Append one labelled training example.
    async fn append_example(&self, text: &str, label: SentimentLabel) -> Result<()>;
}
