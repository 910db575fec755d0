// src/services/parser.rs

//! Document parser.
//!
//! Turns one raw JSON page into typed documents. A payload with a top-level
//! `error` object becomes `AppError::Api`, whatever its code.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{Author, Comment, Comments, Post};

/// One page of `newsfeed.search`.
#[derive(Debug, Default)]
pub struct SearchPage {
    pub posts: Vec<Post>,
    /// Continuation token; absent once the results (or the 1000 cap) are exhausted
    pub next_from: Option<String>,
}

/// Demographic fields of one `users.get` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub sex: Option<i64>,
    #[serde(default)]
    pub bdate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: i64,
    owner_id: i64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    comments: Option<RawCount>,
}

#[derive(Debug, Deserialize)]
struct RawCount {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    from_id: i64,
    #[serde(default)]
    text: String,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        let has_comments = raw.comments.is_some_and(|c| c.count > 0);
        Post::new(raw.id.to_string(), raw.text, Author::new(raw.owner_id.to_string()))
            .with_comments(if has_comments {
                Comments::Empty
            } else {
                Comments::NotRequested
            })
    }
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Comment::new(raw.text, Author::new(raw.from_id.to_string()))
    }
}

/// Parse a `wall.get` page.
pub fn parse_wall_page(raw: &str) -> Result<Vec<Post>> {
    let list: ItemList<RawPost> = unwrap_response(raw)?;
    Ok(list.items.into_iter().map(Post::from).collect())
}

/// Parse a `newsfeed.search` page.
pub fn parse_search_page(raw: &str) -> Result<SearchPage> {
    let list: ItemList<RawPost> = unwrap_response(raw)?;
    Ok(SearchPage {
        posts: list.items.into_iter().map(Post::from).collect(),
        next_from: list.next_from.filter(|token| !token.is_empty()),
    })
}

/// Parse a `wall.getComments` page.
pub fn parse_comments_page(raw: &str) -> Result<Vec<Comment>> {
    let list: ItemList<RawComment> = unwrap_response(raw)?;
    Ok(list.items.into_iter().map(Comment::from).collect())
}

/// Parse a `users.get` response.
pub fn parse_users(raw: &str) -> Result<Vec<UserInfo>> {
    unwrap_response(raw)
}

fn unwrap_response<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(raw)?;
    if let Some(error) = envelope.error {
        log::warn!("API error {}: {}", error.error_code, error.error_msg);
        return Err(AppError::api(error.error_code, error.error_msg));
    }
    envelope
        .response
        .ok_or_else(|| AppError::api(0, "payload has neither response nor error"))
}
