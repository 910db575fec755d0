//! Text documents: plain texts, posts and comments.

use serde::{Deserialize, Serialize};

use crate::models::{Author, Sentiment};

/// Uniform access to the text of a document and its sentiment slot.
pub trait Textual {
    fn text(&self) -> &str;

    fn sentiment(&self) -> Option<&Sentiment>;

    fn set_sentiment(&mut self, sentiment: Sentiment);

    /// Whether the text is empty or whitespace only.
    fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// A piece of text that may carry a classifier result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentText {
    pub text: String,

    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

impl SentimentText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sentiment: None,
        }
    }
}

impl Textual for SentimentText {
    fn text(&self) -> &str {
        &self.text
    }

    fn sentiment(&self) -> Option<&Sentiment> {
        self.sentiment.as_ref()
    }

    fn set_sentiment(&mut self, sentiment: Sentiment) {
        self.sentiment = Some(sentiment);
    }
}

/// Platform a post was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MediaSource {
    #[default]
    Vk,
}

/// Comments of a post.
///
/// `Empty` means the platform reported comments that have not been fetched
/// (yet). `NotRequested` covers both "no comments" and "fetch failed".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Comments {
    #[default]
    NotRequested,
    Empty,
    Fetched(Vec<Comment>),
}

impl Comments {
    /// Whether the post is flagged for a comment sub-fetch.
    pub fn is_pending(&self) -> bool {
        matches!(self, Comments::Empty)
    }

    /// Fetched comments, empty for the other states.
    pub fn as_slice(&self) -> &[Comment] {
        match self {
            Comments::Fetched(list) => list,
            _ => &[],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [Comment] {
        match self {
            Comments::Fetched(list) => list,
            _ => &mut [],
        }
    }
}

/// A comment under a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Author,
    pub content: SentimentText,
}

impl Comment {
    pub fn new(text: impl Into<String>, author: Author) -> Self {
        Self {
            author,
            content: SentimentText::new(text),
        }
    }
}

impl Textual for Comment {
    fn text(&self) -> &str {
        &self.content.text
    }

    fn sentiment(&self) -> Option<&Sentiment> {
        self.content.sentiment.as_ref()
    }

    fn set_sentiment(&mut self, sentiment: Sentiment) {
        self.content.sentiment = Some(sentiment);
    }
}

/// A wall or newsfeed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub source: MediaSource,
    pub author: Author,
    pub content: SentimentText,
    pub comments: Comments,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>, author: Author) -> Self {
        Self {
            id: id.into(),
            source: MediaSource::Vk,
            author,
            content: SentimentText::new(text),
            comments: Comments::NotRequested,
        }
    }

    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    /// All authors of the post and its fetched comments.
    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        std::iter::once(&self.author).chain(self.comments.as_slice().iter().map(|c| &c.author))
    }

    pub fn authors_mut(&mut self) -> impl Iterator<Item = &mut Author> {
        std::iter::once(&mut self.author).chain(
            self.comments
                .as_mut_slice()
                .iter_mut()
                .map(|c| &mut c.author),
        )
    }
}

impl Textual for Post {
    fn text(&self) -> &str {
        &self.content.text
    }

    fn sentiment(&self) -> Option<&Sentiment> {
        self.content.sentiment.as_ref()
    }

    fn set_sentiment(&mut self, sentiment: Sentiment) {
        self.content.sentiment = Some(sentiment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(SentimentText::new("  \n\t").is_blank());
        assert!(SentimentText::new("").is_blank());
        assert!(!Post::new("1", " hi ", Author::new("1")).is_blank());
    }

    #[test]
    fn test_comment_states_are_distinct() {
        assert_ne!(Comments::NotRequested, Comments::Empty);
        assert_ne!(Comments::Empty, Comments::Fetched(Vec::new()));
        assert!(Comments::Empty.is_pending());
        assert!(!Comments::Fetched(Vec::new()).is_pending());
    }

    #[test]
    fn test_authors_mut_covers_comments() {
        let mut post = Post::new("1", "text", Author::new("10")).with_comments(
            Comments::Fetched(vec![
                Comment::new("a", Author::new("11")),
                Comment::new("b", Author::new("12")),
            ]),
        );
        let ids: Vec<String> = post.authors_mut().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec!["10", "11", "12"]);
    }
}
