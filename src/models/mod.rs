// src/models/mod.rs

//! Domain models for the collector.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod author;
mod config;
mod document;
mod sentiment;

// Re-export all public types
pub use author::{Author, Sex};
pub use config::{
    ACCESS_TOKEN_ENV, ApiConfig, CollectConfig, Config, LoggingConfig, StorageConfig,
};
pub use document::{Comment, Comments, MediaSource, Post, SentimentText, Textual};
pub use sentiment::{Sentiment, SentimentLabel};
