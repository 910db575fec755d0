// src/pipeline/collect.rs

//! Collect-and-save pipeline.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::services::{CollectOptions, Collector, Transport};
use crate::storage::DocumentStorage;

/// What to collect.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectTarget {
    Owner {
        owner_id: String,
        count: usize,
        offset: u32,
    },
    Popular {
        per_source: usize,
    },
    Topic {
        query: String,
        count: usize,
    },
    TopicInRange {
        query: String,
        count: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl fmt::Display for CollectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectTarget::Owner { owner_id, .. } => write!(f, "wall {owner_id}"),
            CollectTarget::Popular { .. } => write!(f, "popular sources"),
            CollectTarget::Topic { query, .. } => write!(f, "topic '{query}'"),
            CollectTarget::TopicInRange {
                query, start, end, ..
            } => write!(f, "topic '{query}' from {start} to {end}"),
        }
    }
}

/// Collect posts for `target` and save them as one session.
///
/// Returns the session directory, or `None` when the collection produced no
/// result (nothing is saved then).
pub async fn run_collect<T: Transport>(
    collector: &Collector<T>,
    storage: &dyn DocumentStorage,
    target: &CollectTarget,
    options: CollectOptions,
) -> Result<Option<PathBuf>> {
    log::info!("Collecting from {}", target);

    let posts = match target {
        CollectTarget::Owner {
            owner_id,
            count,
            offset,
        } => {
            collector
                .collect_from_owner(owner_id, *count, *offset, options)
                .await?
        }
        CollectTarget::Popular { per_source } => {
            collector
                .collect_from_popular_sources(*per_source, options)
                .await?
        }
        CollectTarget::Topic { query, count } => {
            collector.collect_by_topic(query, *count, options).await?
        }
        CollectTarget::TopicInRange {
            query,
            count,
            start,
            end,
        } => {
            collector
                .collect_by_topic_in_range(query, *count, *start, *end, options)
                .await?
        }
    };

    let Some(posts) = posts else {
        log::warn!("No result from {}; nothing saved", target);
        return Ok(None);
    };

    let comments: usize = posts.iter().map(|p| p.comments.as_slice().len()).sum();
    let dir = storage.save_posts(&posts).await?;
    log::info!(
        "Session {}: {} post(s), {} comment(s)",
        dir.display(),
        posts.len(),
        comments
    );
    Ok(Some(dir))
}
