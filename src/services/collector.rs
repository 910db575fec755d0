// src/services/collector.rs

//! Post collector.
//!
//! Entry points for collecting posts from one wall, from a list of popular
//! communities, or by topic search. Each call runs strictly sequentially:
//! pages in order, comments of each retained post before the next post, and
//! one author enrichment pass at the very end.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{CollectConfig, Comments, Config, Post};
use crate::services::api::{
    MAX_COMMENTS_PER_REQUEST, MAX_NEWSFEED_POSTS_PER_REQUEST, MAX_POSTS_PER_REQUEST,
    MAX_RANGED_NEWSFEED_POSTS_PER_REQUEST, SEARCH_RESULT_CAP, Transport, VkApiClient,
};
use crate::services::enricher::AuthorEnricher;
use crate::services::paginate::{Cursor, DrainRule, Page, PagePlan, keep, paginate};
use crate::services::parser::{parse_comments_page, parse_search_page, parse_wall_page};
use crate::utils::http::HttpTransport;

/// Per-call collection switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Run one author enrichment pass over the result.
    pub with_authors: bool,
    /// Comments per post: `None` for all, `Some(0)` to skip comments.
    pub comments_per_post: Option<usize>,
    /// Drop posts and comments without text.
    pub skip_blank: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            with_authors: false,
            comments_per_post: None,
            skip_blank: true,
        }
    }
}

impl From<&CollectConfig> for CollectOptions {
    fn from(config: &CollectConfig) -> Self {
        Self {
            skip_blank: config.skip_blank,
            ..Self::default()
        }
    }
}

/// Collects posts through the VK API.
pub struct Collector<T: Transport = HttpTransport> {
    client: VkApiClient<T>,
    popular_sources_file: PathBuf,
}

impl Collector<HttpTransport> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            VkApiClient::from_config(&config.api)?,
            &config.collect.popular_sources_file,
        ))
    }
}

impl<T: Transport> Collector<T> {
    pub fn new(client: VkApiClient<T>, popular_sources_file: impl AsRef<Path>) -> Self {
        Self {
            client,
            popular_sources_file: popular_sources_file.as_ref().to_path_buf(),
        }
    }

    pub fn client(&self) -> &VkApiClient<T> {
        &self.client
    }

    /// Collect up to `count` posts from the wall of `owner_id`, starting at `offset`.
    ///
    /// Returns `Ok(None)` when any wall page answered with an API error.
    pub async fn collect_from_owner(
        &self,
        owner_id: &str,
        count: usize,
        offset: u32,
        options: CollectOptions,
    ) -> Result<Option<Vec<Post>>> {
        log::info!("Collecting {} post(s) from wall {}", count, owner_id);
        let posts = self.owner_posts(owner_id, count, offset, options).await?;
        self.finish(posts, options).await
    }

    /// Collect up to `per_source` posts from every popular community.
    ///
    /// Communities answering with an API error are skipped. Returns
    /// `Ok(None)` when nothing was collected at all.
    pub async fn collect_from_popular_sources(
        &self,
        per_source: usize,
        options: CollectOptions,
    ) -> Result<Option<Vec<Post>>> {
        let owners = self.popular_sources().await?;
        log::info!(
            "Collecting {} post(s) from each of {} popular source(s)",
            per_source,
            owners.len()
        );

        let mut posts = Vec::new();
        for owner_id in &owners {
            match self.owner_posts(owner_id, per_source, 0, options).await? {
                Some(owner_posts) => posts.extend(owner_posts),
                None => log::warn!("Skipping source {}: no result", owner_id),
            }
        }

        if posts.is_empty() {
            return Ok(None);
        }
        self.finish(Some(posts), options).await
    }

    /// Collect up to `count` posts matching `query`.
    ///
    /// The platform never returns more than 1000 results for a query, so a
    /// larger `count` is rejected.
    pub async fn collect_by_topic(
        &self,
        query: &str,
        count: usize,
        options: CollectOptions,
    ) -> Result<Option<Vec<Post>>> {
        check_topic_count(count)?;
        log::info!("Searching {} post(s) about '{}'", count, query);

        let plan = PagePlan::new(count, DrainRule::NoNextCursor, options.skip_blank);
        let posts = paginate(
            plan,
            move |cursor: Cursor| async move {
                let raw = self
                    .client
                    .newsfeed_search(query, MAX_NEWSFEED_POSTS_PER_REQUEST, cursor.token())
                    .await?;
                let page = parse_search_page(&raw)?;
                Ok::<_, AppError>(Page::with_next(page.posts, page.next_from))
            },
            move |post| self.attach_comments(post, options),
        )
        .await?;
        self.finish(posts, options).await
    }

    /// Collect up to `count` posts matching `query` published within `[start, end]`.
    pub async fn collect_by_topic_in_range(
        &self,
        query: &str,
        count: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        options: CollectOptions,
    ) -> Result<Option<Vec<Post>>> {
        check_topic_count(count)?;
        if start > end {
            return Err(AppError::invalid_argument(format!(
                "time range start {start} is after end {end}"
            )));
        }
        log::info!(
            "Searching {} post(s) about '{}' between {} and {}",
            count,
            query,
            start,
            end
        );

        let plan = PagePlan::new(count, DrainRule::NoNextCursor, options.skip_blank);
        let posts = paginate(
            plan,
            move |cursor: Cursor| async move {
                let raw = self
                    .client
                    .newsfeed_search_in_range(
                        query,
                        MAX_RANGED_NEWSFEED_POSTS_PER_REQUEST,
                        start,
                        end,
                        cursor.token(),
                    )
                    .await?;
                let page = parse_search_page(&raw)?;
                Ok::<_, AppError>(Page::with_next(page.posts, page.next_from))
            },
            move |post| self.attach_comments(post, options),
        )
        .await?;
        self.finish(posts, options).await
    }

    /// Wall posts with their comments, without enrichment.
    async fn owner_posts(
        &self,
        owner_id: &str,
        count: usize,
        offset: u32,
        options: CollectOptions,
    ) -> Result<Option<Vec<Post>>> {
        let plan = PagePlan::new(
            count,
            DrainRule::ShortPage {
                page_size: MAX_POSTS_PER_REQUEST,
            },
            options.skip_blank,
        )
        .starting_at(offset);

        paginate(
            plan,
            move |cursor: Cursor| async move {
                let raw = self
                    .client
                    .wall_get(owner_id, cursor.offset(), MAX_POSTS_PER_REQUEST)
                    .await?;
                Ok::<_, AppError>(Page::new(parse_wall_page(&raw)?))
            },
            move |post| self.attach_comments(post, options),
        )
        .await
    }

    /// Fetch the comments of one post flagged as having comments.
    ///
    /// An API error leaves the post's comments `NotRequested`.
    async fn attach_comments(&self, mut post: Post, options: CollectOptions) -> Result<Post> {
        if !post.comments.is_pending() || options.comments_per_post == Some(0) {
            return Ok(post);
        }

        let plan = PagePlan::new(
            options.comments_per_post.unwrap_or(usize::MAX),
            DrainRule::ShortPage {
                page_size: MAX_COMMENTS_PER_REQUEST,
            },
            options.skip_blank,
        );
        let owner_id = post.author.id.as_str();
        let post_id = post.id.as_str();

        let comments = paginate(
            plan,
            move |cursor: Cursor| async move {
                let raw = self
                    .client
                    .wall_get_comments(owner_id, post_id, cursor.offset(), MAX_COMMENTS_PER_REQUEST)
                    .await?;
                Ok::<_, AppError>(Page::new(parse_comments_page(&raw)?))
            },
            keep,
        )
        .await?;

        post.comments = match comments {
            Some(list) => Comments::Fetched(list),
            None => {
                log::warn!("Comments of post {}_{} unavailable", post.author.id, post.id);
                Comments::NotRequested
            }
        };
        Ok(post)
    }

    /// Run the enrichment pass when requested.
    async fn finish(
        &self,
        posts: Option<Vec<Post>>,
        options: CollectOptions,
    ) -> Result<Option<Vec<Post>>> {
        let Some(mut posts) = posts else {
            return Ok(None);
        };
        if options.with_authors {
            AuthorEnricher::new(&self.client).enrich(&mut posts).await?;
        }
        log::info!("Collected {} post(s)", posts.len());
        Ok(Some(posts))
    }

    /// Owner ids of popular communities, one per line.
    async fn popular_sources(&self) -> Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.popular_sources_file)
            .await
            .map_err(|e| {
                AppError::config(format!(
                    "Cannot read popular sources from {}: {}",
                    self.popular_sources_file.display(),
                    e
                ))
            })?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

fn check_topic_count(count: usize) -> Result<()> {
    if count > SEARCH_RESULT_CAP {
        return Err(AppError::invalid_argument(format!(
            "topic search returns at most {SEARCH_RESULT_CAP} posts, got {count}"
        )));
    }
    Ok(())
}
