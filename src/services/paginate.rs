// src/services/paginate.rs

//! Generic pagination engine.
//!
//! One pull loop drives every paginated endpoint: fetch a page at the
//! current cursor, advance the cursor, filter, count towards the target,
//! trim the page that crosses it, settle each retained item, repeat until
//! drained. An API error on any page discards the whole accumulation.

use std::future::Future;

use futures::future;

use crate::error::Result;
use crate::models::Textual;

/// Position of the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    Offset(u32),
    /// `None` requests the first page.
    Token(Option<String>),
}

/// When the source counts as exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainRule {
    /// Offset paging: a page shorter than `page_size` is the last one.
    ShortPage { page_size: u32 },
    /// Token paging: a page without a continuation token is the last one.
    NoNextCursor,
}

impl Cursor {
    /// Offset of an offset cursor, zero for token cursors.
    pub fn offset(&self) -> u32 {
        match self {
            Cursor::Offset(offset) => *offset,
            Cursor::Token(_) => 0,
        }
    }

    /// Token of a token cursor.
    pub fn token(&self) -> Option<&str> {
        match self {
            Cursor::Offset(_) => None,
            Cursor::Token(token) => token.as_deref(),
        }
    }
}

impl DrainRule {
    fn first_cursor(&self, offset: u32) -> Cursor {
        match self {
            DrainRule::ShortPage { .. } => Cursor::Offset(offset),
            DrainRule::NoNextCursor => Cursor::Token(None),
        }
    }
}

/// Raw items of one page, before filtering.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    pub fn with_next(items: Vec<T>, next: Option<String>) -> Self {
        Self { items, next }
    }
}

/// Parameters of one pagination run.
#[derive(Debug, Clone, Copy)]
pub struct PagePlan {
    /// Number of items to return, at most.
    pub target: usize,
    pub drain: DrainRule,
    /// Drop blank items before counting.
    pub skip_blank: bool,
    /// Initial offset for offset paging.
    pub start_offset: u32,
}

impl PagePlan {
    pub fn new(target: usize, drain: DrainRule, skip_blank: bool) -> Self {
        Self {
            target,
            drain,
            skip_blank,
            start_offset: 0,
        }
    }

    pub fn starting_at(mut self, offset: u32) -> Self {
        self.start_offset = offset;
        self
    }
}

/// Settle step that keeps items as they are.
pub fn keep<T>(item: T) -> future::Ready<Result<T>> {
    future::ok(item)
}

/// Run the pull loop.
///
/// `fetch_page` receives the cursor of the page to fetch. `settle` is run
/// on every retained item in page order before it joins the result. Returns
/// `Ok(None)` when a page answered with an API error; any other error
/// propagates.
pub async fn paginate<T, F, Fut, S, SFut>(
    plan: PagePlan,
    mut fetch_page: F,
    mut settle: S,
) -> Result<Option<Vec<T>>>
where
    T: Textual,
    F: FnMut(Cursor) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    S: FnMut(T) -> SFut,
    SFut: Future<Output = Result<T>>,
{
    let mut cursor = plan.drain.first_cursor(plan.start_offset);
    let mut collected = Vec::new();
    let mut total = 0usize;
    let mut pages = 0usize;
    let mut drained = false;

    while !drained {
        let page = match fetch_page(cursor.clone()).await {
            Ok(page) => page,
            Err(e) if e.is_api() => {
                log::warn!(
                    "Page {} failed with {}; discarding {} collected item(s)",
                    pages + 1,
                    e,
                    collected.len()
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        pages += 1;

        let fetched = page.items.len();
        drained = match (plan.drain, &mut cursor) {
            (DrainRule::ShortPage { page_size }, Cursor::Offset(offset)) => {
                match offset.checked_add(page_size) {
                    Some(next) => {
                        *offset = next;
                        fetched < page_size as usize
                    }
                    // No addressable page beyond the offset range
                    None => true,
                }
            }
            (_, cursor) => {
                *cursor = Cursor::Token(page.next.clone());
                page.next.is_none()
            }
        };

        let mut items = page.items;
        if plan.skip_blank {
            items.retain(|item| !item.is_blank());
        }

        total += items.len();
        if total >= plan.target {
            items.truncate(items.len() - (total - plan.target));
            drained = true;
        }

        log::debug!(
            "Page {}: {} fetched, {} kept, {} total",
            pages,
            fetched,
            items.len(),
            total.min(plan.target)
        );

        for item in items {
            collected.push(settle(item).await?);
        }
    }

    Ok(Some(collected))
}
