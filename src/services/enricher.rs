// src/services/enricher.rs

//! Author enrichment.
//!
//! Fetches sex and birth date for the authors of a finished batch in one
//! `users.get` call and merges them into the documents. An API error here
//! leaves the documents unenriched instead of failing the batch.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Author, Post, Sex};
use crate::services::api::{Transport, USER_FIELDS, VkApiClient};
use crate::services::parser::{UserInfo, parse_users};

/// Demographic data of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Demographics {
    pub sex: Option<Sex>,
    pub birth_date: Option<NaiveDate>,
}

impl From<&UserInfo> for Demographics {
    fn from(info: &UserInfo) -> Self {
        Self {
            sex: info.sex.and_then(Sex::from_code),
            birth_date: info.bdate.as_deref().and_then(parse_birth_date),
        }
    }
}

/// Parse a `d.M.yyyy` birth date. Day-and-month-only values are absent.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('.').collect();
    let [_, _, year] = parts.as_slice() else {
        return None;
    };
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%d.%m.%Y") {
        Ok(date) => Some(date),
        Err(e) => {
            log::debug!("Ignoring unparseable birth date '{}': {}", raw, e);
            None
        }
    }
}

/// Enriches post and comment authors.
pub struct AuthorEnricher<'a, T: Transport> {
    client: &'a VkApiClient<T>,
}

impl<'a, T: Transport> AuthorEnricher<'a, T> {
    pub fn new(client: &'a VkApiClient<T>) -> Self {
        Self { client }
    }

    /// Fetch demographics for `ids` in one batch.
    ///
    /// Returns an empty map when the platform answers with an error.
    pub async fn batch_fetch(&self, ids: &[&str]) -> Result<HashMap<String, Demographics>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw = self.client.users_get(ids, USER_FIELDS).await?;
        let users = match parse_users(&raw) {
            Ok(users) => users,
            Err(e) if e.is_api() => {
                log::warn!("Author enrichment skipped for {} id(s): {}", ids.len(), e);
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e),
        };

        Ok(users
            .iter()
            .map(|info| (info.id.to_string(), Demographics::from(info)))
            .collect())
    }

    /// Enrich every author of `posts` and of their fetched comments.
    ///
    /// Community authors (negative ids) are neither requested nor touched.
    pub async fn enrich(&self, posts: &mut [Post]) -> Result<usize> {
        let ids = collect_user_ids(posts);
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let data = self.batch_fetch(&id_refs).await?;
        if data.is_empty() {
            return Ok(0);
        }

        let mut enriched = 0;
        for author in posts.iter_mut().flat_map(|p| p.authors_mut()) {
            if apply(author, &data) {
                enriched += 1;
            }
        }
        log::info!("Enriched {} author reference(s)", enriched);
        Ok(enriched)
    }
}

/// Distinct user (positive) ids in encounter order.
fn collect_user_ids(posts: &[Post]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for author in posts.iter().flat_map(|p| p.authors()) {
        if author.is_user() && seen.insert(author.id.clone()) {
            ids.push(author.id.clone());
        }
    }
    ids
}

fn apply(author: &mut Author, data: &HashMap<String, Demographics>) -> bool {
    if !author.is_user() {
        return false;
    }
    match data.get(&author.id) {
        Some(demographics) => {
            author.sex = demographics.sex;
            author.birth_date = demographics.birth_date;
            true
        }
        None => false,
    }
}
