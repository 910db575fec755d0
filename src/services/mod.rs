//! Service layer for the collector.
//!
//! This module contains the business logic for:
//! - Upstream API access (`VkApiClient`)
//! - Page-by-page collection (`paginate`)
//! - Raw payload parsing (`parser`)
//! - Author demographics (`AuthorEnricher`)
//! - Collection entry points (`Collector`)
//! - The sentiment classifier seam (`SentimentPredictor`)

pub mod api;
mod collector;
mod enricher;
pub mod paginate;
pub mod parser;
mod predictor;

pub use api::{Transport, VkApiClient};
pub use collector::{CollectOptions, Collector};
pub use enricher::{AuthorEnricher, Demographics, parse_birth_date};
pub use paginate::{Cursor, DrainRule, Page, PagePlan, paginate};
pub use predictor::{SentimentPredictor, annotate};
