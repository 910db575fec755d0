// src/pipeline/load.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Textual;
use crate::storage::DocumentStorage;
use crate::utils::shorten;

const PREVIEW_LEN: usize = 80;

/// Kind of documents stored in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Posts,
    Texts,
}

/// Load a saved session and log a preview of each document.
///
/// Returns the number of documents loaded.
pub async fn run_load(
    storage: &dyn DocumentStorage,
    kind: SessionKind,
    session: &Path,
) -> Result<usize> {
    let previews: Vec<String> = match kind {
        SessionKind::Posts => {
            let posts = storage.load_posts(session).await?;
            posts
                .iter()
                .map(|p| {
                    format!(
                        "[{}_{}] {} ({} comment(s))",
                        p.author.id,
                        p.id,
                        shorten(p.text(), PREVIEW_LEN, "..."),
                        p.comments.as_slice().len()
                    )
                })
                .collect()
        }
        SessionKind::Texts => storage
            .load_texts(session)
            .await?
            .iter()
            .map(|t| shorten(t.text(), PREVIEW_LEN, "..."))
            .collect(),
    };

    for (index, preview) in previews.iter().enumerate() {
        log::info!("  {}. {}", index + 1, preview);
    }
    Ok(previews.len())
}
