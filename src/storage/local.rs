//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {posts_dir}/{dd-MM-yyyy HH-mm-ss}/{1..N}
//! ├── {texts_dir}/{dd-MM-yyyy HH-mm-ss}/{1..N}
//! └── {examples_file}
//! ```
//!
//! Files are written one after another. A failure midway leaves the files
//! already written in place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Post, SentimentLabel, SentimentText, StorageConfig};
use crate::storage::{DocumentStorage, LineCodec};
use crate::utils::single_line;

const SESSION_FORMAT: &str = "%d-%m-%Y %H-%M-%S";
const SESSION_ATTEMPTS: usize = 3;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    posts_dir: String,
    texts_dir: String,
    examples_file: PathBuf,
}

impl LocalStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root_dir: config.root.clone(),
            posts_dir: config.posts_dir.clone(),
            texts_dir: config.texts_dir.clone(),
            examples_file: config.examples_file.clone(),
        }
    }

    /// Storage with the default layout under `root_dir`.
    pub fn rooted_at(root_dir: impl Into<PathBuf>) -> Self {
        Self::new(&StorageConfig {
            root: root_dir.into(),
            ..StorageConfig::default()
        })
    }

    pub fn posts_root(&self) -> PathBuf {
        self.root_dir.join(&self.posts_dir)
    }

    pub fn texts_root(&self) -> PathBuf {
        self.root_dir.join(&self.texts_dir)
    }

    /// Fresh session directory for a save happening now.
    ///
    /// Session names have one-second resolution; when the current name is
    /// taken the save waits for the next second instead of reusing it.
    async fn new_session(&self, kind_root: PathBuf) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&kind_root).await?;

        for _ in 0..SESSION_ATTEMPTS {
            let now = Local::now();
            let dir = kind_root.join(now.format(SESSION_FORMAT).to_string());
            match tokio::fs::create_dir(&dir).await {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("Session {} exists, waiting for the next second", dir.display());
                    let elapsed = u64::from(now.timestamp_subsec_millis().min(999));
                    tokio::time::sleep(Duration::from_millis(1_000 - elapsed)).await;
                }
                Err(e) => return Err(AppError::Io(e)),
            }
        }
        Err(AppError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free session name under {}", kind_root.display()),
        )))
    }

    async fn write_documents<D: LineCodec + Sync>(&self, dir: &Path, docs: &[D]) -> Result<()> {
        for (index, doc) in docs.iter().enumerate() {
            let mut content = doc.flatten().join("\n");
            content.push('\n');
            tokio::fs::write(dir.join((index + 1).to_string()), content).await?;
        }
        Ok(())
    }

    async fn read_documents<D: LineCodec + Send>(&self, dir: &Path) -> Result<Vec<D>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let number = name
                .to_str()
                .and_then(|n| n.parse::<u64>().ok())
                .ok_or_else(|| {
                    AppError::format(format!(
                        "unexpected file '{}' in {}",
                        name.to_string_lossy(),
                        dir.display()
                    ))
                })?;
            files.push((number, entry.path()));
        }
        files.sort_by_key(|(number, _)| *number);

        let mut docs = Vec::with_capacity(files.len());
        for (_, path) in files {
            let content = tokio::fs::read_to_string(&path).await?;
            let lines: Vec<&str> = content.lines().collect();
            let doc = D::deflatten(&lines)
                .map_err(|e| AppError::format(format!("{}: {}", path.display(), e)))?;
            docs.push(doc);
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentStorage for LocalStorage {
    async fn save_posts(&self, posts: &[Post]) -> Result<PathBuf> {
        let dir = self.new_session(self.posts_root()).await?;
        self.write_documents(&dir, posts).await?;
        log::info!("Saved {} post(s) to {}", posts.len(), dir.display());
        Ok(dir)
    }

    async fn save_texts(&self, texts: &[SentimentText]) -> Result<PathBuf> {
        let dir = self.new_session(self.texts_root()).await?;
        self.write_documents(&dir, texts).await?;
        log::info!("Saved {} text(s) to {}", texts.len(), dir.display());
        Ok(dir)
    }

    async fn load_posts(&self, session: &Path) -> Result<Vec<Post>> {
        let posts = self.read_documents(session).await?;
        log::info!("Loaded {} post(s) from {}", posts.len(), session.display());
        Ok(posts)
    }

    async fn load_texts(&self, session: &Path) -> Result<Vec<SentimentText>> {
        let texts = self.read_documents(session).await?;
        log::info!("Loaded {} text(s) from {}", texts.len(), session.display());
        Ok(texts)
    }

    async fn append_example(&self, text: &str, label: SentimentLabel) -> Result<()> {
        let path = self.root_dir.join(&self.examples_file);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let line = format!("{}|{}\n", single_line(text), label.code());
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Comment, Comments, Sex};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_posts() -> Vec<Post> {
        let author = Author {
            id: "5".to_string(),
            sex: Some(Sex::Male),
            birth_date: NaiveDate::from_ymd_opt(1999, 7, 1),
        };
        vec![
            Post::new("1", "first\npost", author).with_comments(Comments::Fetched(vec![
                Comment::new("reply", Author::new("6")),
            ])),
            Post::new("2", "", Author::new("-10")),
        ]
    }

    #[tokio::test]
    async fn test_save_and_load_posts() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());

        let dir = storage.save_posts(&sample_posts()).await.unwrap();
        assert!(dir.starts_with(tmp.path().join("Parsed Posts")));
        assert!(dir.join("1").is_file());
        assert!(dir.join("2").is_file());

        let loaded = storage.load_posts(&dir).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content.text, "first post");
        assert_eq!(loaded[0].author.sex, Some(Sex::Male));
        assert_eq!(loaded[0].comments.as_slice()[0].content.text, "reply");
        assert_eq!(loaded[1].author.id, "-10");
        assert_eq!(loaded[1].content.text, "");
    }

    #[tokio::test]
    async fn test_back_to_back_saves_get_separate_sessions() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());

        let first = storage
            .save_posts(&[
                Post::new("1", "first-a", Author::new("1")),
                Post::new("2", "first-b", Author::new("1")),
            ])
            .await
            .unwrap();
        let second = storage
            .save_posts(&[Post::new("3", "second", Author::new("1"))])
            .await
            .unwrap();

        assert_ne!(first, second);
        let texts = |posts: Vec<Post>| -> Vec<String> {
            posts.into_iter().map(|p| p.content.text).collect()
        };
        assert_eq!(
            texts(storage.load_posts(&first).await.unwrap()),
            vec!["first-a", "first-b"]
        );
        assert_eq!(texts(storage.load_posts(&second).await.unwrap()), vec!["second"]);
    }

    #[tokio::test]
    async fn test_post_file_contents() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());

        let dir = storage.save_posts(&sample_posts()).await.unwrap();
        let content = std::fs::read_to_string(dir.join("1")).unwrap();
        assert_eq!(content, "1\n5\nMale\n1.7.1999\nfirst post\n6\n\n\nreply\n");
    }

    #[tokio::test]
    async fn test_load_orders_by_number() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());
        let dir = tmp.path().join("session");
        std::fs::create_dir_all(&dir).unwrap();
        for (name, text) in [("10", "ten"), ("2", "two"), ("1", "one")] {
            std::fs::write(dir.join(name), format!("{text}\n")).unwrap();
        }

        let texts = storage.load_texts(&dir).await.unwrap();
        let texts: Vec<&str> = texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "ten"]);
    }

    #[tokio::test]
    async fn test_load_rejects_stray_files() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());
        std::fs::write(tmp.path().join("1"), "one\n").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x\n").unwrap();

        let err = storage.load_texts(tmp.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Format(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_post() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());
        std::fs::write(tmp.path().join("1"), "1\n2\n\n\ntext\nextra\n").unwrap();

        let err = storage.load_posts(tmp.path()).await.unwrap_err();
        assert!(matches!(err, AppError::Format(_)));
    }

    #[tokio::test]
    async fn test_texts_go_to_their_own_root() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());

        let dir = storage
            .save_texts(&[SentimentText::new("one\ntwo"), SentimentText::new("three")])
            .await
            .unwrap();
        assert!(dir.starts_with(tmp.path().join("Uploaded Texts")));

        let loaded = storage.load_texts(&dir).await.unwrap();
        assert_eq!(loaded[0].text, "one two");
        assert_eq!(loaded[1].text, "three");
    }

    #[tokio::test]
    async fn test_append_example() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::rooted_at(tmp.path());

        storage
            .append_example("so\ngood", SentimentLabel::Positive)
            .await
            .unwrap();
        storage
            .append_example("meh", SentimentLabel::Neutral)
            .await
            .unwrap();

        let content =
            std::fs::read_to_string(tmp.path().join("ML Examples").join("Examples.txt")).unwrap();
        assert_eq!(content, "so good|2\nmeh|1\n");
    }
}
