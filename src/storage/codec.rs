//! Line-oriented document codec.
//!
//! A plain text is one line. A post is five lines (id, author id, sex,
//! birth date, text) followed by four lines per comment (author id, sex,
//! birth date, text). Absent sex or birth date is an empty line.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{Author, Comment, Comments, Post, SentimentText, Sex};
use crate::utils::single_line;

const POST_HEADER_LINES: usize = 5;
const COMMENT_LINES: usize = 4;
const DATE_WRITE_FORMAT: &str = "%-d.%-m.%Y";
const DATE_READ_FORMAT: &str = "%d.%m.%Y";

/// Conversion between a document and its persisted lines.
pub trait LineCodec: Sized {
    fn flatten(&self) -> Vec<String>;

    fn deflatten(lines: &[&str]) -> Result<Self>;
}

impl LineCodec for SentimentText {
    fn flatten(&self) -> Vec<String> {
        vec![single_line(&self.text)]
    }

    fn deflatten(lines: &[&str]) -> Result<Self> {
        match lines {
            [text] => Ok(SentimentText::new(*text)),
            _ => Err(AppError::format(format!(
                "plain text needs exactly 1 line, got {}",
                lines.len()
            ))),
        }
    }
}

impl LineCodec for Post {
    fn flatten(&self) -> Vec<String> {
        let comments = self.comments.as_slice();
        let mut lines = Vec::with_capacity(POST_HEADER_LINES + COMMENT_LINES * comments.len());
        lines.push(self.id.clone());
        push_author(&mut lines, &self.author);
        lines.push(single_line(&self.content.text));

        for comment in comments {
            push_author(&mut lines, &comment.author);
            lines.push(single_line(&comment.content.text));
        }
        lines
    }

    fn deflatten(lines: &[&str]) -> Result<Self> {
        if lines.len() < POST_HEADER_LINES || (lines.len() - POST_HEADER_LINES) % COMMENT_LINES != 0
        {
            return Err(AppError::format(format!(
                "post needs 5 + 4k lines, got {}",
                lines.len()
            )));
        }

        let (header, rest) = lines.split_at(POST_HEADER_LINES);
        let author = read_author(&header[1..4])?;
        let post = Post::new(header[0], header[4], author);
        if rest.is_empty() {
            return Ok(post);
        }

        let comments = rest
            .chunks(COMMENT_LINES)
            .map(|chunk| -> Result<Comment> {
                Ok(Comment::new(chunk[3], read_author(&chunk[..3])?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(post.with_comments(Comments::Fetched(comments)))
    }
}

fn push_author(lines: &mut Vec<String>, author: &Author) {
    lines.push(author.id.clone());
    lines.push(author.sex.map(|s| s.to_string()).unwrap_or_default());
    lines.push(
        author
            .birth_date
            .map(|d| d.format(DATE_WRITE_FORMAT).to_string())
            .unwrap_or_default(),
    );
}

/// Author from its id, sex and birth date lines.
fn read_author(lines: &[&str]) -> Result<Author> {
    let sex = match lines[1] {
        "" => None,
        raw => Some(raw.parse::<Sex>()?),
    };
    let birth_date = match lines[2] {
        "" => None,
        raw => Some(
            NaiveDate::parse_from_str(raw, DATE_READ_FORMAT)
                .map_err(|e| AppError::format(format!("bad birth date '{raw}': {e}")))?,
        ),
    };
    Ok(Author {
        id: lines[0].to_string(),
        sex,
        birth_date,
    })
}
