//! Sentiment attached to a text by an external classifier.

use serde::{Deserialize, Serialize};

/// Sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Stable integer code, also used in the training examples file.
    pub fn code(&self) -> u8 {
        match self {
            SentimentLabel::Negative => 0,
            SentimentLabel::Neutral => 1,
            SentimentLabel::Positive => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SentimentLabel::Negative),
            1 => Some(SentimentLabel::Neutral),
            2 => Some(SentimentLabel::Positive),
            _ => None,
        }
    }
}

/// Classifier output for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,

    /// Per-label probabilities indexed by label code, when the backend provides them
    #[serde(default)]
    pub chances: Option<Vec<f32>>,
}

impl Sentiment {
    pub fn new(label: SentimentLabel) -> Self {
        Self {
            label,
            chances: None,
        }
    }

    /// Probability of the chosen label.
    pub fn chance(&self) -> Option<f32> {
        self.chance_of(self.label)
    }

    pub fn chance_of(&self, label: SentimentLabel) -> Option<f32> {
        self.chances
            .as_ref()
            .and_then(|c| c.get(label.code() as usize).copied())
    }
}
