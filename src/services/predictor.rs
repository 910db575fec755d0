// src/services/predictor.rs

//! Sentiment classifier seam.
//!
//! Classifier backends live outside this crate; they plug in through
//! [`SentimentPredictor`].

use crate::models::{Sentiment, Textual};

/// A sentiment classifier.
pub trait SentimentPredictor {
    /// Classify `texts`, returning one result per input in the same order.
    fn predict(&self, texts: &[&str]) -> Vec<Sentiment>;
}

/// Attach predictions to `docs` in order. Returns the number annotated.
///
/// A predictor returning fewer results than inputs leaves the tail untouched.
pub fn annotate<P, D>(predictor: &P, docs: &mut [D]) -> usize
where
    P: SentimentPredictor + ?Sized,
    D: Textual,
{
    let predictions = {
        let texts: Vec<&str> = docs.iter().map(Textual::text).collect();
        predictor.predict(&texts)
    };
    if predictions.len() != docs.len() {
        log::warn!(
            "Predictor returned {} result(s) for {} text(s)",
            predictions.len(),
            docs.len()
        );
    }

    let mut annotated = 0;
    for (doc, sentiment) in docs.iter_mut().zip(predictions) {
        doc.set_sentiment(sentiment);
        annotated += 1;
    }
    annotated
}
