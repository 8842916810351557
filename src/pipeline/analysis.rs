//! Sentiment aggregation over one pasted review or a whole book's reviews.
//!
//! Both modes share the percentage arithmetic and the verdict rule; they
//! differ only in where the per-category numbers come from (raw scores of a
//! single inference versus argmax counts over many).
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    classifier::{Sentiment, SentimentClassifier, SentimentScores},
    clients::{BookstoreClient, bookstore::FetchError},
    language,
    observability::metrics::Metrics,
    util::text::preview,
};

/// Characters of the input kept in the single-mode report.
const PREVIEW_CHARS: usize = 100;

/// Positive/Negative band (inclusive, in percent) inside which the verdict is
/// forced to Neutral. The band never considers Neutral's own percentage.
const BALANCED_BAND: std::ops::RangeInclusive<f64> = 45.0..=55.0;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("No Bangla reviews found for this book")]
    NoReviews,
    #[error("failed to classify review: {0}")]
    Classify(#[source] anyhow::Error),
}

/// Per-category percentage breakdown, rendered as strings with a trailing `%`.
#[derive(Debug, Serialize)]
pub struct SentimentBreakdown {
    positive_percentage: String,
    negative_percentage: String,
    neutral_percentage: String,
}

/// Raw argmax tallies for bulk mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentCounts {
    positive: usize,
    negative: usize,
    neutral: usize,
}

/// The structured result handed back to the caller; the only output of an
/// analysis. `raw_scores` is present in single mode, `raw_counts` in bulk
/// mode.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    total_reviews_analyzed: usize,
    sentiment_breakdown: SentimentBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_scores: Option<SentimentScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_counts: Option<SentimentCounts>,
    final_verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_text: Option<String>,
}

impl AnalysisReport {
    #[must_use]
    pub fn total_reviews_analyzed(&self) -> usize {
        self.total_reviews_analyzed
    }

    #[must_use]
    pub fn final_verdict(&self) -> &str {
        &self.final_verdict
    }
}

/// Percentages keyed by category, after rounding to one decimal.
#[derive(Debug, Clone, Copy)]
struct Percentages {
    negative: f64,
    neutral: f64,
    positive: f64,
}

impl Percentages {
    fn get(self, sentiment: Sentiment) -> f64 {
        match sentiment {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }
}

/// Drives the classifier over one review or a fetched-and-filtered batch and
/// aggregates the outcomes into an [`AnalysisReport`].
pub struct SentimentAnalyzer {
    classifier: Arc<dyn SentimentClassifier>,
    bookstore: BookstoreClient,
    max_reviews: usize,
    metrics: Arc<Metrics>,
}

impl SentimentAnalyzer {
    pub(crate) fn new(
        classifier: Arc<dyn SentimentClassifier>,
        bookstore: BookstoreClient,
        max_reviews: usize,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            classifier,
            bookstore,
            max_reviews,
            metrics,
        }
    }

    /// Single mode: classifies one user-supplied review. `text` must be
    /// non-empty; the router trims and checks before calling.
    ///
    /// # Errors
    /// [`AnalysisError::Classify`] when inference fails.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        let scores = self.classify(text).await?;

        let percentages = Percentages {
            negative: percent(f64::from(scores.negative), 1.0),
            neutral: percent(f64::from(scores.neutral), 1.0),
            positive: percent(f64::from(scores.positive), 1.0),
        };
        let verdict = decide_verdict(percentages);
        debug!(verdict = %verdict, "classified single review");

        Ok(AnalysisReport {
            total_reviews_analyzed: 1,
            sentiment_breakdown: breakdown(percentages),
            raw_scores: Some(scores),
            raw_counts: None,
            final_verdict: verdict_line(verdict, percentages),
            review_text: Some(preview(text, PREVIEW_CHARS)),
        })
    }

    /// Bulk mode: fetches the book's review listing, keeps the first
    /// `max_reviews` non-empty reviews that pass the language filter, then
    /// classifies each one and tallies the argmax categories.
    ///
    /// # Errors
    /// [`AnalysisError::Fetch`] passes fetch failures through unchanged;
    /// [`AnalysisError::NoReviews`] when nothing survives the filter;
    /// [`AnalysisError::Classify`] when an inference call fails mid-loop.
    pub async fn analyze_book(&self, book_id: &str) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        let records = self.bookstore.fetch_reviews(book_id).await?;
        self.metrics
            .fetch_duration
            .observe(started.elapsed().as_secs_f64());
        #[allow(clippy::cast_precision_loss)]
        self.metrics.reviews_fetched_total.inc_by(records.len() as f64);

        // Cap on accepted reviews, not raw items scanned.
        let mut accepted = Vec::new();
        for record in &records {
            if accepted.len() >= self.max_reviews {
                break;
            }
            let text = record.text();
            if text.is_empty() {
                continue;
            }
            if language::is_bangla(text) {
                accepted.push(text);
            }
        }

        if accepted.is_empty() {
            return Err(AnalysisError::NoReviews);
        }
        #[allow(clippy::cast_precision_loss)]
        self.metrics
            .reviews_accepted_total
            .inc_by(accepted.len() as f64);

        let total = accepted.len();
        let mut negative = 0usize;
        let mut neutral = 0usize;
        let mut positive = 0usize;
        for text in &accepted {
            let scores = self.classify(text).await?;
            match scores.dominant() {
                Sentiment::Negative => negative += 1,
                Sentiment::Neutral => neutral += 1,
                Sentiment::Positive => positive += 1,
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let whole = total as f64;
        #[allow(clippy::cast_precision_loss)]
        let percentages = Percentages {
            negative: percent(negative as f64, whole),
            neutral: percent(neutral as f64, whole),
            positive: percent(positive as f64, whole),
        };
        let verdict = decide_verdict(percentages);
        info!(
            %book_id,
            fetched = records.len(),
            accepted = total,
            verdict = %verdict,
            "aggregated book reviews"
        );

        Ok(AnalysisReport {
            total_reviews_analyzed: total,
            sentiment_breakdown: breakdown(percentages),
            raw_scores: None,
            raw_counts: Some(SentimentCounts {
                positive,
                negative,
                neutral,
            }),
            final_verdict: verdict_line(verdict, percentages),
            review_text: None,
        })
    }

    async fn classify(&self, text: &str) -> Result<SentimentScores, AnalysisError> {
        self.classifier.classify(text).await.map_err(|error| {
            self.metrics.classification_failures_total.inc();
            AnalysisError::Classify(error)
        })
    }
}

/// `round(100 * part/whole, 1)` with ties away from zero.
fn percent(part: f64, whole: f64) -> f64 {
    (part / whole * 1000.0).round() / 10.0
}

/// Verdict rule: a Positive/Negative balance inside [45,55] on both sides is
/// too close to call and forces Neutral; otherwise argmax over the three
/// percentages, first-encountered-max in enumeration order.
fn decide_verdict(percentages: Percentages) -> Sentiment {
    if BALANCED_BAND.contains(&percentages.positive)
        && BALANCED_BAND.contains(&percentages.negative)
    {
        return Sentiment::Neutral;
    }

    let mut best = Sentiment::Negative;
    for sentiment in Sentiment::ALL {
        if percentages.get(sentiment) > percentages.get(best) {
            best = sentiment;
        }
    }
    best
}

fn verdict_line(verdict: Sentiment, percentages: Percentages) -> String {
    format!(
        "Overall Sentiment: {verdict} ({:.1}%)",
        percentages.get(verdict)
    )
}

fn breakdown(percentages: Percentages) -> SentimentBreakdown {
    SentimentBreakdown {
        positive_percentage: format!("{:.1}%", percentages.positive),
        negative_percentage: format!("{:.1}%", percentages.negative),
        neutral_percentage: format!("{:.1}%", percentages.neutral),
    }
}
