//! Sentiment categories, per-inference score distributions, and the
//! classifier seam the rest of the service is written against.
pub mod bert;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// The three sentiment categories, in model output order. Index 0/1/2 of the
/// model logits map to Negative/Neutral/Positive, and tie-breaks everywhere
/// follow this enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Probability distribution over the three sentiment categories, produced by
/// one inference call. The values come out of a softmax and sum to 1 within
/// floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentScores {
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

impl SentimentScores {
    #[must_use]
    pub fn get(&self, sentiment: Sentiment) -> f32 {
        match sentiment {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }

    /// Category with the highest score; ties keep the first category in
    /// enumeration order.
    #[must_use]
    pub fn dominant(&self) -> Sentiment {
        let mut best = Sentiment::Negative;
        for sentiment in Sentiment::ALL {
            if self.get(sentiment) > self.get(best) {
                best = sentiment;
            }
        }
        best
    }
}

/// Black-box sentiment classifier. Implementations must be safe to call
/// concurrently; callers are responsible for never passing empty text.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentScores>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_picks_highest_score() {
        let scores = SentimentScores {
            negative: 0.1,
            neutral: 0.2,
            positive: 0.7,
        };
        assert_eq!(scores.dominant(), Sentiment::Positive);
    }

    #[test]
    fn dominant_breaks_ties_in_enumeration_order() {
        let balanced = SentimentScores {
            negative: 0.5,
            neutral: 0.5,
            positive: 0.0,
        };
        assert_eq!(balanced.dominant(), Sentiment::Negative);

        let all_equal = SentimentScores {
            negative: 1.0 / 3.0,
            neutral: 1.0 / 3.0,
            positive: 1.0 / 3.0,
        };
        assert_eq!(all_equal.dominant(), Sentiment::Negative);
    }

    #[test]
    fn scores_serialize_with_capitalized_labels() {
        let scores = SentimentScores {
            negative: 0.25,
            neutral: 0.25,
            positive: 0.5,
        };
        let value = serde_json::to_value(scores).expect("serializes");
        assert_eq!(value["Negative"], 0.25);
        assert_eq!(value["Neutral"], 0.25);
        assert_eq!(value["Positive"], 0.5);
    }

    #[test]
    fn labels_match_display() {
        for sentiment in Sentiment::ALL {
            assert_eq!(sentiment.label(), sentiment.to_string());
        }
    }
}
