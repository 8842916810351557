pub mod analysis;

pub use analysis::{AnalysisError, AnalysisReport, SentimentAnalyzer};
