//! `lingua`-based language screening for scraped reviews.
//!
//! Detection is restricted to the scripts that realistically show up on a
//! Bangladeshi bookstore (Bangla, Latin, Devanagari) to keep the detector
//! small and fast. Ambiguous text yields [`LanguageVerdict::Unknown`], which
//! callers treat as a match so borderline reviews are kept.
use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};
use once_cell::sync::Lazy;

static DETECTOR: Lazy<LanguageDetector> = Lazy::new(|| {
    LanguageDetectorBuilder::from_languages(&[
        Language::Bengali,
        Language::English,
        Language::Hindi,
    ])
    .with_minimum_relative_distance(0.01)
    .build()
});

/// Outcome of screening a review for the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageVerdict {
    /// The detector is confident the text is Bangla.
    Match,
    /// The detector is confident the text is some other language.
    NoMatch,
    /// The detector could not decide (too short, mixed, or no letters).
    Unknown,
}

/// Screens `text` for Bangla.
#[must_use]
pub fn detect_bangla(text: &str) -> LanguageVerdict {
    match DETECTOR.detect_language_of(text) {
        Some(Language::Bengali) => LanguageVerdict::Match,
        Some(_) => LanguageVerdict::NoMatch,
        None => LanguageVerdict::Unknown,
    }
}

/// Fail-open inclusion policy: only a confident non-Bangla verdict excludes
/// a review.
#[must_use]
pub fn is_bangla(text: &str) -> bool {
    detect_bangla(text) != LanguageVerdict::NoMatch
}
