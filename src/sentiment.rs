//! Lexicon-based polarity scoring for article text.
//!
//! The score is `(positive - negative) / (positive + negative)` over the
//! lowercase word tokens of the text, so it always lies in `[-1, 1]`. Text
//! with no tokens has no score; text with tokens but no lexicon hits scores
//! `0.0`.

use crate::models::{ArticleRecord, NO_CONTENT, NO_DESCRIPTION};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

/// Scores within this distance of zero are labelled neutral.
const NEUTRAL_BAND: f64 = 0.05;

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("static word regex is valid")
});

static POSITIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // performance
        "gain", "gains", "growth", "grow", "grows", "grew", "rise", "rises", "rising", "rose",
        "rally", "rallies", "surge", "surges", "soar", "soars", "jump", "jumps", "record",
        "beat", "beats", "strong", "stronger", "robust", "profit", "profits", "profitable",
        "upgrade", "upgraded", "boost", "boosts", "recover", "recovery", "rebound",
        // tone
        "good", "great", "best", "better", "win", "wins", "won", "success", "successful",
        "positive", "optimistic", "confident", "improve", "improved", "improves",
        "breakthrough", "approve", "approved", "celebrate", "hope", "praise", "praised",
        "safe", "benefit", "benefits", "innovative", "excellent", "happy", "love",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // performance
        "loss", "losses", "lose", "loses", "lost", "fall", "falls", "fell", "drop", "drops",
        "dropped", "decline", "declines", "plunge", "plunges", "slump", "slumps", "crash",
        "weak", "weaker", "miss", "misses", "missed", "downgrade", "downgraded", "debt",
        "bankrupt", "bankruptcy", "layoff", "layoffs", "recession", "inflation",
        // tone
        "bad", "worse", "worst", "fail", "fails", "failed", "failure", "negative",
        "pessimistic", "concern", "concerns", "fear", "fears", "risk", "risks", "crisis",
        "war", "attack", "killed", "dead", "death", "scandal", "fraud", "lawsuit", "sued",
        "ban", "banned", "warning", "threat", "angry", "sad", "hate", "disaster",
    ]
    .into_iter()
    .collect()
});

/// Polarity score of `text`, or `None` when it contains no words.
pub fn score(text: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let mut tokens = 0usize;
    let mut pos = 0usize;
    let mut neg = 0usize;

    for m in WORD.find_iter(&lower) {
        tokens += 1;
        let w = m.as_str();
        if POSITIVE.contains(w) {
            pos += 1;
        } else if NEGATIVE.contains(w) {
            neg += 1;
        }
    }

    if tokens == 0 {
        return None;
    }
    if pos + neg == 0 {
        return Some(0.0);
    }
    Some((pos as f64 - neg as f64) / (pos + neg) as f64)
}

/// The text of an article that is worth scoring: title plus the real
/// description and content, placeholders excluded.
fn scoring_text(article: &ArticleRecord) -> String {
    let mut text = article.title.clone();
    for part in [&article.description, &article.content] {
        if part != NO_DESCRIPTION && part != NO_CONTENT {
            text.push(' ');
            text.push_str(part);
        }
    }
    text
}

/// Fill in `sentiment_score` for each article. Articles that cannot be
/// scored keep `None`.
#[instrument(level = "debug", skip_all, fields(count = articles.len()))]
pub fn annotate(articles: &mut [ArticleRecord]) {
    for article in articles.iter_mut() {
        article.sentiment_score = score(&scoring_text(article));
        if article.sentiment_score.is_none() {
            debug!(title = %article.title, "No scorable text; leaving unscored");
        }
    }
}

/// Display bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Bucket an optional score; an unavailable score reads as neutral.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s > NEUTRAL_BAND => Sentiment::Positive,
            Some(s) if s < -NEUTRAL_BAND => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        })
    }
}

/// `"Positive (0.50)"`, or `"n/a"` for an unscored article.
pub fn describe(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{} ({s:.2})", Sentiment::from_score(Some(s))),
        None => "n/a".to_string(),
    }
}
