//! Sentiment and rapport classification of a thread's history.
//!
//! Classification looks only at the most recent message the practice sent
//! and matches it against two fixed keyword lists. Positive keywords are
//! tested first, so a body carrying both kinds classifies as positive. That
//! includes "not interested", which contains "interested".

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::ThreadHistory;

const POSITIVE_KEYWORDS: &[&str] = &[
    "thanks",
    "thank you",
    "accepted",
    "great",
    "excellent",
    "perfect",
    "yes",
    "interested",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "no",
    "not interested",
    "decline",
    "reject",
    "unavailable",
    "sorry",
];

/// Tone of the practice's most recent reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// The practice never replied.
    None,
    /// The latest reply carries a positive keyword.
    Positive,
    /// The latest reply carries a negative keyword and no positive one.
    Negative,
    /// The latest reply carries no keyword.
    Neutral,
    /// The history was inconsistent and could not be classified.
    Unknown,
}

/// How familiar the doctor and practice already are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RapportLevel {
    /// No or poor rapport.
    Low,
    /// Some rapport.
    Medium,
    /// Established rapport.
    High,
}

/// Result of analyzing a thread's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    /// Whether the practice has replied at least once.
    pub has_reply: bool,
    /// Tone of the latest reply.
    pub sentiment: Sentiment,
    /// Inferred rapport.
    pub rapport_level: RapportLevel,
    /// Messages the doctor has sent.
    pub messages_sent: u32,
    /// Messages the practice has sent.
    pub messages_received: u32,
}

/// Classify a thread's history. Never fails.
pub fn analyze_history(history: &ThreadHistory) -> SentimentAnalysis {
    let summary = history.summary;
    let base = SentimentAnalysis {
        has_reply: summary.received > 0,
        sentiment: Sentiment::None,
        rapport_level: RapportLevel::Low,
        messages_sent: summary.sent,
        messages_received: summary.received,
    };

    let listed = u32::try_from(history.messages.len()).unwrap_or(u32::MAX);
    if !summary.is_consistent() || summary.total != listed {
        warn!(
            sent = summary.sent,
            received = summary.received,
            total = summary.total,
            listed,
            "history summary inconsistent, sentiment unknown"
        );
        return SentimentAnalysis {
            sentiment: Sentiment::Unknown,
            ..base
        };
    }

    if !base.has_reply {
        return base;
    }

    let Some(latest) = history
        .messages
        .iter()
        .rev()
        .find(|message| !history.is_from_doctor(message))
    else {
        warn!(
            received = summary.received,
            "reply counted but no practice message present, sentiment unknown"
        );
        return SentimentAnalysis {
            sentiment: Sentiment::Unknown,
            ..base
        };
    };

    let (sentiment, rapport_level) = classify(&latest.body);
    debug!(
        message_id = %latest.id,
        sentiment = ?sentiment,
        rapport = ?rapport_level,
        "latest reply classified"
    );
    SentimentAnalysis {
        sentiment,
        rapport_level,
        ..base
    }
}

fn classify(body: &str) -> (Sentiment, RapportLevel) {
    let lowered = body.to_lowercase();
    if POSITIVE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        (Sentiment::Positive, RapportLevel::High)
    } else if NEGATIVE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        (Sentiment::Negative, RapportLevel::Low)
    } else {
        (Sentiment::Neutral, RapportLevel::Medium)
    }
}
