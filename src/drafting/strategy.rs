//! Message strategy selection.

use serde::{Deserialize, Serialize};

use super::analyzer::{RapportLevel, Sentiment, SentimentAnalysis};

/// Which message template to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Full structured application.
    Default,
    /// Condensed note for practices that already responded warmly.
    Rapport,
}

impl Strategy {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Rapport => "rapport",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the strategy for an analysis: rapport only after a positive reply
/// with at least medium rapport.
pub fn select_strategy(analysis: &SentimentAnalysis) -> Strategy {
    match (analysis.sentiment, analysis.rapport_level) {
        (Sentiment::Positive, RapportLevel::High | RapportLevel::Medium) => Strategy::Rapport,
        _ => Strategy::Default,
    }
}
