//! History classification tests.

use outreach::drafting::{analyze_history, RapportLevel, Sentiment};
use outreach::store::{HistorySummary, ThreadHistory};

use crate::support::{from_doctor, from_practice, DOCTOR_ID};

#[test]
fn empty_history_has_no_reply() {
    let analysis = analyze_history(&ThreadHistory::empty(DOCTOR_ID));
    assert!(!analysis.has_reply);
    assert_eq!(analysis.sentiment, Sentiment::None);
    assert_eq!(analysis.rapport_level, RapportLevel::Low);
    assert_eq!(analysis.messages_sent, 0);
    assert_eq!(analysis.messages_received, 0);
}

#[test]
fn only_outbound_messages_have_no_reply() {
    let history = ThreadHistory::new(
        DOCTOR_ID,
        vec![from_doctor("a", "Applying for the session"), from_doctor("b", "Following up")],
    );
    let analysis = analyze_history(&history);
    assert!(!analysis.has_reply);
    assert_eq!(analysis.sentiment, Sentiment::None);
    assert_eq!(analysis.messages_sent, 2);
}

#[test]
fn thanks_reply_is_positive_high() {
    let history = ThreadHistory::new(
        DOCTOR_ID,
        vec![
            from_doctor("a", "Applying for the session"),
            from_practice("b", "Thanks, booking confirmed"),
        ],
    );
    let analysis = analyze_history(&history);
    assert!(analysis.has_reply);
    assert_eq!(analysis.sentiment, Sentiment::Positive);
    assert_eq!(analysis.rapport_level, RapportLevel::High);
    assert_eq!(analysis.messages_sent, 1);
    assert_eq!(analysis.messages_received, 1);
}

#[test]
fn decline_reply_is_negative_low() {
    let history = ThreadHistory::new(
        DOCTOR_ID,
        vec![
            from_doctor("a", "Applying for the session"),
            from_practice("b", "Sorry, we decline"),
        ],
    );
    let analysis = analyze_history(&history);
    assert_eq!(analysis.sentiment, Sentiment::Negative);
    assert_eq!(analysis.rapport_level, RapportLevel::Low);
}

#[test]
fn not_interested_matches_positive_keyword_first() {
    let history = ThreadHistory::new(
        DOCTOR_ID,
        vec![from_practice("a", "We are not interested")],
    );
    let analysis = analyze_history(&history);
    assert_eq!(analysis.sentiment, Sentiment::Positive);
    assert_eq!(analysis.rapport_level, RapportLevel::High);
}

#[test]
fn reply_without_keywords_is_neutral_medium() {
    let history = ThreadHistory::new(
        DOCTOR_ID,
        vec![from_practice("a", "Can you share your GMC details?")],
    );
    let analysis = analyze_history(&history);
    assert_eq!(analysis.sentiment, Sentiment::Neutral);
    assert_eq!(analysis.rapport_level, RapportLevel::Medium);
}

#[test]
fn latest_practice_message_decides() {
    let history = ThreadHistory::new(
        DOCTOR_ID,
        vec![
            from_practice("a", "Sorry, that date is unavailable"),
            from_doctor("b", "Would another date suit?"),
            from_practice("c", "Perfect, see you then"),
            from_doctor("d", "Great, confirmed"),
        ],
    );
    let analysis = analyze_history(&history);
    assert_eq!(analysis.sentiment, Sentiment::Positive);
    assert_eq!(analysis.messages_sent, 2);
    assert_eq!(analysis.messages_received, 2);
}

#[test]
fn inconsistent_summary_degrades_to_unknown() {
    let mut history = ThreadHistory::new(DOCTOR_ID, vec![from_practice("a", "Thanks")]);
    history.summary = HistorySummary {
        sent: 0,
        received: 1,
        total: 5,
    };
    let analysis = analyze_history(&history);
    assert_eq!(analysis.sentiment, Sentiment::Unknown);
    assert_eq!(analysis.rapport_level, RapportLevel::Low);
    assert!(analysis.has_reply);
}

#[test]
fn counted_reply_without_practice_message_is_unknown() {
    let mut history = ThreadHistory::new(DOCTOR_ID, vec![from_doctor("a", "Hello")]);
    history.summary = HistorySummary {
        sent: 0,
        received: 1,
        total: 1,
    };
    let analysis = analyze_history(&history);
    assert_eq!(analysis.sentiment, Sentiment::Unknown);
    assert!(analysis.has_reply);
}

#[test]
fn analysis_serializes_with_wire_names() {
    let analysis = analyze_history(&ThreadHistory::empty(DOCTOR_ID));
    let value = serde_json::to_value(analysis).expect("analysis should serialize");
    assert_eq!(value["has_reply"], false);
    assert_eq!(value["sentiment"], "none");
    assert_eq!(value["rapport_level"], "low");
    assert_eq!(value["messages_sent"], 0);
    assert_eq!(value["messages_received"], 0);
}
