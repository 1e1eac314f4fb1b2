//! Thread history and summary tests.

use outreach::store::{HistorySummary, Message, ThreadHistory};

fn msg(id: &str, user_id: i64) -> Message {
    Message {
        id: id.to_owned(),
        body: format!("body {id}"),
        user_id,
        doctor_id: Some(10),
        is_read: false,
    }
}

#[test]
fn summary_counts_by_sender() {
    let messages = vec![msg("a", 10), msg("b", 20), msg("c", 10), msg("d", 30)];
    let summary = HistorySummary::from_messages(10, &messages);
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.received, 2);
    assert_eq!(summary.total, 4);
    assert!(summary.is_consistent());
}

#[test]
fn empty_history_has_zero_counts() {
    let history = ThreadHistory::empty(10);
    assert_eq!(history.summary, HistorySummary::default());
    assert!(history.messages.is_empty());
    assert!(history.summary.is_consistent());
}

#[test]
fn sender_attribution_uses_requesting_doctor() {
    let history = ThreadHistory::new(10, vec![msg("a", 10), msg("b", 99)]);
    assert!(history.is_from_doctor(&history.messages[0]));
    assert!(!history.is_from_doctor(&history.messages[1]));
}

#[test]
fn inconsistent_summary_is_detected() {
    let summary = HistorySummary {
        sent: 1,
        received: 1,
        total: 3,
    };
    assert!(!summary.is_consistent());
}

#[test]
fn summary_serializes_with_wire_names() {
    let summary = HistorySummary {
        sent: 3,
        received: 1,
        total: 4,
    };
    let value = serde_json::to_value(summary).expect("summary should serialize");
    assert_eq!(
        value,
        serde_json::json!({"messages_sent": 3, "messages_received": 1, "total_messages": 4})
    );
}
