//! Template rendering tests.

use outreach::drafting::template::{
    doctor_surname, embedded_facts, format_session_date, render_template,
};
use outreach::drafting::{render, JobDetails, MessageTemplate, Strategy, TemplateError};

fn job() -> JobDetails {
    JobDetails {
        doctor_id: 1_015_682,
        session_id: "4014399224".to_owned(),
        date: "2025-11-05".to_owned(),
        practice_name: "GPS Healthcare - Meadowside Health Centre (Branch)".to_owned(),
        practice_postcode: "B92 8PJ".to_owned(),
        start_time: "09:30".to_owned(),
        end_time: "12:30".to_owned(),
        pricing: Some(190.0),
        doctor_last_name: "Smith".to_owned(),
        job_description: "Remote GP session".to_owned(),
    }
}

#[test]
fn default_template_header_and_terms() {
    let text = render(Strategy::Default, &job()).expect("should render");
    assert!(text.starts_with(
        "4014399224\nWed 05, Nov\nGPS Healthcare - Meadowside Health Centre (Branch), B92 8PJ\n\nHi\n"
    ));
    assert!(text.contains("Start time: 09:30\nEnd time: 12:30\nRate: £190 per hr"));
    assert!(text.contains("Dr. Smith is one of the most requested doctors on Lantum"));
    assert!(text.ends_with("Juliana (Dr's PA)\n\nOn Behalf of:"));
    assert!(!text.contains('{'));
}

#[test]
fn rapport_template_names_doctor() {
    let text = render(Strategy::Rapport, &job()).expect("should render");
    assert!(text.starts_with(
        "NOTE: This application is being submitted by Gibril, Dr. Smith's assistant."
    ));
    assert!(text.ends_with("For questions: 07515393107 - Gibril (Assistant to Dr. Smith)."));
    assert_eq!(text.matches("Dr. Smith").count(), 4);
    assert!(!text.contains("4014399224"));
}

#[test]
fn rendering_is_deterministic() {
    let first = render(Strategy::Default, &job()).expect("should render");
    let second = render(Strategy::Default, &job()).expect("should render");
    assert_eq!(first, second);
}

#[test]
fn date_formats_as_weekday_day_month() {
    assert_eq!(format_session_date("2025-11-05").ok().as_deref(), Some("Wed 05, Nov"));
    assert_eq!(format_session_date("2024-02-29").ok().as_deref(), Some("Thu 29, Feb"));
}

#[test]
fn invalid_date_fails_for_both_templates() {
    let mut bad = job();
    bad.date = "05/11/2025".to_owned();
    for strategy in [Strategy::Default, Strategy::Rapport] {
        match render(strategy, &bad) {
            Err(TemplateError::InvalidDate { value }) => assert_eq!(value, "05/11/2025"),
            other => panic!("expected invalid date for {strategy}, got {other:?}"),
        }
    }
}

#[test]
fn surname_is_last_token_or_doctor() {
    assert_eq!(doctor_surname("Jane Smith"), "Smith");
    assert_eq!(doctor_surname("  Mary  Anne   O'Neil "), "O'Neil");
    assert_eq!(doctor_surname("Prince"), "Prince");
    assert_eq!(doctor_surname(""), "Doctor");
    assert_eq!(doctor_surname("   "), "Doctor");
}

#[test]
fn fractional_rate_renders_as_given() {
    let mut details = job();
    details.pricing = Some(187.5);
    let text = render(Strategy::Default, &details).expect("should render");
    assert!(text.contains("Rate: £187.5 per hr"));
}

#[test]
fn three_decimal_rate_is_not_rounded() {
    let mut details = job();
    details.pricing = Some(87.125);
    let text = render(Strategy::Default, &details).expect("should render");
    assert!(text.contains("Rate: £87.125 per hr"));

    let facts = embedded_facts(Strategy::Default, &details).expect("valid date");
    assert!(facts.iter().any(|fact| fact == "87.125"));
}

#[test]
fn missing_fields_render_empty() {
    let details = JobDetails {
        date: "2025-11-05".to_owned(),
        ..JobDetails::default()
    };
    let text = render(Strategy::Default, &details).expect("should render");
    assert!(text.starts_with("\nWed 05, Nov\n, \n"));
    assert!(text.contains("Rate: £ per hr"));
}

#[test]
fn unknown_placeholder_is_reported() {
    let template = MessageTemplate {
        name: "custom",
        body: "Dear {practice_name}, fee {fee}",
    };
    match render_template(&template, &job()) {
        Err(TemplateError::UnknownPlaceholder { template, name }) => {
            assert_eq!(template, "custom");
            assert_eq!(name, "fee");
        }
        other => panic!("expected unknown placeholder, got {other:?}"),
    }
}

#[test]
fn placeholders_listed_in_order() {
    assert_eq!(
        MessageTemplate::RAPPORT.placeholders(),
        vec!["doctor_last_name"; 4]
    );
    let default_slots = MessageTemplate::DEFAULT.placeholders();
    assert_eq!(default_slots.first().copied(), Some("session_id"));
    assert_eq!(default_slots.len(), 8);
}

#[test]
fn default_facts_cover_session_details() {
    let facts = embedded_facts(Strategy::Default, &job()).expect("valid date");
    assert_eq!(
        facts,
        vec!["4014399224", "Wed 05, Nov", "09:30", "12:30", "190", "Smith"]
    );
}
