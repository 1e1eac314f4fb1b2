//! Deterministic message templates.
//!
//! Templates are plain data: a name and a body with `{placeholder}` slots.
//! Rendering resolves every slot from [`JobDetails`]; a slot naming an
//! unknown field is an error rather than being left in the output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::strategy::Strategy;

/// Input date format of [`JobDetails::date`].
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Rendered date format, e.g. `Wed 05, Nov`.
pub const DISPLAY_DATE_FORMAT: &str = "%a %d, %b";

/// Surname used when the doctor's display name is blank.
pub const FALLBACK_SURNAME: &str = "Doctor";

/// Placeholders whose values must survive refinement verbatim.
pub const FACT_PLACEHOLDERS: &[&str] = &[
    "session_id",
    "date_formatted",
    "start_time",
    "end_time",
    "pricing",
    "doctor_last_name",
];

/// A named template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Template name.
    pub name: &'static str,
    /// Body text with `{placeholder}` slots.
    pub body: &'static str,
}

impl MessageTemplate {
    /// Full structured application.
    pub const DEFAULT: Self = Self {
        name: "default",
        body: "{session_id}
{date_formatted}
{practice_name}, {practice_postcode}

Hi

Thank you for your request. If the terms are acceptable, please feel free to request Dr.

Start time: {start_time}
End time: {end_time}
Rate: £{pricing} per hr

Remote only

Dr. {doctor_last_name} is one of the most requested doctors on Lantum, having worked in over 300 practices. Please see Dr's profile for further details and the glowing testimonials.

Remote service is great for last-minute coverage or enhancing access. Dr can see many patients remotely, freeing up on-site partners.

Services include triage, advice, prescriptions, medication reviews, weaning controlled meds, admin sessions, MED3 reviews, mental health & dermatology appts, prescription queries, referrals, and extended access.

Please ignore our applications if terms don't suit you -with bulk bookings, is difficult to filter practices on Lantum.

For last-minute bookings, call/text 07515393107 or 07842557072, as we may miss Lantum notifications.

Thanks,

Juliana (Dr's PA)

On Behalf of:",
    };

    /// Condensed note for practices with established rapport.
    pub const RAPPORT: Self = Self {
        name: "rapport",
        body: "NOTE: This application is being submitted by Gibril, Dr. {doctor_last_name}'s assistant. Dr. {doctor_last_name} only provides remote GP services via secure NHS N3 connection. She is one of the most requested and recognized doctors on Lantum with extensive experience in remote consultations. Dr. {doctor_last_name} offers efficient patient triage and remote care to help manage your list. If this remote arrangement works for your practice needs, please go ahead and accept. However, if on-site presence is essential, we completely understand that I won't be suitable on this occasion. Please review her profile for more information about her excellent track record. For questions: 07515393107 - Gibril (Assistant to Dr. {doctor_last_name}).",
    };

    /// The template a strategy renders with.
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Default => Self::DEFAULT,
            Strategy::Rapport => Self::RAPPORT,
        }
    }

    /// Placeholder names in order of appearance, duplicates included.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        scan(self.body, |segment| {
            if let Segment::Slot(name) = segment {
                names.push(name);
            }
        });
        names
    }

    /// Fill every slot through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownPlaceholder`] for the first slot
    /// `lookup` does not know.
    pub fn fill<F>(&self, lookup: F) -> Result<String, TemplateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.body.len());
        let mut unknown: Option<&str> = None;
        scan(self.body, |segment| match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Slot(name) => match lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    unknown.get_or_insert(name);
                }
            },
        });
        match unknown {
            Some(name) => Err(TemplateError::UnknownPlaceholder {
                template: self.name,
                name: name.to_owned(),
            }),
            None => Ok(out),
        }
    }
}

enum Segment<'a> {
    Text(&'a str),
    Slot(&'a str),
}

/// Split a body into literal text and `{name}` slots. Braces that do not
/// enclose a lowercase identifier stay literal.
fn scan<'a>(body: &'a str, mut emit: impl FnMut(Segment<'a>)) {
    let mut rest = body;
    while let Some(open) = rest.find('{') {
        let (head, tail) = rest.split_at(open);
        emit(Segment::Text(head));
        let inner = tail.strip_prefix('{').unwrap_or(tail);
        match inner.split_once('}') {
            Some((name, after)) if is_slot_name(name) => {
                emit(Segment::Slot(name));
                rest = after;
            }
            _ => {
                emit(Segment::Text("{"));
                rest = inner;
            }
        }
    }
    emit(Segment::Text(rest));
}

fn is_slot_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Everything a template can mention about one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    /// Doctor applying.
    pub doctor_id: i64,
    /// Booking session identifier.
    pub session_id: String,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Practice name.
    pub practice_name: String,
    /// Practice postcode.
    pub practice_postcode: String,
    /// Session start time.
    pub start_time: String,
    /// Session end time.
    pub end_time: String,
    /// Hourly rate in pounds.
    pub pricing: Option<f64>,
    /// Doctor's surname.
    pub doctor_last_name: String,
    /// Free-text job description. Not rendered.
    pub job_description: String,
}

impl JobDetails {
    /// Value of a named slot, with the date already formatted.
    fn slot_value(&self, name: &str, date_formatted: &str) -> Option<String> {
        let value = match name {
            "session_id" => self.session_id.clone(),
            "date_formatted" => date_formatted.to_owned(),
            "practice_name" => self.practice_name.clone(),
            "practice_postcode" => self.practice_postcode.clone(),
            "start_time" => self.start_time.clone(),
            "end_time" => self.end_time.clone(),
            "pricing" => self.pricing.map(format_rate).unwrap_or_default(),
            "doctor_last_name" => self.doctor_last_name.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// Template rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The session date is not `YYYY-MM-DD`.
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },
    /// A template slot names no known field.
    #[error("template '{template}' has unknown placeholder '{{{name}}}'")]
    UnknownPlaceholder {
        /// Template name.
        template: &'static str,
        /// Slot name.
        name: String,
    },
}

/// Render the strategy's template for a job.
///
/// The date is validated even for templates that do not show it.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidDate`] for an unparseable date.
pub fn render(strategy: Strategy, job: &JobDetails) -> Result<String, TemplateError> {
    render_template(&MessageTemplate::for_strategy(strategy), job)
}

/// Render an arbitrary template for a job.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidDate`] for an unparseable date and
/// [`TemplateError::UnknownPlaceholder`] for a slot outside [`JobDetails`].
pub fn render_template(template: &MessageTemplate, job: &JobDetails) -> Result<String, TemplateError> {
    let date_formatted = format_session_date(&job.date)?;
    template.fill(|name| job.slot_value(name, &date_formatted))
}

/// Values of [`FACT_PLACEHOLDERS`] that the strategy's template embeds,
/// as rendered. Blank values are skipped.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidDate`] for an unparseable date.
pub fn embedded_facts(strategy: Strategy, job: &JobDetails) -> Result<Vec<String>, TemplateError> {
    let date_formatted = format_session_date(&job.date)?;
    let mut facts: Vec<String> = Vec::new();
    for name in MessageTemplate::for_strategy(strategy).placeholders() {
        if !FACT_PLACEHOLDERS.contains(&name) {
            continue;
        }
        if let Some(value) = job.slot_value(name, &date_formatted) {
            if !value.trim().is_empty() && !facts.contains(&value) {
                facts.push(value);
            }
        }
    }
    Ok(facts)
}

/// Format a `YYYY-MM-DD` date as `Wed 05, Nov`.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidDate`] when the input does not parse.
pub fn format_session_date(raw: &str) -> Result<String, TemplateError> {
    NaiveDate::parse_from_str(raw.trim(), INPUT_DATE_FORMAT)
        .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
        .map_err(|_| TemplateError::InvalidDate {
            value: raw.to_owned(),
        })
}

/// Last whitespace-separated token of a display name, or `Doctor`.
pub fn doctor_surname(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .last()
        .unwrap_or(FALLBACK_SURNAME)
        .to_owned()
}

/// Shortest exact decimal form of a rate: `190`, `190.5`, `87.125`.
pub fn format_rate(rate: f64) -> String {
    rate.to_string()
}
