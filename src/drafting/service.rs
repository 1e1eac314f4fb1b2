//! Per-request drafting coordinator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::{load_thread_history, RecordStore, ThreadHistory};

use super::analyzer::{analyze_history, SentimentAnalysis};
use super::refine::{RefinementInput, RefinementOrchestrator};
use super::strategy::{select_strategy, Strategy};
use super::template::{doctor_surname, embedded_facts, format_session_date, render, JobDetails};
use super::{parse_id, DraftError};

/// A request to draft one outreach message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRequest {
    /// Doctor the message is sent on behalf of.
    pub doctor_id: i64,
    /// Practice the message is sent to.
    pub practice_id: i64,
    /// Booking session identifier.
    pub session_id: i64,
    /// Free-text job description.
    #[serde(default)]
    pub job_description: String,
    /// Hourly rate in pounds.
    pub pricing: f64,
    /// Session start time.
    pub start_time: String,
    /// Session end time.
    pub end_time: String,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Practice name; the stored name is used when blank.
    #[serde(default)]
    pub practice_name: String,
    /// Practice postcode.
    #[serde(default)]
    pub practice_postcode: String,
}

/// Unparsed request fields as they arrive from the command line.
///
/// Converting into a [`DraftRequest`] checks that every required field is
/// present and that identifiers and pricing are numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    /// Doctor id.
    pub doctor_id: Option<String>,
    /// Practice id.
    pub practice_id: Option<String>,
    /// Booking session id.
    pub session_id: Option<String>,
    /// Session date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Session start time.
    pub start_time: Option<String>,
    /// Session end time.
    pub end_time: Option<String>,
    /// Hourly rate in pounds.
    pub pricing: Option<String>,
    /// Practice name, possibly blank.
    pub practice_name: String,
    /// Practice postcode, possibly blank.
    pub practice_postcode: String,
    /// Free-text job description.
    pub job_description: String,
}

impl TryFrom<DraftFields> for DraftRequest {
    type Error = DraftError;

    fn try_from(fields: DraftFields) -> Result<Self, Self::Error> {
        let pricing_raw = required("pricing", fields.pricing)?;
        let pricing = pricing_raw.trim().parse::<f64>().map_err(|_| {
            DraftError::Validation(format!("pricing must be a number, got '{pricing_raw}'"))
        })?;

        Ok(Self {
            doctor_id: parse_id("doctor_id", &required("doctor_id", fields.doctor_id)?)?,
            practice_id: parse_id("practice_id", &required("practice_id", fields.practice_id)?)?,
            session_id: parse_id("session_id", &required("session_id", fields.session_id)?)?,
            job_description: fields.job_description,
            pricing,
            start_time: required("start_time", fields.start_time)?,
            end_time: required("end_time", fields.end_time)?,
            date: required("date", fields.date)?,
            practice_name: fields.practice_name,
            practice_postcode: fields.practice_postcode,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, DraftError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DraftError::Validation(format!("missing {field}")))
}

/// A drafted message and how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftResult {
    /// Final message text.
    pub draft_message: String,
    /// Template strategy used.
    pub strategy_used: Strategy,
    /// History classification behind the strategy.
    pub analysis: SentimentAnalysis,
    /// Echo of the request's session id.
    pub session_id: i64,
    /// Provider whose refinement was used; absent for the rendered template.
    pub refined_by: Option<String>,
}

/// Drafts messages from stored history and a refinement chain.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct DraftService {
    store: Arc<dyn RecordStore>,
    refiner: RefinementOrchestrator,
}

impl std::fmt::Debug for DraftService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftService")
            .field("refiner", &self.refiner)
            .finish_non_exhaustive()
    }
}

impl DraftService {
    /// Create a service over a record store and refinement chain.
    pub fn new(store: Arc<dyn RecordStore>, refiner: RefinementOrchestrator) -> Self {
        Self { store, refiner }
    }

    /// Draft a message for a request.
    ///
    /// A practice with no thread is treated as a first-time application and
    /// refinement failures fall back to the rendered template.
    ///
    /// # Errors
    ///
    /// - [`DraftError::Validation`] for an unparseable date.
    /// - [`DraftError::NotFound`] when the doctor or practice does not exist.
    /// - [`DraftError::Store`] for any other store failure.
    pub async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, DraftError> {
        format_session_date(&request.date)?;

        let history = self
            .history_or_first_time(request.practice_id, request.doctor_id)
            .await?;

        let display_name = self.store.find_user_display_name(request.doctor_id).await?;
        let stored_practice_name = self.store.find_practice_name(request.practice_id).await?;
        let practice_name = if request.practice_name.trim().is_empty() {
            stored_practice_name
        } else {
            request.practice_name.clone()
        };

        let job = JobDetails {
            doctor_id: request.doctor_id,
            session_id: request.session_id.to_string(),
            date: request.date.clone(),
            practice_name,
            practice_postcode: request.practice_postcode.clone(),
            start_time: request.start_time.clone(),
            end_time: request.end_time.clone(),
            pricing: Some(request.pricing),
            doctor_last_name: doctor_surname(&display_name),
            job_description: request.job_description.clone(),
        };

        let analysis = analyze_history(&history);
        let strategy = select_strategy(&analysis);
        let rendered = render(strategy, &job)?;
        let facts = embedded_facts(strategy, &job)?;
        debug!(
            session_id = request.session_id,
            strategy = %strategy,
            sentiment = ?analysis.sentiment,
            facts = facts.len(),
            "draft rendered"
        );

        let outcome = self
            .refiner
            .refine(&RefinementInput {
                draft: &rendered,
                strategy,
                analysis: &analysis,
                history: &history,
                facts: &facts,
            })
            .await;

        info!(
            session_id = request.session_id,
            doctor_id = request.doctor_id,
            practice_id = request.practice_id,
            strategy = %strategy,
            refined_by = outcome.refined_by.as_deref().unwrap_or("none"),
            "draft ready"
        );

        Ok(DraftResult {
            draft_message: outcome.text,
            strategy_used: strategy,
            analysis,
            session_id: request.session_id,
            refined_by: outcome.refined_by,
        })
    }

    async fn history_or_first_time(
        &self,
        practice_id: i64,
        doctor_id: i64,
    ) -> Result<ThreadHistory, DraftError> {
        match load_thread_history(self.store.as_ref(), practice_id, doctor_id).await {
            Ok(history) => Ok(history),
            Err(err) if err.is_not_found() => {
                debug!(practice_id, doctor_id, "no thread, first-time application");
                Ok(ThreadHistory::empty(doctor_id))
            }
            Err(err) => Err(err.into()),
        }
    }
}
