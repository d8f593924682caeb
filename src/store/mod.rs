//! Persistence ports. The state machines and the scheduling engine call
//! into these; adapters own the transactional guarantees.
//!
//! Every mutating method is one atomic unit of work. Compare-and-set
//! methods take the status the caller read; a mismatch at write time is
//! reported as `Error::ConcurrentUpdate` so the service layer can retry
//! the read-validate-write cycle once.

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::application::{ApplicationStatus, ApplicationStatusHistory, JobApplication};
use crate::models::evaluation::InterviewEvaluation;
use crate::models::interview::{Interview, InterviewParticipant, InterviewStatus};
use crate::models::offer::{JobOffer, OfferStatus};
use crate::models::user::User;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// A Scheduled interview intersecting a conflict query, together with the
/// subset of the queried participants who attend it.
#[derive(Debug, Clone)]
pub struct BookedInterview {
    pub interview: Interview,
    pub participant_ids: Vec<Uuid>,
}

#[async_trait::async_trait]
pub trait InterviewStore: Send + Sync {
    /// Inserts an interview and its participants atomically. The adapter
    /// re-checks participant overlap inside the same unit of work, so two
    /// racing schedule calls for an overlapping window cannot both land.
    async fn insert_scheduled(
        &self,
        interview: &Interview,
        participants: &[InterviewParticipant],
    ) -> Result<Interview>;

    async fn get(&self, id: Uuid) -> Result<Option<Interview>>;

    async fn participants(&self, interview_id: Uuid) -> Result<Vec<InterviewParticipant>>;

    /// All Scheduled interviews touching `[window_start, window_end)` for any
    /// of the given participants. `exclude_interview` drops the interview
    /// being rescheduled; `exclude_application` drops a candidate's own
    /// multi-round bookings where the caller asks for that.
    async fn booked_in_window(
        &self,
        participant_ids: &[Uuid],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        exclude_interview: Option<Uuid>,
        exclude_application: Option<Uuid>,
    ) -> Result<Vec<BookedInterview>>;

    /// Moves a Scheduled interview to a new window, re-checking overlap for
    /// its own participants (excluding itself) inside the unit of work.
    /// A pending reminder mark is cleared since the time changed.
    async fn update_schedule(
        &self,
        id: Uuid,
        new_start: DateTime<Utc>,
        new_duration_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<Interview>;

    /// Compare-and-set replacement of an interview's mutable fields.
    /// `expected` is the status the caller read and validated against.
    async fn update_if_status(
        &self,
        expected: InterviewStatus,
        interview: &Interview,
    ) -> Result<Interview>;

    /// Scheduled interviews starting in `[from, until)` that have not been
    /// reminded yet.
    async fn scheduled_between_unreminded(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Interview>>;

    async fn mark_reminded(&self, id: Uuid, now: DateTime<Utc>) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ApplicationStore: Send + Sync {
    /// One application per (candidate, job); duplicates are a uniqueness
    /// violation.
    async fn insert(&self, application: &JobApplication) -> Result<JobApplication>;

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>>;

    /// Compare-and-set status update plus history append, both in one unit
    /// of work. `expected` is the status the service validated the edge
    /// from; `application` carries the post-transition row.
    async fn transition_with_history(
        &self,
        expected: ApplicationStatus,
        application: &JobApplication,
        entry: &ApplicationStatusHistory,
    ) -> Result<(JobApplication, ApplicationStatusHistory)>;

    /// Audit trail in transition order.
    async fn history(&self, application_id: Uuid) -> Result<Vec<ApplicationStatusHistory>>;
}

#[async_trait::async_trait]
pub trait EvaluationStore: Send + Sync {
    /// At most one evaluation per (interview, evaluator); duplicates are a
    /// uniqueness violation.
    async fn insert(&self, evaluation: &InterviewEvaluation) -> Result<InterviewEvaluation>;

    async fn update_content(&self, evaluation: &InterviewEvaluation) -> Result<InterviewEvaluation>;

    async fn for_interview(&self, interview_id: Uuid) -> Result<Vec<InterviewEvaluation>>;

    async fn find(
        &self,
        interview_id: Uuid,
        evaluator_id: Uuid,
    ) -> Result<Option<InterviewEvaluation>>;
}

#[async_trait::async_trait]
pub trait OfferStore: Send + Sync {
    /// Inserts an offer after verifying, in the same unit of work, that the
    /// application has no Pending or Accepted offer already.
    async fn insert_if_no_active(&self, offer: &JobOffer) -> Result<JobOffer>;

    async fn get(&self, id: Uuid) -> Result<Option<JobOffer>>;

    async fn active_for_application(&self, application_id: Uuid) -> Result<Option<JobOffer>>;

    /// Compare-and-set replacement of an offer's mutable fields.
    async fn update_if_status(&self, expected: OfferStatus, offer: &JobOffer) -> Result<JobOffer>;

    /// Pending offers whose expiry has passed as of `cutoff`.
    async fn pending_expiring_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<JobOffer>>;
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>>;
}
