//! In-memory adapter. One mutex over the whole dataset makes every port
//! method a single atomic unit, mirroring the transactional contract the
//! Postgres adapter gets from its transactions. Used by the test suite and
//! as a hermetic fixture.

use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatus, ApplicationStatusHistory, JobApplication};
use crate::models::evaluation::InterviewEvaluation;
use crate::models::interview::{Interview, InterviewParticipant, InterviewStatus};
use crate::models::offer::{JobOffer, OfferStatus};
use crate::models::user::User;
use crate::services::conflict_service::overlaps;
use crate::store::{
    ApplicationStore, BookedInterview, EvaluationStore, InterviewStore, OfferStore, UserStore,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    applications: HashMap<Uuid, JobApplication>,
    history: Vec<ApplicationStatusHistory>,
    interviews: HashMap<Uuid, Interview>,
    participants: Vec<InterviewParticipant>,
    evaluations: Vec<InterviewEvaluation>,
    offers: HashMap<Uuid, JobOffer>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store lock poisoned")
    }

    pub fn add_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    pub fn add_application(&self, application: JobApplication) {
        self.lock()
            .applications
            .insert(application.id, application);
    }
}

fn busy_participants(
    state: &State,
    participant_ids: &[Uuid],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_interview: Option<Uuid>,
    exclude_application: Option<Uuid>,
) -> Vec<Uuid> {
    let mut busy = Vec::new();
    for &user_id in participant_ids {
        let collides = state.interviews.values().any(|interview| {
            interview.status == InterviewStatus::Scheduled
                && Some(interview.id) != exclude_interview
                && Some(interview.application_id) != exclude_application
                && overlaps(interview.scheduled_at, interview.end_at(), start, end)
                && state
                    .participants
                    .iter()
                    .any(|p| p.interview_id == interview.id && p.user_id == user_id)
        });
        if collides && !busy.contains(&user_id) {
            busy.push(user_id);
        }
    }
    busy
}

#[async_trait::async_trait]
impl InterviewStore for MemoryStore {
    async fn insert_scheduled(
        &self,
        interview: &Interview,
        participants: &[InterviewParticipant],
    ) -> Result<Interview> {
        let mut state = self.lock();
        for (idx, participant) in participants.iter().enumerate() {
            if participants[..idx]
                .iter()
                .any(|p| p.user_id == participant.user_id)
            {
                return Err(Error::Uniqueness(format!(
                    "Participant {} listed twice for interview {}",
                    participant.user_id, interview.id
                )));
            }
        }
        let ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
        let busy = busy_participants(
            &state,
            &ids,
            interview.scheduled_at,
            interview.end_at(),
            None,
            None,
        );
        if !busy.is_empty() {
            return Err(Error::Conflict { busy });
        }
        state.interviews.insert(interview.id, interview.clone());
        state.participants.extend(participants.iter().cloned());
        Ok(interview.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Interview>> {
        Ok(self.lock().interviews.get(&id).cloned())
    }

    async fn participants(&self, interview_id: Uuid) -> Result<Vec<InterviewParticipant>> {
        Ok(self
            .lock()
            .participants
            .iter()
            .filter(|p| p.interview_id == interview_id)
            .cloned()
            .collect())
    }

    async fn booked_in_window(
        &self,
        participant_ids: &[Uuid],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        exclude_interview: Option<Uuid>,
        exclude_application: Option<Uuid>,
    ) -> Result<Vec<BookedInterview>> {
        let state = self.lock();
        let mut booked = Vec::new();
        for interview in state.interviews.values() {
            if interview.status != InterviewStatus::Scheduled
                || Some(interview.id) == exclude_interview
                || Some(interview.application_id) == exclude_application
                || !overlaps(
                    interview.scheduled_at,
                    interview.end_at(),
                    window_start,
                    window_end,
                )
            {
                continue;
            }
            let attending: Vec<Uuid> = participant_ids
                .iter()
                .copied()
                .filter(|user_id| {
                    state
                        .participants
                        .iter()
                        .any(|p| p.interview_id == interview.id && p.user_id == *user_id)
                })
                .collect();
            if !attending.is_empty() {
                booked.push(BookedInterview {
                    interview: interview.clone(),
                    participant_ids: attending,
                });
            }
        }
        booked.sort_by_key(|b| b.interview.scheduled_at);
        Ok(booked)
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        new_start: DateTime<Utc>,
        new_duration_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<Interview> {
        let mut state = self.lock();
        let Some(current) = state.interviews.get(&id).cloned() else {
            return Err(Error::NotFound(format!("Interview {} not found", id)));
        };
        if current.status != InterviewStatus::Scheduled {
            return Err(Error::ConcurrentUpdate);
        }
        let ids: Vec<Uuid> = state
            .participants
            .iter()
            .filter(|p| p.interview_id == id)
            .map(|p| p.user_id)
            .collect();
        let new_end = new_start + Duration::minutes(new_duration_minutes as i64);
        let busy = busy_participants(&state, &ids, new_start, new_end, Some(id), None);
        if !busy.is_empty() {
            return Err(Error::Conflict { busy });
        }
        let mut updated = current;
        updated.scheduled_at = new_start;
        updated.duration_minutes = new_duration_minutes;
        updated.reminder_sent_at = None;
        updated.updated_at = now;
        state.interviews.insert(id, updated.clone());
        Ok(updated)
    }

    async fn update_if_status(
        &self,
        expected: InterviewStatus,
        interview: &Interview,
    ) -> Result<Interview> {
        let mut state = self.lock();
        let Some(current) = state.interviews.get(&interview.id) else {
            return Err(Error::NotFound(format!(
                "Interview {} not found",
                interview.id
            )));
        };
        if current.status != expected {
            return Err(Error::ConcurrentUpdate);
        }
        state.interviews.insert(interview.id, interview.clone());
        Ok(interview.clone())
    }

    async fn scheduled_between_unreminded(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let state = self.lock();
        let mut due: Vec<Interview> = state
            .interviews
            .values()
            .filter(|i| {
                i.status == InterviewStatus::Scheduled
                    && i.reminder_sent_at.is_none()
                    && i.scheduled_at >= from
                    && i.scheduled_at < until
            })
            .cloned()
            .collect();
        due.sort_by_key(|i| i.scheduled_at);
        Ok(due)
    }

    async fn mark_reminded(&self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let mut state = self.lock();
        let Some(current) = state.interviews.get(&id).cloned() else {
            return Err(Error::NotFound(format!("Interview {} not found", id)));
        };
        let mut updated = current;
        updated.reminder_sent_at = Some(now);
        state.interviews.insert(id, updated);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, application: &JobApplication) -> Result<JobApplication> {
        let mut state = self.lock();
        if state.applications.values().any(|a| {
            a.candidate_id == application.candidate_id && a.job_id == application.job_id
        }) {
            return Err(Error::Uniqueness(format!(
                "Candidate {} already applied to job {}",
                application.candidate_id, application.job_id
            )));
        }
        state
            .applications
            .insert(application.id, application.clone());
        Ok(application.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>> {
        Ok(self.lock().applications.get(&id).cloned())
    }

    async fn transition_with_history(
        &self,
        expected: ApplicationStatus,
        application: &JobApplication,
        entry: &ApplicationStatusHistory,
    ) -> Result<(JobApplication, ApplicationStatusHistory)> {
        let mut state = self.lock();
        let Some(current) = state.applications.get(&application.id) else {
            return Err(Error::NotFound(format!(
                "Application {} not found",
                application.id
            )));
        };
        if current.status != expected {
            return Err(Error::ConcurrentUpdate);
        }
        state
            .applications
            .insert(application.id, application.clone());
        state.history.push(entry.clone());
        Ok((application.clone(), entry.clone()))
    }

    async fn history(&self, application_id: Uuid) -> Result<Vec<ApplicationStatusHistory>> {
        Ok(self
            .lock()
            .history
            .iter()
            .filter(|h| h.application_id == application_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl EvaluationStore for MemoryStore {
    async fn insert(&self, evaluation: &InterviewEvaluation) -> Result<InterviewEvaluation> {
        let mut state = self.lock();
        if state.evaluations.iter().any(|e| {
            e.interview_id == evaluation.interview_id && e.evaluator_id == evaluation.evaluator_id
        }) {
            return Err(Error::Uniqueness(format!(
                "Evaluator {} already submitted for interview {}",
                evaluation.evaluator_id, evaluation.interview_id
            )));
        }
        state.evaluations.push(evaluation.clone());
        Ok(evaluation.clone())
    }

    async fn update_content(
        &self,
        evaluation: &InterviewEvaluation,
    ) -> Result<InterviewEvaluation> {
        let mut state = self.lock();
        let Some(slot) = state
            .evaluations
            .iter_mut()
            .find(|e| e.id == evaluation.id)
        else {
            return Err(Error::NotFound(format!(
                "Evaluation {} not found",
                evaluation.id
            )));
        };
        *slot = evaluation.clone();
        Ok(evaluation.clone())
    }

    async fn for_interview(&self, interview_id: Uuid) -> Result<Vec<InterviewEvaluation>> {
        Ok(self
            .lock()
            .evaluations
            .iter()
            .filter(|e| e.interview_id == interview_id)
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        interview_id: Uuid,
        evaluator_id: Uuid,
    ) -> Result<Option<InterviewEvaluation>> {
        Ok(self
            .lock()
            .evaluations
            .iter()
            .find(|e| e.interview_id == interview_id && e.evaluator_id == evaluator_id)
            .cloned())
    }
}

#[async_trait::async_trait]
impl OfferStore for MemoryStore {
    async fn insert_if_no_active(&self, offer: &JobOffer) -> Result<JobOffer> {
        let mut state = self.lock();
        if state
            .offers
            .values()
            .any(|o| o.application_id == offer.application_id && o.status.is_active())
        {
            return Err(Error::Uniqueness(format!(
                "Application {} already has an active offer",
                offer.application_id
            )));
        }
        state.offers.insert(offer.id, offer.clone());
        Ok(offer.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobOffer>> {
        Ok(self.lock().offers.get(&id).cloned())
    }

    async fn active_for_application(&self, application_id: Uuid) -> Result<Option<JobOffer>> {
        Ok(self
            .lock()
            .offers
            .values()
            .find(|o| o.application_id == application_id && o.status.is_active())
            .cloned())
    }

    async fn update_if_status(&self, expected: OfferStatus, offer: &JobOffer) -> Result<JobOffer> {
        let mut state = self.lock();
        let Some(current) = state.offers.get(&offer.id) else {
            return Err(Error::NotFound(format!("Offer {} not found", offer.id)));
        };
        if current.status != expected {
            return Err(Error::ConcurrentUpdate);
        }
        state.offers.insert(offer.id, offer.clone());
        Ok(offer.clone())
    }

    async fn pending_expiring_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<JobOffer>> {
        let mut due: Vec<JobOffer> = self
            .lock()
            .offers
            .values()
            .filter(|o| o.status == OfferStatus::Pending && o.expires_at <= cutoff)
            .cloned()
            .collect();
        due.sort_by_key(|o| o.expires_at);
        Ok(due)
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (*id, u.name.clone())))
            .collect())
    }
}
