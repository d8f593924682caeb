use crate::config::SchedulingConfig;
use crate::dto::scheduling_dto::{RescheduleInterviewRequest, ScheduleInterviewRequest};
use crate::error::{Error, Result};
use crate::models::interview::{
    Interview, InterviewOutcome, InterviewParticipant, InterviewStatus,
};
use crate::services::conflict_service::{ConflictQuery, ConflictService};
use crate::services::evaluation_service::EvaluationService;
use crate::services::notification_service::{notify_detached, NotificationEvent, Notifier};
use crate::store::{ApplicationStore, InterviewStore};
use crate::utils::time::Clock;
use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Owns the interview lifecycle: Scheduled is the only live state, every
/// terminal transition is compare-and-set against it, and outcomes are
/// gated on evaluation completeness.
#[derive(Clone)]
pub struct InterviewService {
    interviews: Arc<dyn InterviewStore>,
    applications: Arc<dyn ApplicationStore>,
    conflicts: ConflictService,
    evaluations: EvaluationService,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    scheduling: SchedulingConfig,
}

impl InterviewService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        interviews: Arc<dyn InterviewStore>,
        applications: Arc<dyn ApplicationStore>,
        conflicts: ConflictService,
        evaluations: EvaluationService,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        scheduling: SchedulingConfig,
    ) -> Self {
        Self {
            interviews,
            applications,
            conflicts,
            evaluations,
            notifier,
            clock,
            scheduling,
        }
    }

    async fn require(&self, id: Uuid) -> Result<Interview> {
        self.interviews
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", id)))
    }

    pub async fn schedule(&self, request: &ScheduleInterviewRequest) -> Result<Interview> {
        request.validate()?;
        if request.duration_minutes > self.scheduling.max_interview_minutes {
            return Err(Error::Validation(format!(
                "Duration must not exceed {} minutes",
                self.scheduling.max_interview_minutes
            )));
        }
        let mut seen = HashSet::new();
        for participant in &request.participants {
            if !seen.insert(participant.user_id) {
                return Err(Error::Uniqueness(format!(
                    "Participant {} listed more than once",
                    participant.user_id
                )));
            }
        }
        let application = self
            .applications
            .get(request.application_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Application {} not found", request.application_id))
            })?;

        let participant_ids: Vec<Uuid> =
            request.participants.iter().map(|p| p.user_id).collect();
        let report = self
            .conflicts
            .check(&ConflictQuery {
                participant_ids: &participant_ids,
                start: request.scheduled_at,
                duration_minutes: request.duration_minutes,
                exclude_interview: None,
                exclude_application: None,
            })
            .await?;
        if !report.all_free() {
            return Err(Error::Conflict { busy: report.busy });
        }

        let now = self.clock.now();
        let interview = Interview {
            id: Uuid::new_v4(),
            application_id: application.id,
            title: request.title.clone(),
            interview_type: request.interview_type,
            round: request.round,
            status: InterviewStatus::Scheduled,
            scheduled_at: request.scheduled_at,
            duration_minutes: request.duration_minutes,
            mode: request.mode,
            meeting_details: request.meeting_details.clone(),
            instructions: request.instructions.clone(),
            scheduled_by: request.scheduled_by,
            outcome: None,
            summary_notes: None,
            is_active: true,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        };
        let participants: Vec<InterviewParticipant> = request
            .participants
            .iter()
            .map(|p| InterviewParticipant {
                interview_id: interview.id,
                user_id: p.user_id,
                role: p.role,
                is_lead: p.is_lead,
            })
            .collect();

        // the store re-checks overlap inside its own unit of work, so a
        // racing schedule call surfaces here as a Conflict
        let created = self.interviews.insert_scheduled(&interview, &participants).await?;
        tracing::info!(
            interview_id = %created.id,
            application_id = %created.application_id,
            scheduled_at = %created.scheduled_at,
            "Interview scheduled"
        );
        notify_detached(
            &self.notifier,
            NotificationEvent::InterviewScheduled {
                interview_id: created.id,
                application_id: created.application_id,
                scheduled_at: created.scheduled_at,
                participant_ids,
            },
        );
        Ok(created)
    }

    pub async fn reschedule(
        &self,
        id: Uuid,
        request: &RescheduleInterviewRequest,
    ) -> Result<Interview> {
        request.validate()?;
        let mut attempts = 0;
        loop {
            let interview = self.require(id).await?;
            if interview.status != InterviewStatus::Scheduled {
                return Err(Error::IllegalTransition {
                    from: interview.status.to_string(),
                    to: "rescheduled".to_string(),
                });
            }
            let duration = request.duration_minutes.unwrap_or(interview.duration_minutes);
            if duration > self.scheduling.max_interview_minutes {
                return Err(Error::Validation(format!(
                    "Duration must not exceed {} minutes",
                    self.scheduling.max_interview_minutes
                )));
            }
            let participants = self.interviews.participants(id).await?;
            let participant_ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
            let report = self
                .conflicts
                .check(&ConflictQuery {
                    participant_ids: &participant_ids,
                    start: request.scheduled_at,
                    duration_minutes: duration,
                    exclude_interview: Some(id),
                    exclude_application: None,
                })
                .await?;
            if !report.all_free() {
                return Err(Error::Conflict { busy: report.busy });
            }

            match self
                .interviews
                .update_schedule(id, request.scheduled_at, duration, self.clock.now())
                .await
            {
                Err(Error::ConcurrentUpdate) if attempts == 0 => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
                Ok(updated) => {
                    tracing::info!(
                        interview_id = %id,
                        scheduled_at = %updated.scheduled_at,
                        reason = request.reason.as_deref().unwrap_or(""),
                        "Interview rescheduled"
                    );
                    notify_detached(
                        &self.notifier,
                        NotificationEvent::InterviewRescheduled {
                            interview_id: id,
                            scheduled_at: updated.scheduled_at,
                        },
                    );
                    return Ok(updated);
                }
            }
        }
    }

    pub async fn cancel(&self, id: Uuid, reason: Option<String>) -> Result<Interview> {
        let cancelled = self
            .terminate(id, InterviewStatus::Cancelled, reason.clone())
            .await?;
        notify_detached(
            &self.notifier,
            NotificationEvent::InterviewCancelled {
                interview_id: id,
                reason,
            },
        );
        Ok(cancelled)
    }

    pub async fn mark_completed(&self, id: Uuid, notes: Option<String>) -> Result<Interview> {
        self.terminate(id, InterviewStatus::Completed, notes).await
    }

    pub async fn mark_no_show(&self, id: Uuid, notes: Option<String>) -> Result<Interview> {
        self.terminate(id, InterviewStatus::NoShow, notes).await
    }

    /// Shared compare-and-set path for the three terminal transitions, with
    /// one transparent retry when the write loses a race.
    async fn terminate(
        &self,
        id: Uuid,
        to: InterviewStatus,
        notes: Option<String>,
    ) -> Result<Interview> {
        let mut attempts = 0;
        loop {
            let mut interview = self.require(id).await?;
            let from = interview.status;
            if !from.can_transition_to(to) {
                return Err(Error::IllegalTransition {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            interview.apply_transition(to, notes.as_deref(), self.clock.now());
            match self.interviews.update_if_status(from, &interview).await {
                Err(Error::ConcurrentUpdate) if attempts == 0 => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
                Ok(updated) => {
                    tracing::info!(interview_id = %id, status = %to, "Interview closed");
                    return Ok(updated);
                }
            }
        }
    }

    /// Outcomes are only writable once every role-required participant has
    /// evaluated, and a finalized outcome is never overwritten.
    pub async fn set_outcome(
        &self,
        id: Uuid,
        outcome: InterviewOutcome,
        actor_id: Uuid,
    ) -> Result<Interview> {
        let mut interview = self.require(id).await?;
        if let Some(existing) = interview.outcome {
            if existing.is_final() {
                return Err(Error::IllegalTransition {
                    from: format!("outcome_{}", existing),
                    to: format!("outcome_{}", outcome),
                });
            }
        }
        if !self.evaluations.is_complete(id).await? {
            return Err(Error::IllegalTransition {
                from: "awaiting_evaluations".to_string(),
                to: format!("outcome_{}", outcome),
            });
        }
        let from = interview.status;
        interview.outcome = Some(outcome);
        interview.updated_at = self.clock.now();
        let updated = self.interviews.update_if_status(from, &interview).await?;
        tracing::info!(
            interview_id = %id,
            outcome = %outcome,
            actor_id = %actor_id,
            "Interview outcome recorded"
        );
        Ok(updated)
    }

    /// Sweep entry point: notifies participants of interviews starting
    /// within the lead window, marking each so it is reminded once.
    pub async fn send_reminders(&self, lead: Duration) -> Result<usize> {
        let now = self.clock.now();
        let due = self
            .interviews
            .scheduled_between_unreminded(now, now + lead)
            .await?;
        let mut sent = 0;
        for interview in due {
            let participants = self.interviews.participants(interview.id).await?;
            let participant_ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
            let event = NotificationEvent::InterviewReminder {
                interview_id: interview.id,
                scheduled_at: interview.scheduled_at,
                participant_ids,
            };
            match self.notifier.notify(&event).await {
                Ok(()) => {
                    self.interviews.mark_reminded(interview.id, now).await?;
                    sent += 1;
                }
                Err(e) => {
                    tracing::error!(
                        interview_id = %interview.id,
                        error = ?e,
                        "Failed to deliver interview reminder"
                    );
                }
            }
        }
        Ok(sent)
    }
}
