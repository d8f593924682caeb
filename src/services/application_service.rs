use crate::dto::workflow_dto::UpdateApplicationStatusRequest;
use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatusHistory, JobApplication};
use crate::services::notification_service::{notify_detached, NotificationEvent, Notifier};
use crate::store::ApplicationStore;
use crate::utils::time::Clock;
use std::sync::Arc;
use uuid::Uuid;

/// Owns job application status changes. Every transition is validated
/// against the fixed edge set, written together with exactly one history
/// row, and checked against the status the caller last saw.
#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            applications,
            notifier,
            clock,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<JobApplication> {
        self.applications
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<ApplicationStatusHistory>> {
        self.get(id).await?;
        self.applications.history(id).await
    }

    pub async fn transition(
        &self,
        application_id: Uuid,
        request: &UpdateApplicationStatusRequest,
        actor_id: Uuid,
    ) -> Result<(JobApplication, ApplicationStatusHistory)> {
        let mut attempts = 0;
        loop {
            let application = self.get(application_id).await?;
            if application.status != request.from_status {
                // the caller acted on a stale read; surface it, do not guess
                return Err(Error::ConcurrentUpdate);
            }
            if !application.status.can_transition_to(request.to_status) {
                return Err(Error::IllegalTransition {
                    from: application.status.to_string(),
                    to: request.to_status.to_string(),
                });
            }

            let now = self.clock.now();
            let from = application.status;
            let mut updated = application;
            updated.apply_transition(request.to_status, request.comment.as_deref(), now);
            let entry = ApplicationStatusHistory {
                id: Uuid::new_v4(),
                application_id,
                from_status: from,
                to_status: request.to_status,
                changed_by: actor_id,
                changed_at: now,
                comment: request.comment.clone(),
            };

            match self
                .applications
                .transition_with_history(from, &updated, &entry)
                .await
            {
                Err(Error::ConcurrentUpdate) if attempts == 0 => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
                Ok((application, entry)) => {
                    tracing::info!(
                        application_id = %application_id,
                        from = %entry.from_status,
                        to = %entry.to_status,
                        actor_id = %actor_id,
                        "Application status changed"
                    );
                    notify_detached(
                        &self.notifier,
                        NotificationEvent::ApplicationStatusChanged {
                            application_id,
                            from_status: entry.from_status,
                            to_status: entry.to_status,
                        },
                    );
                    return Ok((application, entry));
                }
            }
        }
    }
}
