use crate::dto::workflow_dto::{CounterOfferRequest, ExtendOfferRequest, RespondToCounterRequest};
use crate::error::{Error, Result};
use crate::models::offer::{JobOffer, OfferStatus};
use crate::services::notification_service::{notify_detached, NotificationEvent, Notifier};
use crate::store::{ApplicationStore, OfferStore};
use crate::utils::time::Clock;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Owns the offer negotiation cycle. One active (Pending/Accepted) offer
/// per application; the response date is stamped once, on the first
/// candidate-driven transition; expiry is the only sweep-driven edge and
/// still passes the same legality gate.
#[derive(Clone)]
pub struct OfferService {
    offers: Arc<dyn OfferStore>,
    applications: Arc<dyn ApplicationStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl OfferService {
    pub fn new(
        offers: Arc<dyn OfferStore>,
        applications: Arc<dyn ApplicationStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            offers,
            applications,
            notifier,
            clock,
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<JobOffer> {
        self.offers
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Offer {} not found", id)))
    }

    fn illegal(from: OfferStatus, to: OfferStatus) -> Error {
        Error::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub async fn extend(&self, request: &ExtendOfferRequest) -> Result<JobOffer> {
        self.applications
            .get(request.application_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Application {} not found", request.application_id))
            })?;
        if request.offered_salary <= Decimal::ZERO {
            return Err(Error::Validation(
                "Offered salary must be positive".to_string(),
            ));
        }
        let now = self.clock.now();
        if request.expires_at <= now {
            return Err(Error::Validation(
                "Offer expiry must be in the future".to_string(),
            ));
        }
        if let Some(existing) = self
            .offers
            .active_for_application(request.application_id)
            .await?
        {
            return Err(Error::Uniqueness(format!(
                "Application {} already has a {} offer",
                request.application_id, existing.status
            )));
        }

        let offer = JobOffer {
            id: Uuid::new_v4(),
            application_id: request.application_id,
            offered_salary: request.offered_salary,
            expires_at: request.expires_at,
            status: OfferStatus::Pending,
            counter_amount: None,
            counter_notes: None,
            response_date: None,
            extended_by: request.extended_by,
            extended_at: now,
            updated_at: now,
        };
        // the store re-checks the single-active-offer invariant in its own
        // unit of work
        let created = self.offers.insert_if_no_active(&offer).await?;
        tracing::info!(
            offer_id = %created.id,
            application_id = %created.application_id,
            expires_at = %created.expires_at,
            "Offer extended"
        );
        notify_detached(
            &self.notifier,
            NotificationEvent::OfferExtended {
                offer_id: created.id,
                application_id: created.application_id,
                expires_at: created.expires_at,
            },
        );
        Ok(created)
    }

    pub async fn accept(&self, id: Uuid) -> Result<JobOffer> {
        self.candidate_transition(id, OfferStatus::Accepted, |_offer| {})
            .await
    }

    pub async fn reject(&self, id: Uuid) -> Result<JobOffer> {
        self.candidate_transition(id, OfferStatus::Rejected, |_offer| {})
            .await
    }

    pub async fn counter(&self, id: Uuid, request: &CounterOfferRequest) -> Result<JobOffer> {
        if request.counter_amount <= Decimal::ZERO {
            return Err(Error::Validation(
                "Counter amount must be positive".to_string(),
            ));
        }
        let amount = request.counter_amount;
        let notes = request.counter_notes.clone();
        self.candidate_transition(id, OfferStatus::Countered, move |offer| {
            offer.counter_amount = Some(amount);
            offer.counter_notes = notes.clone();
        })
        .await
    }

    /// Candidate-driven edges out of Pending share the response-date and
    /// compare-and-set handling; `mutate` applies the edge-specific fields.
    async fn candidate_transition<F>(
        &self,
        id: Uuid,
        to: OfferStatus,
        mutate: F,
    ) -> Result<JobOffer>
    where
        F: Fn(&mut JobOffer),
    {
        let mut attempts = 0;
        loop {
            let mut offer = self.get(id).await?;
            let from = offer.status;
            if from != OfferStatus::Pending || !from.can_transition_to(to) {
                return Err(Self::illegal(from, to));
            }
            let now = self.clock.now();
            offer.status = to;
            offer.record_response(now);
            offer.updated_at = now;
            mutate(&mut offer);
            match self.offers.update_if_status(from, &offer).await {
                Err(Error::ConcurrentUpdate) if attempts == 0 => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
                Ok(updated) => {
                    tracing::info!(offer_id = %id, status = %to, "Offer responded to");
                    return Ok(updated);
                }
            }
        }
    }

    /// Employer response to a counter-offer. Accepting settles at the
    /// revised figure (or the candidate's counter); declining with revised
    /// terms re-offers them; declining outright rejects.
    pub async fn respond_to_counter(
        &self,
        id: Uuid,
        request: &RespondToCounterRequest,
    ) -> Result<JobOffer> {
        if let Some(salary) = request.revised_salary {
            if salary <= Decimal::ZERO {
                return Err(Error::Validation(
                    "Revised salary must be positive".to_string(),
                ));
            }
        }
        let mut attempts = 0;
        loop {
            let mut offer = self.get(id).await?;
            let from = offer.status;
            if from != OfferStatus::Countered {
                let to = if request.accepted {
                    OfferStatus::Accepted
                } else {
                    OfferStatus::Rejected
                };
                return Err(Self::illegal(from, to));
            }
            let now = self.clock.now();
            let to = if request.accepted {
                offer.offered_salary = request
                    .revised_salary
                    .or(offer.counter_amount)
                    .unwrap_or(offer.offered_salary);
                OfferStatus::Accepted
            } else if let Some(salary) = request.revised_salary {
                offer.offered_salary = salary;
                offer.counter_amount = None;
                offer.counter_notes = request.response.clone();
                OfferStatus::Pending
            } else {
                offer.counter_notes = request.response.clone();
                OfferStatus::Rejected
            };
            offer.status = to;
            offer.updated_at = now;
            match self.offers.update_if_status(from, &offer).await {
                Err(Error::ConcurrentUpdate) if attempts == 0 => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
                Ok(updated) => {
                    tracing::info!(offer_id = %id, status = %to, "Counter-offer answered");
                    return Ok(updated);
                }
            }
        }
    }

    pub async fn withdraw(&self, id: Uuid, reason: Option<String>) -> Result<JobOffer> {
        let mut attempts = 0;
        loop {
            let mut offer = self.get(id).await?;
            let from = offer.status;
            if !from.can_transition_to(OfferStatus::Withdrawn) {
                return Err(Self::illegal(from, OfferStatus::Withdrawn));
            }
            offer.status = OfferStatus::Withdrawn;
            offer.updated_at = self.clock.now();
            match self.offers.update_if_status(from, &offer).await {
                Err(Error::ConcurrentUpdate) if attempts == 0 => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e),
                Ok(updated) => {
                    tracing::info!(
                        offer_id = %id,
                        reason = reason.as_deref().unwrap_or(""),
                        "Offer withdrawn"
                    );
                    return Ok(updated);
                }
            }
        }
    }

    /// The one transition an automated sweep may trigger.
    pub async fn mark_expired(&self, id: Uuid) -> Result<JobOffer> {
        let mut offer = self.get(id).await?;
        let from = offer.status;
        if from != OfferStatus::Pending {
            return Err(Self::illegal(from, OfferStatus::Expired));
        }
        let now = self.clock.now();
        if offer.expires_at > now {
            return Err(Error::Validation(format!(
                "Offer {} does not expire until {}",
                id, offer.expires_at
            )));
        }
        offer.status = OfferStatus::Expired;
        offer.updated_at = now;
        let updated = self.offers.update_if_status(from, &offer).await?;
        tracing::info!(offer_id = %id, "Offer expired");
        Ok(updated)
    }

    /// Housekeeping pass over past-due Pending offers; each one is routed
    /// through `mark_expired` so the legality gate applies uniformly.
    pub async fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let due = self.offers.pending_expiring_before(now).await?;
        let mut expired = 0;
        for offer in due {
            match self.mark_expired(offer.id).await {
                Ok(_) => expired += 1,
                // lost to a concurrent response or another sweep; skip
                Err(Error::IllegalTransition { .. }) | Err(Error::ConcurrentUpdate) => {}
                Err(e) => {
                    tracing::error!(offer_id = %offer.id, error = ?e, "Expiry sweep failed");
                }
            }
        }
        Ok(expired)
    }
}
