use crate::models::application::ApplicationStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Status change request. The caller names the status it believes the
/// application is in; a mismatch is reported as a concurrent update rather
/// than silently retargeting the transition.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub from_status: ApplicationStatus,
    pub to_status: ApplicationStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendOfferRequest {
    pub application_id: Uuid,
    pub offered_salary: Decimal,
    pub expires_at: DateTime<Utc>,
    pub extended_by: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterOfferRequest {
    pub counter_amount: Decimal,
    pub counter_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondToCounterRequest {
    pub accepted: bool,
    pub revised_salary: Option<Decimal>,
    pub response: Option<String>,
}
