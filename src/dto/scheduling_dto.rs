use crate::models::interview::{InterviewMode, InterviewType, ParticipantRole};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub application_id: Uuid,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub interview_type: InterviewType,
    #[validate(range(min = 1, message = "Round must be at least 1"))]
    pub round: i32,
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(
        min = 15,
        max = 720,
        message = "Duration must be between 15 and 720 minutes"
    ))]
    pub duration_minutes: i32,
    pub mode: InterviewMode,
    pub meeting_details: Option<String>,
    pub instructions: Option<String>,
    pub scheduled_by: Uuid,
    #[validate(length(min = 1, message = "At least one participant is required"))]
    pub participants: Vec<ParticipantRequest>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParticipantRequest {
    pub user_id: Uuid,
    pub role: ParticipantRole,
    #[serde(default)]
    pub is_lead: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RescheduleInterviewRequest {
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(
        min = 15,
        max = 720,
        message = "Duration must be between 15 and 720 minutes"
    ))]
    pub duration_minutes: Option<i32>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 15, message = "Duration must be at least 15 minutes"))]
    pub duration_minutes: i32,
    /// Empty list means "the requesting user only".
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
    pub exclude_application_id: Option<Uuid>,
}

/// The shared window every slot view carries (spec'd as composition: richer
/// views embed this by value rather than extending a type hierarchy).
#[derive(Debug, Clone, Serialize)]
pub struct SlotWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotParticipant {
    pub user_id: Uuid,
    pub display_name: String,
}

/// A candidate slot with per-participant availability. Partially-available
/// slots are returned too, for diagnostic display; only fully-free slots are
/// flagged recommended.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSlot {
    #[serde(flatten)]
    pub window: SlotWindow,
    pub available: Vec<SlotParticipant>,
    pub unavailable: Vec<SlotParticipant>,
    pub recommended: bool,
}
