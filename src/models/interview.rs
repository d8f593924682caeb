use crate::error::Error;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Screening,
    Technical,
    Cultural,
    Final,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Screening => "screening",
            InterviewType::Technical => "technical",
            InterviewType::Cultural => "cultural",
            InterviewType::Final => "final",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "screening" => Ok(InterviewType::Screening),
            "technical" => Ok(InterviewType::Technical),
            "cultural" => Ok(InterviewType::Cultural),
            "final" => Ok(InterviewType::Final),
            other => Err(Error::Validation(format!(
                "Unknown interview type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
            InterviewStatus::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InterviewStatus::Scheduled)
    }

    /// Scheduled is the only live state; every edge out of it is terminal.
    pub fn can_transition_to(&self, to: InterviewStatus) -> bool {
        *self == InterviewStatus::Scheduled && to.is_terminal()
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            "no_show" => Ok(InterviewStatus::NoShow),
            other => Err(Error::Validation(format!(
                "Unknown interview status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    InPerson,
    Online,
    Phone,
}

impl InterviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::InPerson => "in_person",
            InterviewMode::Online => "online",
            InterviewMode::Phone => "phone",
        }
    }
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_person" => Ok(InterviewMode::InPerson),
            "online" => Ok(InterviewMode::Online),
            "phone" => Ok(InterviewMode::Phone),
            other => Err(Error::Validation(format!(
                "Unknown interview mode: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewOutcome {
    Pass,
    Fail,
    Pending,
}

impl InterviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewOutcome::Pass => "pass",
            InterviewOutcome::Fail => "fail",
            InterviewOutcome::Pending => "pending",
        }
    }

    /// Pass/Fail close the book on an interview; Pending does not.
    pub fn is_final(&self) -> bool {
        !matches!(self, InterviewOutcome::Pending)
    }
}

impl fmt::Display for InterviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(InterviewOutcome::Pass),
            "fail" => Ok(InterviewOutcome::Fail),
            "pending" => Ok(InterviewOutcome::Pending),
            other => Err(Error::Validation(format!(
                "Unknown interview outcome: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    PrimaryInterviewer,
    Interviewer,
    Observer,
    Shadow,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::PrimaryInterviewer => "primary_interviewer",
            ParticipantRole::Interviewer => "interviewer",
            ParticipantRole::Observer => "observer",
            ParticipantRole::Shadow => "shadow",
        }
    }

    /// Whether this participant's evaluation counts toward completeness.
    pub fn requires_evaluation(&self) -> bool {
        matches!(
            self,
            ParticipantRole::PrimaryInterviewer | ParticipantRole::Interviewer
        )
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary_interviewer" => Ok(ParticipantRole::PrimaryInterviewer),
            "interviewer" => Ok(ParticipantRole::Interviewer),
            "observer" => Ok(ParticipantRole::Observer),
            "shadow" => Ok(ParticipantRole::Shadow),
            other => Err(Error::Validation(format!(
                "Unknown participant role: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: Uuid,
    pub application_id: Uuid,
    pub title: String,
    pub interview_type: InterviewType,
    pub round: i32,
    pub status: InterviewStatus,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub mode: InterviewMode,
    pub meeting_details: Option<String>,
    pub instructions: Option<String>,
    pub scheduled_by: Uuid,
    pub outcome: Option<InterviewOutcome>,
    pub summary_notes: Option<String>,
    pub is_active: bool,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn end_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_minutes as i64)
    }

    /// Applies a validated terminal transition in place. Cancelling also
    /// soft-inactivates the row; interviews are never hard-deleted.
    pub fn apply_transition(
        &mut self,
        to: InterviewStatus,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if let Some(notes) = notes {
            self.summary_notes = Some(notes.to_string());
        }
        if to == InterviewStatus::Cancelled {
            self.is_active = false;
        }
        self.status = to;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewParticipant {
    pub interview_id: Uuid,
    pub user_id: Uuid,
    pub role: ParticipantRole,
    pub is_lead: bool,
}
