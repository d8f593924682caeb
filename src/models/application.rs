use crate::error::Error;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Pipeline position of a job application. Stored as its `as_str` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    TestInvited,
    TestCompleted,
    UnderReview,
    Shortlisted,
    Interview,
    Selected,
    Hired,
    Rejected,
    Withdrawn,
    OnHold,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::TestInvited => "test_invited",
            ApplicationStatus::TestCompleted => "test_completed",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::OnHold => "on_hold",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    /// The single legal forward edge in the pipeline, if any.
    pub fn next_in_pipeline(&self) -> Option<ApplicationStatus> {
        match self {
            ApplicationStatus::Applied => Some(ApplicationStatus::TestInvited),
            ApplicationStatus::TestInvited => Some(ApplicationStatus::TestCompleted),
            ApplicationStatus::TestCompleted => Some(ApplicationStatus::UnderReview),
            ApplicationStatus::UnderReview => Some(ApplicationStatus::Shortlisted),
            ApplicationStatus::Shortlisted => Some(ApplicationStatus::Interview),
            ApplicationStatus::Interview => Some(ApplicationStatus::Selected),
            ApplicationStatus::Selected => Some(ApplicationStatus::Hired),
            _ => None,
        }
    }

    /// Edge set of the workflow machine. Hired/Rejected/Withdrawn are sinks,
    /// Rejected/Withdrawn/OnHold are reachable from any non-terminal state,
    /// and OnHold resumes only by an explicit transition to a caller-chosen
    /// non-terminal state.
    pub fn can_transition_to(&self, to: ApplicationStatus) -> bool {
        if self.is_terminal() || *self == to {
            return false;
        }
        match to {
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => true,
            ApplicationStatus::OnHold => true,
            ApplicationStatus::Hired => *self == ApplicationStatus::Selected,
            _ => {
                if *self == ApplicationStatus::OnHold {
                    !to.is_terminal()
                } else {
                    self.next_in_pipeline() == Some(to)
                }
            }
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "test_invited" => Ok(ApplicationStatus::TestInvited),
            "test_completed" => Ok(ApplicationStatus::TestCompleted),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interview" => Ok(ApplicationStatus::Interview),
            "selected" => Ok(ApplicationStatus::Selected),
            "hired" => Ok(ApplicationStatus::Hired),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            "on_hold" => Ok(ApplicationStatus::OnHold),
            other => Err(Error::Validation(format!(
                "Unknown application status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub recruiter_id: Option<Uuid>,
    pub test_score: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    /// Applies a validated status change in place. Rejection comments become
    /// the rejection reason; Rejected/Withdrawn also deactivate the row.
    pub fn apply_transition(
        &mut self,
        to: ApplicationStatus,
        comment: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if to == ApplicationStatus::Rejected {
            self.rejection_reason = comment.map(|c| c.to_string());
        }
        if matches!(
            to,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        ) {
            self.is_active = false;
        }
        self.status = to;
        self.updated_at = now;
    }
}

/// Append-only audit record, one row per status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatusHistory {
    pub id: Uuid,
    pub application_id: Uuid,
    pub from_status: ApplicationStatus,
    pub to_status: ApplicationStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_is_legal() {
        let chain = [
            ApplicationStatus::Applied,
            ApplicationStatus::TestInvited,
            ApplicationStatus::TestCompleted,
            ApplicationStatus::UnderReview,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interview,
            ApplicationStatus::Selected,
            ApplicationStatus::Hired,
        ];
        for pair in chain.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn skipping_ahead_is_illegal() {
        assert!(!ApplicationStatus::Applied.can_transition_to(ApplicationStatus::Hired));
        assert!(!ApplicationStatus::Applied.can_transition_to(ApplicationStatus::UnderReview));
        assert!(!ApplicationStatus::Shortlisted.can_transition_to(ApplicationStatus::Selected));
    }

    #[test]
    fn terminal_states_are_sinks() {
        for terminal in [
            ApplicationStatus::Hired,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert!(!terminal.can_transition_to(ApplicationStatus::Applied));
            assert!(!terminal.can_transition_to(ApplicationStatus::OnHold));
            assert!(!terminal.can_transition_to(ApplicationStatus::Rejected));
        }
    }

    #[test]
    fn rejected_and_withdrawn_reachable_from_any_non_terminal() {
        for from in [
            ApplicationStatus::Applied,
            ApplicationStatus::UnderReview,
            ApplicationStatus::Selected,
            ApplicationStatus::OnHold,
        ] {
            assert!(from.can_transition_to(ApplicationStatus::Rejected));
            assert!(from.can_transition_to(ApplicationStatus::Withdrawn));
        }
    }

    #[test]
    fn on_hold_resumes_to_non_terminal_only() {
        assert!(ApplicationStatus::OnHold.can_transition_to(ApplicationStatus::Interview));
        assert!(ApplicationStatus::OnHold.can_transition_to(ApplicationStatus::Applied));
        assert!(!ApplicationStatus::OnHold.can_transition_to(ApplicationStatus::Hired));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ApplicationStatus::Applied,
            ApplicationStatus::TestInvited,
            ApplicationStatus::TestCompleted,
            ApplicationStatus::UnderReview,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Interview,
            ApplicationStatus::Selected,
            ApplicationStatus::Hired,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
            ApplicationStatus::OnHold,
        ] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
    }
}
