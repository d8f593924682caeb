use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Pass,
    Fail,
    Maybe,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Pass => "pass",
            Recommendation::Fail => "fail",
            Recommendation::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Recommendation::Pass),
            "fail" => Ok(Recommendation::Fail),
            "maybe" => Ok(Recommendation::Maybe),
            other => Err(Error::Validation(format!(
                "Unknown recommendation: {}",
                other
            ))),
        }
    }
}

/// One interviewer's written verdict. At most one per (interview, evaluator);
/// content may be revised until the interview's outcome is finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewEvaluation {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub evaluator_id: Uuid,
    pub overall_rating: Option<i32>,
    pub strengths: Option<String>,
    pub concerns: Option<String>,
    pub comments: Option<String>,
    pub recommendation: Recommendation,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
