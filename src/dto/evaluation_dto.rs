use crate::models::evaluation::{InterviewEvaluation, Recommendation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitEvaluationRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub overall_rating: Option<i32>,
    pub strengths: Option<String>,
    pub concerns: Option<String>,
    pub comments: Option<String>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub interview_id: Uuid,
    pub average_rating: f64,
    pub pass_count: usize,
    pub fail_count: usize,
    pub maybe_count: usize,
    pub is_complete: bool,
    /// Absent when there is no definitive majority.
    pub recommendation: Option<Recommendation>,
    pub evaluations: Vec<InterviewEvaluation>,
}
