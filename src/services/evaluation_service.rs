use crate::dto::evaluation_dto::{EvaluationSummary, SubmitEvaluationRequest};
use crate::error::{Error, Result};
use crate::models::evaluation::{InterviewEvaluation, Recommendation};
use crate::models::interview::{Interview, InterviewParticipant};
use crate::store::{EvaluationStore, InterviewStore};
use crate::utils::time::Clock;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Collects interviewer evaluations and aggregates them into the signals
/// the interview lifecycle gates on: average rating, majority
/// recommendation, and completeness over role-required participants.
#[derive(Clone)]
pub struct EvaluationService {
    interviews: Arc<dyn InterviewStore>,
    evaluations: Arc<dyn EvaluationStore>,
    clock: Arc<dyn Clock>,
}

impl EvaluationService {
    pub fn new(
        interviews: Arc<dyn InterviewStore>,
        evaluations: Arc<dyn EvaluationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            interviews,
            evaluations,
            clock,
        }
    }

    async fn require_interview(&self, interview_id: Uuid) -> Result<Interview> {
        self.interviews
            .get(interview_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Interview {} not found", interview_id)))
    }

    pub async fn submit(
        &self,
        interview_id: Uuid,
        evaluator_id: Uuid,
        request: &SubmitEvaluationRequest,
    ) -> Result<InterviewEvaluation> {
        request.validate()?;
        self.require_interview(interview_id).await?;
        let participants = self.interviews.participants(interview_id).await?;
        if !participants.iter().any(|p| p.user_id == evaluator_id) {
            return Err(Error::Validation(format!(
                "User {} is not a participant of interview {}",
                evaluator_id, interview_id
            )));
        }
        if let Some(existing) = self.evaluations.find(interview_id, evaluator_id).await? {
            return Err(Error::Uniqueness(format!(
                "Evaluator {} already submitted evaluation {}",
                evaluator_id, existing.id
            )));
        }

        let now = self.clock.now();
        let evaluation = InterviewEvaluation {
            id: Uuid::new_v4(),
            interview_id,
            evaluator_id,
            overall_rating: request.overall_rating,
            strengths: request.strengths.clone(),
            concerns: request.concerns.clone(),
            comments: request.comments.clone(),
            recommendation: request.recommendation,
            submitted_at: now,
            updated_at: now,
        };
        let created = self.evaluations.insert(&evaluation).await?;
        tracing::info!(
            interview_id = %interview_id,
            evaluator_id = %evaluator_id,
            "Evaluation submitted"
        );
        Ok(created)
    }

    /// Revising is open until the interview's outcome is finalized.
    pub async fn revise(
        &self,
        interview_id: Uuid,
        evaluator_id: Uuid,
        request: &SubmitEvaluationRequest,
    ) -> Result<InterviewEvaluation> {
        request.validate()?;
        let interview = self.require_interview(interview_id).await?;
        if interview.outcome.map(|o| o.is_final()).unwrap_or(false) {
            return Err(Error::Validation(format!(
                "Interview {} outcome is finalized; evaluations can no longer be revised",
                interview_id
            )));
        }
        let Some(mut evaluation) = self.evaluations.find(interview_id, evaluator_id).await? else {
            return Err(Error::NotFound(format!(
                "No evaluation by {} for interview {}",
                evaluator_id, interview_id
            )));
        };
        evaluation.overall_rating = request.overall_rating;
        evaluation.strengths = request.strengths.clone();
        evaluation.concerns = request.concerns.clone();
        evaluation.comments = request.comments.clone();
        evaluation.recommendation = request.recommendation;
        evaluation.updated_at = self.clock.now();
        self.evaluations.update_content(&evaluation).await
    }

    pub async fn average_rating(&self, interview_id: Uuid) -> Result<f64> {
        let evaluations = self.evaluations.for_interview(interview_id).await?;
        Ok(average_rating(&evaluations))
    }

    pub async fn overall_recommendation(
        &self,
        interview_id: Uuid,
    ) -> Result<Option<Recommendation>> {
        let evaluations = self.evaluations.for_interview(interview_id).await?;
        Ok(majority_recommendation(&evaluations))
    }

    pub async fn is_complete(&self, interview_id: Uuid) -> Result<bool> {
        let participants = self.interviews.participants(interview_id).await?;
        let evaluations = self.evaluations.for_interview(interview_id).await?;
        Ok(is_complete(&participants, &evaluations))
    }

    pub async fn can_evaluate(&self, interview_id: Uuid, user_id: Uuid) -> Result<bool> {
        let participants = self.interviews.participants(interview_id).await?;
        if !participants.iter().any(|p| p.user_id == user_id) {
            return Ok(false);
        }
        Ok(self.evaluations.find(interview_id, user_id).await?.is_none())
    }

    pub async fn summary(&self, interview_id: Uuid) -> Result<EvaluationSummary> {
        self.require_interview(interview_id).await?;
        let participants = self.interviews.participants(interview_id).await?;
        let evaluations = self.evaluations.for_interview(interview_id).await?;
        let (pass, fail, maybe) = tally(&evaluations);
        Ok(EvaluationSummary {
            interview_id,
            average_rating: average_rating(&evaluations),
            pass_count: pass,
            fail_count: fail,
            maybe_count: maybe,
            is_complete: is_complete(&participants, &evaluations),
            recommendation: majority_recommendation(&evaluations),
            evaluations,
        })
    }
}

/// Mean of the submitted ratings; 0 when none carry a rating.
pub fn average_rating(evaluations: &[InterviewEvaluation]) -> f64 {
    let ratings: Vec<i32> = evaluations.iter().filter_map(|e| e.overall_rating).collect();
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<i32>() as f64 / ratings.len() as f64
}

fn tally(evaluations: &[InterviewEvaluation]) -> (usize, usize, usize) {
    let mut pass = 0;
    let mut fail = 0;
    let mut maybe = 0;
    for evaluation in evaluations {
        match evaluation.recommendation {
            Recommendation::Pass => pass += 1,
            Recommendation::Fail => fail += 1,
            Recommendation::Maybe => maybe += 1,
        }
    }
    (pass, fail, maybe)
}

/// Strict majority of Pass or Fail across all submitted evaluations.
/// Ties, all-Maybe, and the empty set yield no definitive recommendation;
/// that absence is deliberate and must not be defaulted.
pub fn majority_recommendation(evaluations: &[InterviewEvaluation]) -> Option<Recommendation> {
    let (pass, fail, _) = tally(evaluations);
    let total = evaluations.len();
    if pass * 2 > total {
        Some(Recommendation::Pass)
    } else if fail * 2 > total {
        Some(Recommendation::Fail)
    } else {
        None
    }
}

/// Complete iff every participant whose role owes an evaluation has one.
/// Observers and shadows never gate completeness.
pub fn is_complete(
    participants: &[InterviewParticipant],
    evaluations: &[InterviewEvaluation],
) -> bool {
    participants
        .iter()
        .filter(|p| p.role.requires_evaluation())
        .all(|p| evaluations.iter().any(|e| e.evaluator_id == p.user_id))
}
