//! Postgres adapter. Runtime-bound queries; enum fields travel as their
//! `as_str` form and are parsed back at the row boundary. Atomic port
//! methods run inside a transaction, re-checking their invariant there so
//! racing writers cannot both land.

use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatus, ApplicationStatusHistory, JobApplication};
use crate::models::evaluation::InterviewEvaluation;
use crate::models::interview::{Interview, InterviewParticipant, InterviewStatus};
use crate::models::offer::{JobOffer, OfferStatus};
use crate::models::user::User;
use crate::store::{
    ApplicationStore, BookedInterview, EvaluationStore, InterviewStore, OfferStore, UserStore,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INTERVIEW_COLS: &str = "id, application_id, title, interview_type, round, status, \
     scheduled_at, duration_minutes, mode, meeting_details, instructions, scheduled_by, \
     outcome, summary_notes, is_active, reminder_sent_at, created_at, updated_at";

const APPLICATION_COLS: &str = "id, candidate_id, job_id, status, applied_at, recruiter_id, \
     test_score, rejection_reason, is_active, created_at, updated_at";

const EVALUATION_COLS: &str = "id, interview_id, evaluator_id, overall_rating, strengths, \
     concerns, comments, recommendation, submitted_at, updated_at";

const OFFER_COLS: &str = "id, application_id, offered_salary, expires_at, status, \
     counter_amount, counter_notes, response_date, extended_by, extended_at, updated_at";

#[derive(FromRow)]
struct InterviewRow {
    id: Uuid,
    application_id: Uuid,
    title: String,
    interview_type: String,
    round: i32,
    status: String,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    mode: String,
    meeting_details: Option<String>,
    instructions: Option<String>,
    scheduled_by: Uuid,
    outcome: Option<String>,
    summary_notes: Option<String>,
    is_active: bool,
    reminder_sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = Error;

    fn try_from(row: InterviewRow) -> Result<Interview> {
        Ok(Interview {
            id: row.id,
            application_id: row.application_id,
            title: row.title,
            interview_type: row.interview_type.parse()?,
            round: row.round,
            status: row.status.parse()?,
            scheduled_at: row.scheduled_at,
            duration_minutes: row.duration_minutes,
            mode: row.mode.parse()?,
            meeting_details: row.meeting_details,
            instructions: row.instructions,
            scheduled_by: row.scheduled_by,
            outcome: row
                .outcome
                .as_deref()
                .map(|s| s.parse())
                .transpose()?,
            summary_notes: row.summary_notes,
            is_active: row.is_active,
            reminder_sent_at: row.reminder_sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ParticipantRow {
    interview_id: Uuid,
    user_id: Uuid,
    role: String,
    is_lead: bool,
}

impl TryFrom<ParticipantRow> for InterviewParticipant {
    type Error = Error;

    fn try_from(row: ParticipantRow) -> Result<InterviewParticipant> {
        Ok(InterviewParticipant {
            interview_id: row.interview_id,
            user_id: row.user_id,
            role: row.role.parse()?,
            is_lead: row.is_lead,
        })
    }
}

#[derive(FromRow)]
struct ApplicationRow {
    id: Uuid,
    candidate_id: Uuid,
    job_id: Uuid,
    status: String,
    applied_at: DateTime<Utc>,
    recruiter_id: Option<Uuid>,
    test_score: Option<Decimal>,
    rejection_reason: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for JobApplication {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<JobApplication> {
        Ok(JobApplication {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            status: row.status.parse()?,
            applied_at: row.applied_at,
            recruiter_id: row.recruiter_id,
            test_score: row.test_score,
            rejection_reason: row.rejection_reason,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct HistoryRow {
    id: Uuid,
    application_id: Uuid,
    from_status: String,
    to_status: String,
    changed_by: Uuid,
    changed_at: DateTime<Utc>,
    comment: Option<String>,
}

impl TryFrom<HistoryRow> for ApplicationStatusHistory {
    type Error = Error;

    fn try_from(row: HistoryRow) -> Result<ApplicationStatusHistory> {
        Ok(ApplicationStatusHistory {
            id: row.id,
            application_id: row.application_id,
            from_status: row.from_status.parse()?,
            to_status: row.to_status.parse()?,
            changed_by: row.changed_by,
            changed_at: row.changed_at,
            comment: row.comment,
        })
    }
}

#[derive(FromRow)]
struct EvaluationRow {
    id: Uuid,
    interview_id: Uuid,
    evaluator_id: Uuid,
    overall_rating: Option<i32>,
    strengths: Option<String>,
    concerns: Option<String>,
    comments: Option<String>,
    recommendation: String,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EvaluationRow> for InterviewEvaluation {
    type Error = Error;

    fn try_from(row: EvaluationRow) -> Result<InterviewEvaluation> {
        Ok(InterviewEvaluation {
            id: row.id,
            interview_id: row.interview_id,
            evaluator_id: row.evaluator_id,
            overall_rating: row.overall_rating,
            strengths: row.strengths,
            concerns: row.concerns,
            comments: row.comments,
            recommendation: row.recommendation.parse()?,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OfferRow {
    id: Uuid,
    application_id: Uuid,
    offered_salary: Decimal,
    expires_at: DateTime<Utc>,
    status: String,
    counter_amount: Option<Decimal>,
    counter_notes: Option<String>,
    response_date: Option<DateTime<Utc>>,
    extended_by: Uuid,
    extended_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for JobOffer {
    type Error = Error;

    fn try_from(row: OfferRow) -> Result<JobOffer> {
        Ok(JobOffer {
            id: row.id,
            application_id: row.application_id,
            offered_salary: row.offered_salary,
            expires_at: row.expires_at,
            status: row.status.parse()?,
            counter_amount: row.counter_amount,
            counter_notes: row.counter_notes,
            response_date: row.response_date,
            extended_by: row.extended_by,
            extended_at: row.extended_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait::async_trait]
impl InterviewStore for PgStore {
    async fn insert_scheduled(
        &self,
        interview: &Interview,
        participants: &[InterviewParticipant],
    ) -> Result<Interview> {
        let mut tx = self.pool.begin().await?;
        let mut ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
        ids.sort();

        // serialize against concurrent schedule calls touching the same
        // participants; sorted acquisition avoids lock-order deadlocks
        for user_id in &ids {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        let busy_rows = sqlx::query(
            r#"
            SELECT ip.user_id
            FROM interviews i
            JOIN interview_participants ip ON ip.interview_id = i.id
            WHERE ip.user_id = ANY($1)
              AND i.status = 'scheduled'
              AND i.scheduled_at < $3
              AND i.scheduled_at + make_interval(mins => i.duration_minutes) > $2
            FOR UPDATE OF i
            "#,
        )
        .bind(&ids)
        .bind(interview.scheduled_at)
        .bind(interview.end_at())
        .fetch_all(&mut *tx)
        .await?;

        let mut busy: Vec<Uuid> = Vec::new();
        for row in busy_rows {
            let user_id: Uuid = row.try_get("user_id")?;
            if !busy.contains(&user_id) {
                busy.push(user_id);
            }
        }
        if !busy.is_empty() {
            return Err(Error::Conflict { busy });
        }

        let sql = format!(
            "INSERT INTO interviews ({INTERVIEW_COLS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
        );
        sqlx::query(&sql)
            .bind(interview.id)
            .bind(interview.application_id)
            .bind(&interview.title)
            .bind(interview.interview_type.as_str())
            .bind(interview.round)
            .bind(interview.status.as_str())
            .bind(interview.scheduled_at)
            .bind(interview.duration_minutes)
            .bind(interview.mode.as_str())
            .bind(&interview.meeting_details)
            .bind(&interview.instructions)
            .bind(interview.scheduled_by)
            .bind(interview.outcome.map(|o| o.as_str()))
            .bind(&interview.summary_notes)
            .bind(interview.is_active)
            .bind(interview.reminder_sent_at)
            .bind(interview.created_at)
            .bind(interview.updated_at)
            .execute(&mut *tx)
            .await?;

        for participant in participants {
            let inserted = sqlx::query(
                r#"
                INSERT INTO interview_participants (interview_id, user_id, role, is_lead)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (interview_id, user_id) DO NOTHING
                RETURNING user_id
                "#,
            )
            .bind(participant.interview_id)
            .bind(participant.user_id)
            .bind(participant.role.as_str())
            .bind(participant.is_lead)
            .fetch_optional(&mut *tx)
            .await?;
            if inserted.is_none() {
                return Err(Error::Uniqueness(format!(
                    "Participant {} listed twice for interview {}",
                    participant.user_id, interview.id
                )));
            }
        }

        tx.commit().await?;
        Ok(interview.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Interview>> {
        let sql = format!("SELECT {INTERVIEW_COLS} FROM interviews WHERE id = $1");
        let row: Option<InterviewRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Interview::try_from).transpose()
    }

    async fn participants(&self, interview_id: Uuid) -> Result<Vec<InterviewParticipant>> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT interview_id, user_id, role, is_lead
            FROM interview_participants
            WHERE interview_id = $1
            ORDER BY is_lead DESC, user_id
            "#,
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(InterviewParticipant::try_from).collect()
    }

    async fn booked_in_window(
        &self,
        participant_ids: &[Uuid],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        exclude_interview: Option<Uuid>,
        exclude_application: Option<Uuid>,
    ) -> Result<Vec<BookedInterview>> {
        let sql = format!(
            "SELECT DISTINCT {cols} \
             FROM interviews i \
             JOIN interview_participants ip ON ip.interview_id = i.id \
             WHERE ip.user_id = ANY($1) \
               AND i.status = 'scheduled' \
               AND i.scheduled_at < $3 \
               AND i.scheduled_at + make_interval(mins => i.duration_minutes) > $2 \
               AND ($4::uuid IS NULL OR i.id <> $4) \
               AND ($5::uuid IS NULL OR i.application_id <> $5) \
             ORDER BY i.scheduled_at",
            cols = INTERVIEW_COLS
                .split(", ")
                .map(|c| format!("i.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let rows: Vec<InterviewRow> = sqlx::query_as(&sql)
            .bind(participant_ids)
            .bind(window_start)
            .bind(window_end)
            .bind(exclude_interview)
            .bind(exclude_application)
            .fetch_all(&self.pool)
            .await?;

        let interviews: Vec<Interview> = rows
            .into_iter()
            .map(Interview::try_from)
            .collect::<Result<_>>()?;
        if interviews.is_empty() {
            return Ok(Vec::new());
        }

        let interview_ids: Vec<Uuid> = interviews.iter().map(|i| i.id).collect();
        let attending = sqlx::query(
            r#"
            SELECT interview_id, user_id
            FROM interview_participants
            WHERE interview_id = ANY($1) AND user_id = ANY($2)
            "#,
        )
        .bind(&interview_ids)
        .bind(participant_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_interview: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in attending {
            let interview_id: Uuid = row.try_get("interview_id")?;
            let user_id: Uuid = row.try_get("user_id")?;
            by_interview.entry(interview_id).or_default().push(user_id);
        }

        Ok(interviews
            .into_iter()
            .filter_map(|interview| {
                by_interview.remove(&interview.id).map(|participant_ids| {
                    BookedInterview {
                        interview,
                        participant_ids,
                    }
                })
            })
            .collect())
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        new_start: DateTime<Utc>,
        new_duration_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<Interview> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {INTERVIEW_COLS} FROM interviews WHERE id = $1 FOR UPDATE");
        let row: Option<InterviewRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(Error::NotFound(format!("Interview {} not found", id)));
        };
        let current = Interview::try_from(row)?;
        if current.status != InterviewStatus::Scheduled {
            return Err(Error::ConcurrentUpdate);
        }

        let mut own_ids: Vec<Uuid> = sqlx::query(
            "SELECT user_id FROM interview_participants WHERE interview_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| row.try_get("user_id"))
        .collect::<std::result::Result<_, sqlx::Error>>()?;
        own_ids.sort();
        for user_id in &own_ids {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        let new_end = new_start + chrono::Duration::minutes(new_duration_minutes as i64);
        let busy_rows = sqlx::query(
            r#"
            SELECT ip.user_id
            FROM interviews i
            JOIN interview_participants ip ON ip.interview_id = i.id
            WHERE ip.user_id IN (
                    SELECT user_id FROM interview_participants WHERE interview_id = $1
                  )
              AND i.id <> $1
              AND i.status = 'scheduled'
              AND i.scheduled_at < $3
              AND i.scheduled_at + make_interval(mins => i.duration_minutes) > $2
            FOR UPDATE OF i
            "#,
        )
        .bind(id)
        .bind(new_start)
        .bind(new_end)
        .fetch_all(&mut *tx)
        .await?;

        let mut busy: Vec<Uuid> = Vec::new();
        for row in busy_rows {
            let user_id: Uuid = row.try_get("user_id")?;
            if !busy.contains(&user_id) {
                busy.push(user_id);
            }
        }
        if !busy.is_empty() {
            return Err(Error::Conflict { busy });
        }

        let sql = format!(
            "UPDATE interviews \
             SET scheduled_at = $2, duration_minutes = $3, reminder_sent_at = NULL, updated_at = $4 \
             WHERE id = $1 AND status = 'scheduled' \
             RETURNING {INTERVIEW_COLS}"
        );
        let row: Option<InterviewRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(new_start)
            .bind(new_duration_minutes)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(Error::ConcurrentUpdate);
        };
        tx.commit().await?;
        Interview::try_from(row)
    }

    async fn update_if_status(
        &self,
        expected: InterviewStatus,
        interview: &Interview,
    ) -> Result<Interview> {
        let sql = format!(
            "UPDATE interviews \
             SET status = $3, outcome = $4, summary_notes = $5, is_active = $6, \
                 scheduled_at = $7, duration_minutes = $8, reminder_sent_at = $9, updated_at = $10 \
             WHERE id = $1 AND status = $2 \
             RETURNING {INTERVIEW_COLS}"
        );
        let row: Option<InterviewRow> = sqlx::query_as(&sql)
            .bind(interview.id)
            .bind(expected.as_str())
            .bind(interview.status.as_str())
            .bind(interview.outcome.map(|o| o.as_str()))
            .bind(&interview.summary_notes)
            .bind(interview.is_active)
            .bind(interview.scheduled_at)
            .bind(interview.duration_minutes)
            .bind(interview.reminder_sent_at)
            .bind(interview.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Interview::try_from(row),
            None => {
                let exists = sqlx::query("SELECT id FROM interviews WHERE id = $1")
                    .bind(interview.id)
                    .fetch_optional(&self.pool)
                    .await?;
                if exists.is_none() {
                    Err(Error::NotFound(format!(
                        "Interview {} not found",
                        interview.id
                    )))
                } else {
                    Err(Error::ConcurrentUpdate)
                }
            }
        }
    }

    async fn scheduled_between_unreminded(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Interview>> {
        let sql = format!(
            "SELECT {INTERVIEW_COLS} FROM interviews \
             WHERE status = 'scheduled' AND reminder_sent_at IS NULL \
               AND scheduled_at >= $1 AND scheduled_at < $2 \
             ORDER BY scheduled_at"
        );
        let rows: Vec<InterviewRow> = sqlx::query_as(&sql)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Interview::try_from).collect()
    }

    async fn mark_reminded(&self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE interviews SET reminder_sent_at = $2, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Interview {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ApplicationStore for PgStore {
    async fn insert(&self, application: &JobApplication) -> Result<JobApplication> {
        let sql = format!(
            "INSERT INTO job_applications ({APPLICATION_COLS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (candidate_id, job_id) DO NOTHING \
             RETURNING {APPLICATION_COLS}"
        );
        let row: Option<ApplicationRow> = sqlx::query_as(&sql)
            .bind(application.id)
            .bind(application.candidate_id)
            .bind(application.job_id)
            .bind(application.status.as_str())
            .bind(application.applied_at)
            .bind(application.recruiter_id)
            .bind(application.test_score)
            .bind(&application.rejection_reason)
            .bind(application.is_active)
            .bind(application.created_at)
            .bind(application.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => JobApplication::try_from(row),
            None => Err(Error::Uniqueness(format!(
                "Candidate {} already applied to job {}",
                application.candidate_id, application.job_id
            ))),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobApplication>> {
        let sql = format!("SELECT {APPLICATION_COLS} FROM job_applications WHERE id = $1");
        let row: Option<ApplicationRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobApplication::try_from).transpose()
    }

    async fn transition_with_history(
        &self,
        expected: ApplicationStatus,
        application: &JobApplication,
        entry: &ApplicationStatusHistory,
    ) -> Result<(JobApplication, ApplicationStatusHistory)> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE job_applications \
             SET status = $3, rejection_reason = $4, is_active = $5, updated_at = $6 \
             WHERE id = $1 AND status = $2 \
             RETURNING {APPLICATION_COLS}"
        );
        let row: Option<ApplicationRow> = sqlx::query_as(&sql)
            .bind(application.id)
            .bind(expected.as_str())
            .bind(application.status.as_str())
            .bind(&application.rejection_reason)
            .bind(application.is_active)
            .bind(application.updated_at)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            let exists = sqlx::query("SELECT id FROM job_applications WHERE id = $1")
                .bind(application.id)
                .fetch_optional(&mut *tx)
                .await?;
            return if exists.is_none() {
                Err(Error::NotFound(format!(
                    "Application {} not found",
                    application.id
                )))
            } else {
                Err(Error::ConcurrentUpdate)
            };
        };

        sqlx::query(
            r#"
            INSERT INTO application_status_history
                (id, application_id, from_status, to_status, changed_by, changed_at, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.application_id)
        .bind(entry.from_status.as_str())
        .bind(entry.to_status.as_str())
        .bind(entry.changed_by)
        .bind(entry.changed_at)
        .bind(&entry.comment)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((JobApplication::try_from(row)?, entry.clone()))
    }

    async fn history(&self, application_id: Uuid) -> Result<Vec<ApplicationStatusHistory>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, application_id, from_status, to_status, changed_by, changed_at, comment
            FROM application_status_history
            WHERE application_id = $1
            ORDER BY seq
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ApplicationStatusHistory::try_from)
            .collect()
    }
}

#[async_trait::async_trait]
impl EvaluationStore for PgStore {
    async fn insert(&self, evaluation: &InterviewEvaluation) -> Result<InterviewEvaluation> {
        let sql = format!(
            "INSERT INTO interview_evaluations ({EVALUATION_COLS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (interview_id, evaluator_id) DO NOTHING \
             RETURNING {EVALUATION_COLS}"
        );
        let row: Option<EvaluationRow> = sqlx::query_as(&sql)
            .bind(evaluation.id)
            .bind(evaluation.interview_id)
            .bind(evaluation.evaluator_id)
            .bind(evaluation.overall_rating)
            .bind(&evaluation.strengths)
            .bind(&evaluation.concerns)
            .bind(&evaluation.comments)
            .bind(evaluation.recommendation.as_str())
            .bind(evaluation.submitted_at)
            .bind(evaluation.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => InterviewEvaluation::try_from(row),
            None => Err(Error::Uniqueness(format!(
                "Evaluator {} already submitted for interview {}",
                evaluation.evaluator_id, evaluation.interview_id
            ))),
        }
    }

    async fn update_content(
        &self,
        evaluation: &InterviewEvaluation,
    ) -> Result<InterviewEvaluation> {
        let sql = format!(
            "UPDATE interview_evaluations \
             SET overall_rating = $2, strengths = $3, concerns = $4, comments = $5, \
                 recommendation = $6, updated_at = $7 \
             WHERE id = $1 \
             RETURNING {EVALUATION_COLS}"
        );
        let row: Option<EvaluationRow> = sqlx::query_as(&sql)
            .bind(evaluation.id)
            .bind(evaluation.overall_rating)
            .bind(&evaluation.strengths)
            .bind(&evaluation.concerns)
            .bind(&evaluation.comments)
            .bind(evaluation.recommendation.as_str())
            .bind(evaluation.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => InterviewEvaluation::try_from(row),
            None => Err(Error::NotFound(format!(
                "Evaluation {} not found",
                evaluation.id
            ))),
        }
    }

    async fn for_interview(&self, interview_id: Uuid) -> Result<Vec<InterviewEvaluation>> {
        let sql = format!(
            "SELECT {EVALUATION_COLS} FROM interview_evaluations \
             WHERE interview_id = $1 ORDER BY submitted_at"
        );
        let rows: Vec<EvaluationRow> = sqlx::query_as(&sql)
            .bind(interview_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(InterviewEvaluation::try_from).collect()
    }

    async fn find(
        &self,
        interview_id: Uuid,
        evaluator_id: Uuid,
    ) -> Result<Option<InterviewEvaluation>> {
        let sql = format!(
            "SELECT {EVALUATION_COLS} FROM interview_evaluations \
             WHERE interview_id = $1 AND evaluator_id = $2"
        );
        let row: Option<EvaluationRow> = sqlx::query_as(&sql)
            .bind(interview_id)
            .bind(evaluator_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(InterviewEvaluation::try_from).transpose()
    }
}

#[async_trait::async_trait]
impl OfferStore for PgStore {
    async fn insert_if_no_active(&self, offer: &JobOffer) -> Result<JobOffer> {
        let mut tx = self.pool.begin().await?;

        let active = sqlx::query(
            r#"
            SELECT id FROM job_offers
            WHERE application_id = $1 AND status IN ('pending', 'accepted')
            FOR UPDATE
            "#,
        )
        .bind(offer.application_id)
        .fetch_optional(&mut *tx)
        .await?;
        if active.is_some() {
            return Err(Error::Uniqueness(format!(
                "Application {} already has an active offer",
                offer.application_id
            )));
        }

        let sql = format!(
            "INSERT INTO job_offers ({OFFER_COLS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {OFFER_COLS}"
        );
        let row: OfferRow = sqlx::query_as(&sql)
            .bind(offer.id)
            .bind(offer.application_id)
            .bind(offer.offered_salary)
            .bind(offer.expires_at)
            .bind(offer.status.as_str())
            .bind(offer.counter_amount)
            .bind(&offer.counter_notes)
            .bind(offer.response_date)
            .bind(offer.extended_by)
            .bind(offer.extended_at)
            .bind(offer.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        JobOffer::try_from(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobOffer>> {
        let sql = format!("SELECT {OFFER_COLS} FROM job_offers WHERE id = $1");
        let row: Option<OfferRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobOffer::try_from).transpose()
    }

    async fn active_for_application(&self, application_id: Uuid) -> Result<Option<JobOffer>> {
        let sql = format!(
            "SELECT {OFFER_COLS} FROM job_offers \
             WHERE application_id = $1 AND status IN ('pending', 'accepted') \
             LIMIT 1"
        );
        let row: Option<OfferRow> = sqlx::query_as(&sql)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobOffer::try_from).transpose()
    }

    async fn update_if_status(&self, expected: OfferStatus, offer: &JobOffer) -> Result<JobOffer> {
        let sql = format!(
            "UPDATE job_offers \
             SET status = $3, offered_salary = $4, counter_amount = $5, counter_notes = $6, \
                 response_date = $7, updated_at = $8 \
             WHERE id = $1 AND status = $2 \
             RETURNING {OFFER_COLS}"
        );
        let row: Option<OfferRow> = sqlx::query_as(&sql)
            .bind(offer.id)
            .bind(expected.as_str())
            .bind(offer.status.as_str())
            .bind(offer.offered_salary)
            .bind(offer.counter_amount)
            .bind(&offer.counter_notes)
            .bind(offer.response_date)
            .bind(offer.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => JobOffer::try_from(row),
            None => {
                let exists = sqlx::query("SELECT id FROM job_offers WHERE id = $1")
                    .bind(offer.id)
                    .fetch_optional(&self.pool)
                    .await?;
                if exists.is_none() {
                    Err(Error::NotFound(format!("Offer {} not found", offer.id)))
                } else {
                    Err(Error::ConcurrentUpdate)
                }
            }
        }
    }

    async fn pending_expiring_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<JobOffer>> {
        let sql = format!(
            "SELECT {OFFER_COLS} FROM job_offers \
             WHERE status = 'pending' AND expires_at <= $1 \
             ORDER BY expires_at"
        );
        let rows: Vec<OfferRow> = sqlx::query_as(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(JobOffer::try_from).collect()
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, role, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            None => Ok(None),
            Some(row) => Ok(Some(User {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                role: row.try_get("role")?,
                is_active: row.try_get("is_active")?,
                created_at: row.try_get("created_at")?,
            })),
        }
    }

    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let rows = sqlx::query("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        let mut names = HashMap::new();
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            let name: String = row.try_get("name")?;
            names.insert(id, name);
        }
        Ok(names)
    }
}
