mod common;

use common::{seed_application, seed_user, test_app, utc, TestApp};
use hiring_backend::dto::evaluation_dto::SubmitEvaluationRequest;
use hiring_backend::dto::scheduling_dto::{ParticipantRequest, ScheduleInterviewRequest};
use hiring_backend::error::Error;
use hiring_backend::models::application::ApplicationStatus;
use hiring_backend::models::evaluation::Recommendation;
use hiring_backend::models::interview::{
    InterviewMode, InterviewOutcome, InterviewType, ParticipantRole,
};
use hiring_backend::utils::time::Clock;
use uuid::Uuid;

async fn scheduled_interview(
    app: &TestApp,
    participants: Vec<(Uuid, ParticipantRole)>,
) -> Uuid {
    let now = app.clock.now();
    let scheduler = seed_user(&app.store, "Scheduler", now);
    let application = seed_application(&app.store, ApplicationStatus::Interview, now);
    let interview = app
        .state
        .interview_service
        .schedule(&ScheduleInterviewRequest {
            application_id: application.id,
            title: "Panel interview".to_string(),
            interview_type: InterviewType::Technical,
            round: 1,
            scheduled_at: now + chrono::Duration::days(1),
            duration_minutes: 60,
            mode: InterviewMode::Online,
            meeting_details: None,
            instructions: None,
            scheduled_by: scheduler,
            participants: participants
                .into_iter()
                .map(|(user_id, role)| ParticipantRequest {
                    user_id,
                    role,
                    is_lead: false,
                })
                .collect(),
        })
        .await
        .expect("interview should schedule");
    interview.id
}

fn evaluation(rating: Option<i32>, recommendation: Recommendation) -> SubmitEvaluationRequest {
    SubmitEvaluationRequest {
        overall_rating: rating,
        strengths: Some("Clear communicator".to_string()),
        concerns: None,
        comments: None,
        recommendation,
    }
}

#[tokio::test]
async fn outcome_waits_for_role_required_evaluations_only() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let y = seed_user(&app.store, "Yuri", now);
    let interview_id = scheduled_interview(
        &app,
        vec![
            (x, ParticipantRole::Interviewer),
            (y, ParticipantRole::Observer),
        ],
    )
    .await;
    let actor = seed_user(&app.store, "Hiring Manager", now);

    // nothing submitted yet: outcome is gated
    let err = app
        .state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Pass, actor)
        .await
        .expect_err("outcome before evaluations must fail");
    assert!(matches!(err, Error::IllegalTransition { .. }));
    assert!(!app
        .state
        .evaluation_service
        .is_complete(interview_id)
        .await
        .unwrap());

    // the observer owes nothing; the interviewer's evaluation completes it
    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(4), Recommendation::Pass))
        .await
        .unwrap();
    assert!(app
        .state
        .evaluation_service
        .is_complete(interview_id)
        .await
        .unwrap());

    let updated = app
        .state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Pass, actor)
        .await
        .expect("outcome after completeness succeeds");
    assert_eq!(updated.outcome, Some(InterviewOutcome::Pass));
}

#[tokio::test]
async fn every_required_interviewer_gates_the_outcome() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let y = seed_user(&app.store, "Yuri", now);
    let interview_id = scheduled_interview(
        &app,
        vec![
            (x, ParticipantRole::PrimaryInterviewer),
            (y, ParticipantRole::Interviewer),
        ],
    )
    .await;
    let actor = seed_user(&app.store, "Hiring Manager", now);

    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(5), Recommendation::Pass))
        .await
        .unwrap();

    let err = app
        .state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Pass, actor)
        .await
        .expect_err("one of two required evaluations is missing");
    assert!(matches!(err, Error::IllegalTransition { .. }));

    app.state
        .evaluation_service
        .submit(interview_id, y, &evaluation(Some(3), Recommendation::Maybe))
        .await
        .unwrap();
    app.state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Pass, actor)
        .await
        .expect("all required evaluations in");
}

#[tokio::test]
async fn one_evaluation_per_evaluator() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let interview_id =
        scheduled_interview(&app, vec![(x, ParticipantRole::Interviewer)]).await;

    assert!(app
        .state
        .evaluation_service
        .can_evaluate(interview_id, x)
        .await
        .unwrap());

    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(4), Recommendation::Pass))
        .await
        .unwrap();

    assert!(!app
        .state
        .evaluation_service
        .can_evaluate(interview_id, x)
        .await
        .unwrap());

    let err = app
        .state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(5), Recommendation::Pass))
        .await
        .expect_err("second submission by the same evaluator");
    assert!(matches!(err, Error::Uniqueness(_)));
}

#[tokio::test]
async fn outsiders_cannot_evaluate() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let outsider = seed_user(&app.store, "Oskar", now);
    let interview_id =
        scheduled_interview(&app, vec![(x, ParticipantRole::Interviewer)]).await;

    assert!(!app
        .state
        .evaluation_service
        .can_evaluate(interview_id, outsider)
        .await
        .unwrap());

    let err = app
        .state
        .evaluation_service
        .submit(
            interview_id,
            outsider,
            &evaluation(Some(2), Recommendation::Fail),
        )
        .await
        .expect_err("non-participants cannot evaluate");
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn summary_aggregates_ratings_and_recommendations() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let y = seed_user(&app.store, "Yuri", now);
    let z = seed_user(&app.store, "Zoe", now);
    let interview_id = scheduled_interview(
        &app,
        vec![
            (x, ParticipantRole::PrimaryInterviewer),
            (y, ParticipantRole::Interviewer),
            (z, ParticipantRole::Interviewer),
        ],
    )
    .await;

    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(4), Recommendation::Pass))
        .await
        .unwrap();
    app.state
        .evaluation_service
        .submit(interview_id, y, &evaluation(Some(5), Recommendation::Pass))
        .await
        .unwrap();
    app.state
        .evaluation_service
        .submit(interview_id, z, &evaluation(Some(3), Recommendation::Fail))
        .await
        .unwrap();

    let summary = app
        .state
        .evaluation_service
        .summary(interview_id)
        .await
        .unwrap();
    assert_eq!(summary.average_rating, 4.0);
    assert_eq!(summary.pass_count, 2);
    assert_eq!(summary.fail_count, 1);
    assert_eq!(summary.maybe_count, 0);
    assert!(summary.is_complete);
    assert_eq!(summary.recommendation, Some(Recommendation::Pass));
    assert_eq!(summary.evaluations.len(), 3);
}

#[tokio::test]
async fn split_panels_give_no_definitive_recommendation() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let y = seed_user(&app.store, "Yuri", now);
    let interview_id = scheduled_interview(
        &app,
        vec![
            (x, ParticipantRole::Interviewer),
            (y, ParticipantRole::Interviewer),
        ],
    )
    .await;

    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(None, Recommendation::Pass))
        .await
        .unwrap();
    app.state
        .evaluation_service
        .submit(interview_id, y, &evaluation(None, Recommendation::Fail))
        .await
        .unwrap();

    assert_eq!(
        app.state
            .evaluation_service
            .overall_recommendation(interview_id)
            .await
            .unwrap(),
        None
    );
    // no ratings were attached at all
    assert_eq!(
        app.state
            .evaluation_service
            .average_rating(interview_id)
            .await
            .unwrap(),
        0.0
    );
}

#[tokio::test]
async fn revision_is_open_until_the_outcome_is_finalized() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let interview_id =
        scheduled_interview(&app, vec![(x, ParticipantRole::Interviewer)]).await;
    let actor = seed_user(&app.store, "Hiring Manager", now);

    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(3), Recommendation::Maybe))
        .await
        .unwrap();

    let revised = app
        .state
        .evaluation_service
        .revise(interview_id, x, &evaluation(Some(4), Recommendation::Pass))
        .await
        .expect("revision before the outcome lands");
    assert_eq!(revised.overall_rating, Some(4));
    assert_eq!(revised.recommendation, Recommendation::Pass);

    app.state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Pass, actor)
        .await
        .unwrap();

    let err = app
        .state
        .evaluation_service
        .revise(interview_id, x, &evaluation(Some(1), Recommendation::Fail))
        .await
        .expect_err("finalized outcomes freeze the evaluations");
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let interview_id =
        scheduled_interview(&app, vec![(x, ParticipantRole::Interviewer)]).await;

    for rating in [0, 6] {
        let err = app
            .state
            .evaluation_service
            .submit(
                interview_id,
                x,
                &evaluation(Some(rating), Recommendation::Pass),
            )
            .await
            .expect_err("rating outside 1-5");
        assert!(matches!(err, Error::InvalidPayload(_)));
    }
}

#[tokio::test]
async fn finalized_outcomes_are_not_overwritten() {
    let now = utc(2024, 3, 1, 9, 0);
    let app = test_app(now);
    let x = seed_user(&app.store, "Xenia", now);
    let interview_id =
        scheduled_interview(&app, vec![(x, ParticipantRole::Interviewer)]).await;
    let actor = seed_user(&app.store, "Hiring Manager", now);

    app.state
        .evaluation_service
        .submit(interview_id, x, &evaluation(Some(4), Recommendation::Pass))
        .await
        .unwrap();
    app.state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Pass, actor)
        .await
        .unwrap();

    let err = app
        .state
        .interview_service
        .set_outcome(interview_id, InterviewOutcome::Fail, actor)
        .await
        .expect_err("Pass is final");
    assert!(matches!(err, Error::IllegalTransition { .. }));
}
