mod common;

use chrono::Duration;
use common::{seed_application, seed_user, test_app, utc};
use hiring_backend::dto::workflow_dto::{
    CounterOfferRequest, ExtendOfferRequest, RespondToCounterRequest,
};
use hiring_backend::error::Error;
use hiring_backend::models::application::ApplicationStatus;
use hiring_backend::models::offer::OfferStatus;
use hiring_backend::utils::time::Clock;
use rust_decimal::Decimal;
use uuid::Uuid;

fn extend_request(
    application_id: Uuid,
    extended_by: Uuid,
    salary: i64,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> ExtendOfferRequest {
    ExtendOfferRequest {
        application_id,
        offered_salary: Decimal::from(salary),
        expires_at,
        extended_by,
    }
}

#[tokio::test]
async fn one_active_offer_per_application() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let expiry = now + Duration::days(7);

    let offer = app
        .state
        .offer_service
        .extend(&extend_request(application.id, recruiter, 95_000, expiry))
        .await
        .expect("first offer extends");
    assert_eq!(offer.status, OfferStatus::Pending);
    assert!(offer.response_date.is_none());

    let err = app
        .state
        .offer_service
        .extend(&extend_request(application.id, recruiter, 99_000, expiry))
        .await
        .expect_err("a second offer while one is pending");
    assert!(matches!(err, Error::Uniqueness(_)));

    // once the first is rejected, a fresh offer may go out
    app.state.offer_service.reject(offer.id).await.unwrap();
    app.state
        .offer_service
        .extend(&extend_request(application.id, recruiter, 99_000, expiry))
        .await
        .expect("rejected offers no longer block");
}

#[tokio::test]
async fn accepted_offers_also_block_new_ones() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let expiry = now + Duration::days(7);

    let offer = app
        .state
        .offer_service
        .extend(&extend_request(application.id, recruiter, 95_000, expiry))
        .await
        .unwrap();
    app.state.offer_service.accept(offer.id).await.unwrap();

    let err = app
        .state
        .offer_service
        .extend(&extend_request(application.id, recruiter, 99_000, expiry))
        .await
        .expect_err("an accepted offer is still active");
    assert!(matches!(err, Error::Uniqueness(_)));
}

#[tokio::test]
async fn response_date_is_stamped_once() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let expiry = now + Duration::days(7);

    let offer = app
        .state
        .offer_service
        .extend(&extend_request(application.id, recruiter, 95_000, expiry))
        .await
        .unwrap();

    // candidate counters the next day
    app.clock.advance(Duration::days(1));
    let countered = app
        .state
        .offer_service
        .counter(
            offer.id,
            &CounterOfferRequest {
                counter_amount: Decimal::from(105_000),
                counter_notes: Some("Competing offer in hand".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(countered.status, OfferStatus::Countered);
    let first_response = countered.response_date.expect("response date set");
    assert_eq!(first_response, utc(2024, 4, 2, 9, 0));

    // employer re-offers revised terms, candidate accepts two days later;
    // the original response date must not move
    app.clock.advance(Duration::days(1));
    let reoffered = app
        .state
        .offer_service
        .respond_to_counter(
            offer.id,
            &RespondToCounterRequest {
                accepted: false,
                revised_salary: Some(Decimal::from(100_000)),
                response: Some("Meeting you halfway".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(reoffered.status, OfferStatus::Pending);
    assert_eq!(reoffered.offered_salary, Decimal::from(100_000));

    app.clock.advance(Duration::days(1));
    let accepted = app.state.offer_service.accept(offer.id).await.unwrap();
    assert_eq!(accepted.status, OfferStatus::Accepted);
    assert_eq!(accepted.response_date, Some(first_response));
}

#[tokio::test]
async fn accepting_a_counter_settles_at_the_counter_amount() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);

    let offer = app
        .state
        .offer_service
        .extend(&extend_request(
            application.id,
            recruiter,
            95_000,
            now + Duration::days(7),
        ))
        .await
        .unwrap();
    app.state
        .offer_service
        .counter(
            offer.id,
            &CounterOfferRequest {
                counter_amount: Decimal::from(105_000),
                counter_notes: None,
            },
        )
        .await
        .unwrap();

    let settled = app
        .state
        .offer_service
        .respond_to_counter(
            offer.id,
            &RespondToCounterRequest {
                accepted: true,
                revised_salary: None,
                response: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(settled.status, OfferStatus::Accepted);
    assert_eq!(settled.offered_salary, Decimal::from(105_000));
}

#[tokio::test]
async fn declining_a_counter_without_revision_rejects_the_offer() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);

    let offer = app
        .state
        .offer_service
        .extend(&extend_request(
            application.id,
            recruiter,
            95_000,
            now + Duration::days(7),
        ))
        .await
        .unwrap();
    app.state
        .offer_service
        .counter(
            offer.id,
            &CounterOfferRequest {
                counter_amount: Decimal::from(140_000),
                counter_notes: None,
            },
        )
        .await
        .unwrap();

    let closed = app
        .state
        .offer_service
        .respond_to_counter(
            offer.id,
            &RespondToCounterRequest {
                accepted: false,
                revised_salary: None,
                response: Some("Too far above the band".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(closed.status, OfferStatus::Rejected);

    // negotiation is over
    let err = app
        .state
        .offer_service
        .respond_to_counter(
            offer.id,
            &RespondToCounterRequest {
                accepted: true,
                revised_salary: None,
                response: None,
            },
        )
        .await
        .expect_err("rejected offers cannot be re-answered");
    assert!(matches!(err, Error::IllegalTransition { .. }));
}

#[tokio::test]
async fn candidate_operations_require_a_pending_offer() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);

    let offer = app
        .state
        .offer_service
        .extend(&extend_request(
            application.id,
            recruiter,
            95_000,
            now + Duration::days(7),
        ))
        .await
        .unwrap();
    app.state.offer_service.accept(offer.id).await.unwrap();

    let err = app
        .state
        .offer_service
        .accept(offer.id)
        .await
        .expect_err("double accept");
    assert!(matches!(err, Error::IllegalTransition { .. }));

    let err = app
        .state
        .offer_service
        .counter(
            offer.id,
            &CounterOfferRequest {
                counter_amount: Decimal::from(100_000),
                counter_notes: None,
            },
        )
        .await
        .expect_err("countering an accepted offer");
    assert!(matches!(err, Error::IllegalTransition { .. }));
}

#[tokio::test]
async fn expiry_sweep_moves_only_past_due_pending_offers() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);

    let first_application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let expiring = app
        .state
        .offer_service
        .extend(&extend_request(
            first_application.id,
            recruiter,
            90_000,
            now + Duration::days(3),
        ))
        .await
        .unwrap();

    let second_application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let long_lived = app
        .state
        .offer_service
        .extend(&extend_request(
            second_application.id,
            recruiter,
            92_000,
            now + Duration::days(30),
        ))
        .await
        .unwrap();

    // premature expiry is refused through the same gate the sweep uses
    let err = app
        .state
        .offer_service
        .mark_expired(expiring.id)
        .await
        .expect_err("not yet past due");
    assert!(matches!(err, Error::Validation(_)));

    app.clock.advance(Duration::days(4));
    let swept = app.state.offer_service.sweep_expired().await.unwrap();
    assert_eq!(swept, 1);

    let expired = app
        .state
        .offer_service
        .get(expiring.id)
        .await
        .unwrap();
    assert_eq!(expired.status, OfferStatus::Expired);
    let untouched = app
        .state
        .offer_service
        .get(long_lived.id)
        .await
        .unwrap();
    assert_eq!(untouched.status, OfferStatus::Pending);

    // idempotent: nothing left to sweep
    let swept = app.state.offer_service.sweep_expired().await.unwrap();
    assert_eq!(swept, 0);

    // an expired offer no longer blocks a replacement
    app.state
        .offer_service
        .extend(&extend_request(
            first_application.id,
            recruiter,
            94_000,
            app.clock.now() + Duration::days(7),
        ))
        .await
        .expect("expired offers are not active");
}

#[tokio::test]
async fn extension_validates_salary_expiry_and_application() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);
    let application = seed_application(&app.store, ApplicationStatus::Selected, now);

    let err = app
        .state
        .offer_service
        .extend(&extend_request(
            application.id,
            recruiter,
            0,
            now + Duration::days(7),
        ))
        .await
        .expect_err("zero salary");
    assert!(matches!(err, Error::Validation(_)));

    let err = app
        .state
        .offer_service
        .extend(&extend_request(
            application.id,
            recruiter,
            95_000,
            now - Duration::days(1),
        ))
        .await
        .expect_err("expiry in the past");
    assert!(matches!(err, Error::Validation(_)));

    let err = app
        .state
        .offer_service
        .extend(&extend_request(
            Uuid::new_v4(),
            recruiter,
            95_000,
            now + Duration::days(7),
        ))
        .await
        .expect_err("unknown application");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn withdrawal_exits_pending_and_countered_only() {
    let now = utc(2024, 4, 1, 9, 0);
    let app = test_app(now);
    let recruiter = seed_user(&app.store, "Recruiter", now);

    let first_application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let pending = app
        .state
        .offer_service
        .extend(&extend_request(
            first_application.id,
            recruiter,
            95_000,
            now + Duration::days(7),
        ))
        .await
        .unwrap();
    let withdrawn = app
        .state
        .offer_service
        .withdraw(pending.id, Some("Role closed".to_string()))
        .await
        .unwrap();
    assert_eq!(withdrawn.status, OfferStatus::Withdrawn);

    let second_application = seed_application(&app.store, ApplicationStatus::Selected, now);
    let accepted = app
        .state
        .offer_service
        .extend(&extend_request(
            second_application.id,
            recruiter,
            95_000,
            now + Duration::days(7),
        ))
        .await
        .unwrap();
    app.state.offer_service.accept(accepted.id).await.unwrap();
    let err = app
        .state
        .offer_service
        .withdraw(accepted.id, None)
        .await
        .expect_err("accepted offers cannot be withdrawn through this edge");
    assert!(matches!(err, Error::IllegalTransition { .. }));
}
