pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::SchedulingConfig;
use crate::services::{
    application_service::ApplicationService, availability_service::AvailabilityService,
    conflict_service::ConflictService, evaluation_service::EvaluationService,
    interview_service::InterviewService, notification_service::NoopNotifier,
    notification_service::Notifier, notification_service::WebhookNotifier,
    offer_service::OfferService,
};
use crate::store::postgres::PgStore;
use crate::store::{ApplicationStore, EvaluationStore, InterviewStore, OfferStore, UserStore};
use crate::utils::time::{Clock, SystemClock};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub conflict_service: ConflictService,
    pub availability_service: AvailabilityService,
    pub evaluation_service: EvaluationService,
    pub interview_service: InterviewService,
    pub application_service: ApplicationService,
    pub offer_service: OfferService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let store = Arc::new(PgStore::new(pool));
        let notifier: Arc<dyn Notifier> = match &config.notification_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(
                url.clone(),
                config.notification_webhook_secret.clone(),
            )),
            None => Arc::new(NoopNotifier),
        };
        Self::with_ports(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            notifier,
            Arc::new(SystemClock),
            config.scheduling(),
        )
    }

    /// Wires the services over explicit ports. Tests hand in the in-memory
    /// store and a manual clock here.
    #[allow(clippy::too_many_arguments)]
    pub fn with_ports(
        interviews: Arc<dyn InterviewStore>,
        applications: Arc<dyn ApplicationStore>,
        evaluations: Arc<dyn EvaluationStore>,
        offers: Arc<dyn OfferStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        scheduling: SchedulingConfig,
    ) -> Self {
        let conflict_service = ConflictService::new(interviews.clone());
        let availability_service =
            AvailabilityService::new(interviews.clone(), users, scheduling.clone());
        let evaluation_service =
            EvaluationService::new(interviews.clone(), evaluations, clock.clone());
        let interview_service = InterviewService::new(
            interviews,
            applications.clone(),
            conflict_service.clone(),
            evaluation_service.clone(),
            notifier.clone(),
            clock.clone(),
            scheduling,
        );
        let application_service =
            ApplicationService::new(applications.clone(), notifier.clone(), clock.clone());
        let offer_service = OfferService::new(offers, applications, notifier, clock);

        Self {
            conflict_service,
            availability_service,
            evaluation_service,
            interview_service,
            application_service,
            offer_service,
        }
    }
}
