#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use hiring_backend::config::SchedulingConfig;
use hiring_backend::models::application::{ApplicationStatus, JobApplication};
use hiring_backend::models::user::User;
use hiring_backend::services::notification_service::NoopNotifier;
use hiring_backend::store::memory::MemoryStore;
use hiring_backend::utils::time::ManualClock;
use hiring_backend::AppState;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn test_app(now: DateTime<Utc>) -> TestApp {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now));
    let state = AppState::with_ports(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(NoopNotifier),
        clock.clone(),
        SchedulingConfig::default(),
    );
    TestApp {
        state,
        store,
        clock,
    }
}

pub fn seed_user(store: &MemoryStore, name: &str, now: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    store.add_user(User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        role: "interviewer".to_string(),
        is_active: true,
        created_at: now,
    });
    id
}

pub fn seed_application(
    store: &MemoryStore,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> JobApplication {
    let application = JobApplication {
        id: Uuid::new_v4(),
        candidate_id: Uuid::new_v4(),
        job_id: Uuid::new_v4(),
        status,
        applied_at: now,
        recruiter_id: None,
        test_score: None,
        rejection_reason: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.add_application(application.clone());
    application
}
