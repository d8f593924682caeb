use crate::error::{Error, Result};
use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub notification_webhook_url: Option<String>,
    pub notification_webhook_secret: Option<String>,
    pub working_day_start: NaiveTime,
    pub working_day_end: NaiveTime,
    pub slot_granularity_minutes: i32,
    pub max_interview_minutes: i32,
    pub availability_range_days: i64,
    pub offer_sweep_interval_secs: u64,
    pub reminder_lead_minutes: i64,
}

/// Scheduling knobs handed to the services at construction, so the core
/// never reads global state.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub working_day_start: NaiveTime,
    pub working_day_end: NaiveTime,
    pub slot_granularity_minutes: i32,
    pub max_interview_minutes: i32,
    pub availability_range_days: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_day_start: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            working_day_end: NaiveTime::from_hms_opt(18, 0, 0).expect("valid time"),
            slot_granularity_minutes: 30,
            max_interview_minutes: 480,
            availability_range_days: 60,
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL").ok(),
            notification_webhook_secret: env::var("NOTIFICATION_WEBHOOK_SECRET").ok(),
            working_day_start: get_env_or("WORKING_DAY_START", "09:00:00")?,
            working_day_end: get_env_or("WORKING_DAY_END", "18:00:00")?,
            slot_granularity_minutes: get_env_or("SLOT_GRANULARITY_MINUTES", "30")?,
            max_interview_minutes: get_env_or("MAX_INTERVIEW_MINUTES", "480")?,
            availability_range_days: get_env_or("AVAILABILITY_RANGE_DAYS", "60")?,
            offer_sweep_interval_secs: get_env_or("OFFER_SWEEP_INTERVAL_SECS", "300")?,
            reminder_lead_minutes: get_env_or("REMINDER_LEAD_MINUTES", "60")?,
        })
    }

    pub fn scheduling(&self) -> SchedulingConfig {
        SchedulingConfig {
            working_day_start: self.working_day_start,
            working_day_end: self.working_day_end,
            slot_granularity_minutes: self.slot_granularity_minutes,
            max_interview_minutes: self.max_interview_minutes,
            availability_range_days: self.availability_range_days,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or<T>(name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
