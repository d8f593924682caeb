use crate::config::SchedulingConfig;
use crate::dto::scheduling_dto::{AvailabilityQuery, SlotParticipant, SlotWindow, TimeSlot};
use crate::error::{Error, Result};
use crate::services::conflict_service::{report_against, FETCH_MARGIN_MINUTES};
use crate::store::{InterviewStore, UserStore};
use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Generates candidate slots over a date range and scores each against the
/// participants' existing bookings. Pure read path: one batched fetch for
/// the whole range, then in-memory evaluation per slot.
#[derive(Clone)]
pub struct AvailabilityService {
    interviews: Arc<dyn InterviewStore>,
    users: Arc<dyn UserStore>,
    scheduling: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(
        interviews: Arc<dyn InterviewStore>,
        users: Arc<dyn UserStore>,
        scheduling: SchedulingConfig,
    ) -> Self {
        Self {
            interviews,
            users,
            scheduling,
        }
    }

    pub async fn available_slots(
        &self,
        requesting_user: Uuid,
        query: &AvailabilityQuery,
    ) -> Result<Vec<TimeSlot>> {
        query.validate()?;
        if query.end_date < query.start_date {
            return Err(Error::Validation(
                "End date must not precede start date".to_string(),
            ));
        }
        if query.duration_minutes > self.scheduling.max_interview_minutes {
            return Err(Error::Validation(format!(
                "Duration must not exceed {} minutes",
                self.scheduling.max_interview_minutes
            )));
        }
        let span_days = (query.end_date - query.start_date).num_days() + 1;
        if span_days > self.scheduling.availability_range_days {
            return Err(Error::Validation(format!(
                "Date range must not exceed {} days",
                self.scheduling.availability_range_days
            )));
        }

        let mut participants: Vec<Uuid> = Vec::new();
        for id in &query.participant_ids {
            if !participants.contains(id) {
                participants.push(*id);
            }
        }
        if participants.is_empty() {
            participants.push(requesting_user);
        }

        let duration = Duration::minutes(query.duration_minutes as i64);
        let range_start =
            NaiveDateTime::new(query.start_date, self.scheduling.working_day_start).and_utc();
        let range_end =
            NaiveDateTime::new(query.end_date, self.scheduling.working_day_end).and_utc();
        let margin = Duration::minutes(FETCH_MARGIN_MINUTES);

        let booked = self
            .interviews
            .booked_in_window(
                &participants,
                range_start - margin,
                range_end + margin,
                None,
                query.exclude_application_id,
            )
            .await?;
        let names = self.users.display_names(&participants).await?;

        let granularity = Duration::minutes(self.scheduling.slot_granularity_minutes as i64);
        let mut slots = Vec::new();
        let mut day = query.start_date;
        loop {
            let day_start = NaiveDateTime::new(day, self.scheduling.working_day_start).and_utc();
            let day_end = NaiveDateTime::new(day, self.scheduling.working_day_end).and_utc();
            let mut slot_start = day_start;
            while slot_start + duration <= day_end {
                let slot_end = slot_start + duration;
                let report = report_against(&booked, &participants, slot_start, slot_end);
                slots.push(TimeSlot {
                    window: SlotWindow {
                        start: slot_start,
                        end: slot_end,
                    },
                    available: to_slot_participants(&report.free, &names),
                    unavailable: to_slot_participants(&report.busy, &names),
                    recommended: report.all_free(),
                });
                slot_start = slot_start + granularity;
            }
            if day >= query.end_date {
                break;
            }
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }

        Ok(slots)
    }
}

fn to_slot_participants(ids: &[Uuid], names: &HashMap<Uuid, String>) -> Vec<SlotParticipant> {
    ids.iter()
        .map(|id| SlotParticipant {
            user_id: *id,
            display_name: names.get(id).cloned().unwrap_or_else(|| id.to_string()),
        })
        .collect()
}
