use crate::error::Result;
use crate::store::{BookedInterview, InterviewStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Padding applied to the fetch window so interviews that start before the
/// queried window but run into it are always picked up. Matches the hard
/// cap on interview duration.
pub const FETCH_MARGIN_MINUTES: i64 = 720;

/// Half-open interval overlap: `[a_start, a_end)` collides with
/// `[b_start, b_end)` iff each starts before the other ends. Back-to-back
/// windows do not collide.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[derive(Debug, Clone)]
pub struct ConflictQuery<'a> {
    pub participant_ids: &'a [Uuid],
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
    /// Excluded when checking a reschedule against the interview's own slot.
    pub exclude_interview: Option<Uuid>,
    pub exclude_application: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ParticipantConflict {
    pub user_id: Uuid,
    pub interview_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Per-participant availability verdict for one proposed window.
#[derive(Debug, Clone)]
pub struct ConflictReport {
    pub free: Vec<Uuid>,
    pub busy: Vec<Uuid>,
    pub conflicts: Vec<ParticipantConflict>,
}

impl ConflictReport {
    pub fn all_free(&self) -> bool {
        self.busy.is_empty()
    }
}

/// Read-only collision detector over Scheduled interviews. Deterministic
/// and side-effect free; Cancelled/Completed/NoShow bookings never block.
#[derive(Clone)]
pub struct ConflictService {
    interviews: Arc<dyn InterviewStore>,
}

impl ConflictService {
    pub fn new(interviews: Arc<dyn InterviewStore>) -> Self {
        Self { interviews }
    }

    pub async fn check(&self, query: &ConflictQuery<'_>) -> Result<ConflictReport> {
        let start = query.start;
        let end = start + Duration::minutes(query.duration_minutes as i64);
        let margin = Duration::minutes(FETCH_MARGIN_MINUTES);
        let booked = self
            .interviews
            .booked_in_window(
                query.participant_ids,
                start - margin,
                end + margin,
                query.exclude_interview,
                query.exclude_application,
            )
            .await?;
        Ok(report_against(&booked, query.participant_ids, start, end))
    }
}

/// Evaluates one window against an already-fetched booking set. The
/// availability engine calls this per candidate slot so the whole grid
/// costs a single fetch.
pub fn report_against(
    booked: &[BookedInterview],
    participant_ids: &[Uuid],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ConflictReport {
    let mut free = Vec::new();
    let mut busy = Vec::new();
    let mut conflicts = Vec::new();

    for &user_id in participant_ids {
        if free.contains(&user_id) || busy.contains(&user_id) {
            continue;
        }
        let mut collides = false;
        for booking in booked {
            if !booking.participant_ids.contains(&user_id) {
                continue;
            }
            let b_start = booking.interview.scheduled_at;
            let b_end = booking.interview.end_at();
            if overlaps(b_start, b_end, start, end) {
                collides = true;
                conflicts.push(ParticipantConflict {
                    user_id,
                    interview_id: booking.interview.id,
                    start: b_start,
                    end: b_end,
                });
            }
        }
        if collides {
            busy.push(user_id);
        } else {
            free.push(user_id);
        }
    }

    ConflictReport {
        free,
        busy,
        conflicts,
    }
}
