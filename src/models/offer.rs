use crate::error::Error;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Countered,
    Expired,
    Withdrawn,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Countered => "countered",
            OfferStatus::Expired => "expired",
            OfferStatus::Withdrawn => "withdrawn",
        }
    }

    /// An active offer blocks extending another one for the same application.
    pub fn is_active(&self) -> bool {
        matches!(self, OfferStatus::Pending | OfferStatus::Accepted)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Pending | OfferStatus::Countered)
    }

    pub fn can_transition_to(&self, to: OfferStatus) -> bool {
        match self {
            OfferStatus::Pending => matches!(
                to,
                OfferStatus::Accepted
                    | OfferStatus::Rejected
                    | OfferStatus::Countered
                    | OfferStatus::Expired
                    | OfferStatus::Withdrawn
            ),
            OfferStatus::Countered => matches!(
                to,
                OfferStatus::Pending
                    | OfferStatus::Accepted
                    | OfferStatus::Rejected
                    | OfferStatus::Withdrawn
            ),
            _ => false,
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OfferStatus::Pending),
            "accepted" => Ok(OfferStatus::Accepted),
            "rejected" => Ok(OfferStatus::Rejected),
            "countered" => Ok(OfferStatus::Countered),
            "expired" => Ok(OfferStatus::Expired),
            "withdrawn" => Ok(OfferStatus::Withdrawn),
            other => Err(Error::Validation(format!("Unknown offer status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOffer {
    pub id: Uuid,
    pub application_id: Uuid,
    pub offered_salary: Decimal,
    pub expires_at: DateTime<Utc>,
    pub status: OfferStatus,
    pub counter_amount: Option<Decimal>,
    pub counter_notes: Option<String>,
    /// Set exactly once, on the first candidate-driven transition.
    pub response_date: Option<DateTime<Utc>>,
    pub extended_by: Uuid,
    pub extended_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobOffer {
    /// Stamps the response date if it has never been set.
    pub fn record_response(&mut self, now: DateTime<Utc>) {
        if self.response_date.is_none() {
            self.response_date = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_and_countered_edges() {
        assert!(OfferStatus::Pending.can_transition_to(OfferStatus::Countered));
        assert!(OfferStatus::Pending.can_transition_to(OfferStatus::Expired));
        assert!(OfferStatus::Countered.can_transition_to(OfferStatus::Pending));
        assert!(OfferStatus::Countered.can_transition_to(OfferStatus::Accepted));
        assert!(!OfferStatus::Countered.can_transition_to(OfferStatus::Expired));
    }

    #[test]
    fn settled_offers_are_sinks() {
        for terminal in [
            OfferStatus::Accepted,
            OfferStatus::Rejected,
            OfferStatus::Expired,
            OfferStatus::Withdrawn,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(OfferStatus::Pending));
        }
    }

    #[test]
    fn active_means_pending_or_accepted() {
        assert!(OfferStatus::Pending.is_active());
        assert!(OfferStatus::Accepted.is_active());
        assert!(!OfferStatus::Countered.is_active());
        assert!(!OfferStatus::Expired.is_active());
    }
}
