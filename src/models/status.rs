//! Status enumerations for donations and pickup requests.
//!
//! Both state machines live here. [`RequestStatus::can_transition_to`] is the
//! request graph, and [`DonationEffect`] records how each request event moves
//! the donation it references. The lifecycle manager only consults these
//! tables; it never compares status strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Availability of a posted donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Visible to search and open for requests
    Available,

    /// Held by exactly one pending or accepted request
    Reserved,

    /// Picked up by the receiver
    Collected,

    /// Passed its expiry while still available
    Expired,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Available => "available",
            DonationStatus::Reserved => "reserved",
            DonationStatus::Collected => "collected",
            DonationStatus::Expired => "expired",
        }
    }

    /// Edges of the donation graph. `collected` and `expired` have no exits.
    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (self, next),
            (Available, Reserved)
                | (Reserved, Available)
                | (Reserved, Collected)
                | (Available, Expired)
        )
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a receiver's claim on a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

/// The donation-side edge that accompanies a request event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationEffect {
    pub from: DonationStatus,
    pub to: DonationStatus,
}

/// Creating a request reserves the donation.
pub const RESERVATION: DonationEffect = DonationEffect {
    from: DonationStatus::Available,
    to: DonationStatus::Reserved,
};

/// Swept donations that were never claimed.
pub const EXPIRY: DonationEffect = DonationEffect {
    from: DonationStatus::Available,
    to: DonationStatus::Expired,
};

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    /// Edges of the request graph. No skipping, no backward moves;
    /// `rejected` and `completed` have no exits.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, Completed)
        )
    }

    /// Donation edge applied in the same transaction when a request enters
    /// `self`. Entering `Pending` is request creation.
    pub fn donation_effect(&self) -> Option<DonationEffect> {
        use DonationStatus::*;
        match self {
            RequestStatus::Pending => Some(RESERVATION),
            RequestStatus::Accepted => None,
            RequestStatus::Rejected => Some(DonationEffect {
                from: Reserved,
                to: Available,
            }),
            RequestStatus::Completed => Some(DonationEffect {
                from: Reserved,
                to: Collected,
            }),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
