//! Consultation bookings and priced proposals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use homegrid_core::pricing::{BomLine, PriceRange};
use homegrid_core::{BookingId, ProposalId, ProposalStatus, UserId};

/// A scheduled consultation slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A priced proposal derived from a booking's bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub user_id: UserId,
    pub booking_id: BookingId,
    pub bom: Vec<BomLine>,
    pub labor_hours_est: Option<f64>,
    pub price_range: PriceRange,
    pub status: ProposalStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a proposal (status starts at DRAFT).
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub user_id: UserId,
    pub booking_id: BookingId,
    pub bom: Vec<BomLine>,
    pub labor_hours_est: Option<f64>,
    pub price_range: PriceRange,
    pub notes: Option<String>,
}
