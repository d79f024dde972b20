use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RideId = u64;
pub type PassengerId = u64;
pub type DriverId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    /// Parse a client-supplied payment method string, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideStatus {
    Searching,
    Waiting,
    Approaching,
    InTransit,
}

impl RideStatus {
    /// Whether the status belongs to the in-progress set a driver may move
    /// a ride through. `Searching` is only ever set at creation.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            RideStatus::Waiting | RideStatus::Approaching | RideStatus::InTransit
        )
    }
}

/// A named point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An active trip request moving through the dispatch lifecycle.
///
/// `driver_id` is set at most once, by acceptance; it never transitions back
/// to `None` and is never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    pub passenger_id: PassengerId,
    pub driver_id: Option<DriverId>,
    pub pickup: Place,
    pub dropoff: Place,
    /// Agreed trip price in currency units; non-negative.
    pub price: f64,
    pub distance_km: f64,
    pub payment_method: PaymentMethod,
    pub status: RideStatus,
    pub requested_at: DateTime<Utc>,
}

/// Archival record of a completed ride. Produced only by order completion,
/// destroyed only by the retention sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideHistory {
    pub id: u64,
    pub passenger_id: PassengerId,
    pub driver_id: Option<DriverId>,
    pub pickup: Place,
    pub dropoff: Place,
    pub price: f64,
    pub distance_km: f64,
    pub payment_method: PaymentMethod,
    pub completed_at: DateTime<Utc>,
}

/// Client payload for creating a ride. The payment method arrives as a
/// string and is validated during creation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripRequest {
    pub passenger_id: PassengerId,
    pub pickup: Place,
    pub dropoff: Place,
    pub price: f64,
    pub distance_km: f64,
    pub payment_method: String,
}

/// Which side of a trip a history query is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRole {
    Passenger,
    Driver,
}

impl HistoryRole {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("passenger") {
            Some(HistoryRole::Passenger)
        } else if raw.eq_ignore_ascii_case("driver") {
            Some(HistoryRole::Driver)
        } else {
            None
        }
    }
}

/// Event pushed to a ride's subscriber group on every state change.
///
/// `status` is `None` for the identifier-only signals (cancellation and
/// completion), where the ride no longer has a status to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderEvent {
    pub order_id: RideId,
    pub status: Option<RideStatus>,
}
