//! Shared fixtures for dispatch tests.
//!
//! This module provides a fully wired in-memory lifecycle plus a valid trip
//! request, to reduce duplication across test files.

use std::sync::Arc;

use crate::broadcast::OrderEvents;
use crate::directory::InMemoryDirectory;
use crate::dispatch::RideLifecycle;
use crate::model::{Place, TripRequest};
use crate::spatial;
use crate::store::{HistoryStore, RideStore};

/// Passenger registered by `test_lifecycle`.
pub const TEST_PASSENGER: u64 = 1;

/// Driver registered by `test_lifecycle`.
pub const TEST_DRIVER: u64 = 10;

/// A lifecycle wired to in-memory stores, with direct handles to each part.
pub struct DispatchFixture {
    pub lifecycle: RideLifecycle,
    pub rides: Arc<RideStore>,
    pub history: Arc<HistoryStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub events: Arc<OrderEvents>,
}

/// Build a lifecycle over fresh in-memory stores with `TEST_PASSENGER` and
/// `TEST_DRIVER` already registered.
pub async fn test_lifecycle() -> DispatchFixture {
    let rides = Arc::new(RideStore::new());
    let history = Arc::new(HistoryStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    directory.register_passenger(TEST_PASSENGER).await;
    directory.register_driver(TEST_DRIVER).await;
    let events = Arc::new(OrderEvents::new());
    let lifecycle = RideLifecycle::new(
        rides.clone(),
        history.clone(),
        directory.clone(),
        events.clone(),
    );
    DispatchFixture {
        lifecycle,
        rides,
        history,
        directory,
        events,
    }
}

pub fn test_pickup() -> Place {
    Place {
        label: "Central Station".to_string(),
        latitude: 53.1428,
        longitude: 90.4167,
    }
}

pub fn test_dropoff() -> Place {
    Place {
        label: "Airport".to_string(),
        latitude: 53.0901,
        longitude: 90.5333,
    }
}

/// A valid trip request between the fixture pickup and dropoff. The distance
/// is the straight-line distance between them.
pub fn test_trip_request(passenger_id: u64) -> TripRequest {
    let pickup = test_pickup();
    let dropoff = test_dropoff();
    let from = spatial::coordinate(pickup.latitude, pickup.longitude)
        .expect("fixture pickup should be valid");
    let to = spatial::coordinate(dropoff.latitude, dropoff.longitude)
        .expect("fixture dropoff should be valid");
    let distance_km = spatial::distance_km_between(from, to);
    TripRequest {
        passenger_id,
        pickup,
        dropoff,
        price: 250.0,
        distance_km,
        payment_method: "cash".to_string(),
    }
}
