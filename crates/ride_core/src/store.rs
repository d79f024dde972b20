//! In-memory storage handles for active rides and archival history.
//!
//! Every request handler receives an explicit handle; nothing here is
//! process-global. Mutations are single read-modify-write sections under the
//! store's write lock, and no lock is held across external awaits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::DispatchError;
use crate::model::{DriverId, HistoryRole, PassengerId, Ride, RideHistory, RideId, RideStatus};

/// Active-ride store. Rides live here from creation until cancellation or
/// completion removes them.
#[derive(Debug)]
pub struct RideStore {
    rides: RwLock<HashMap<RideId, Ride>>,
    next_id: AtomicU64,
}

impl RideStore {
    pub fn new() -> Self {
        Self {
            rides: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Persist a new ride, assigning its identifier.
    pub async fn insert(&self, mut ride: Ride) -> Ride {
        ride.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rides.write().await.insert(ride.id, ride.clone());
        ride
    }

    pub async fn get(&self, order_id: RideId) -> Option<Ride> {
        self.rides.read().await.get(&order_id).cloned()
    }

    /// Assign a driver to a ride only if it currently has none.
    ///
    /// The check and the write happen under one write guard, so at most one
    /// of any number of concurrent callers can observe `driver_id == None`.
    /// On success the ride moves to `Waiting`.
    pub async fn assign_driver(
        &self,
        order_id: RideId,
        driver_id: DriverId,
    ) -> Result<Ride, DispatchError> {
        let mut rides = self.rides.write().await;
        let ride = rides
            .get_mut(&order_id)
            .ok_or(DispatchError::NotFound("order"))?;
        if ride.driver_id.is_some() {
            return Err(DispatchError::Conflict("order already accepted by another driver"));
        }
        ride.driver_id = Some(driver_id);
        ride.status = RideStatus::Waiting;
        Ok(ride.clone())
    }

    pub async fn set_status(&self, order_id: RideId, status: RideStatus) -> Option<Ride> {
        let mut rides = self.rides.write().await;
        let ride = rides.get_mut(&order_id)?;
        ride.status = status;
        Some(ride.clone())
    }

    pub async fn add_price(&self, order_id: RideId, amount: f64) -> Option<Ride> {
        let mut rides = self.rides.write().await;
        let ride = rides.get_mut(&order_id)?;
        ride.price += amount;
        Some(ride.clone())
    }

    pub async fn remove(&self, order_id: RideId) -> Option<Ride> {
        self.rides.write().await.remove(&order_id)
    }

    /// Earliest-created ride referencing the passenger, regardless of status.
    pub async fn first_for_passenger(&self, passenger_id: PassengerId) -> Option<Ride> {
        let rides = self.rides.read().await;
        rides
            .values()
            .filter(|ride| ride.passenger_id == passenger_id)
            .min_by_key(|ride| ride.id)
            .cloned()
    }

    /// Earliest-created ride referencing the driver, regardless of status.
    pub async fn first_for_driver(&self, driver_id: DriverId) -> Option<Ride> {
        let rides = self.rides.read().await;
        rides
            .values()
            .filter(|ride| ride.driver_id == Some(driver_id))
            .min_by_key(|ride| ride.id)
            .cloned()
    }

    /// Whether the passenger already has a ride still searching for, or
    /// waiting on, a driver.
    pub async fn has_pending_for_passenger(&self, passenger_id: PassengerId) -> bool {
        let rides = self.rides.read().await;
        rides.values().any(|ride| {
            ride.passenger_id == passenger_id
                && matches!(ride.status, RideStatus::Searching | RideStatus::Waiting)
        })
    }

    /// All rides with no driver assigned, in creation order.
    pub async fn unassigned(&self) -> Vec<Ride> {
        let rides = self.rides.read().await;
        let mut available: Vec<Ride> = rides
            .values()
            .filter(|ride| ride.driver_id.is_none())
            .cloned()
            .collect();
        available.sort_by_key(|ride| ride.id);
        available
    }

    pub async fn len(&self) -> usize {
        self.rides.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rides.read().await.is_empty()
    }
}

impl Default for RideStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Archival store for completed rides. The retention sweeper holds its own
/// handle to this store, independent of request handling.
#[derive(Debug)]
pub struct HistoryStore {
    records: RwLock<Vec<RideHistory>>,
    next_id: AtomicU64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a completion record, assigning its identifier.
    pub async fn append(&self, mut record: RideHistory) -> RideHistory {
        record.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.records.write().await.push(record.clone());
        record
    }

    /// Records for one side of past trips, newest first.
    pub async fn for_user(&self, user_id: u64, role: HistoryRole) -> Vec<RideHistory> {
        let records = self.records.read().await;
        let mut matched: Vec<RideHistory> = records
            .iter()
            .filter(|record| match role {
                HistoryRole::Passenger => record.passenger_id == user_id,
                HistoryRole::Driver => record.driver_id == Some(user_id),
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        matched
    }

    /// Delete every record completed strictly before the cutoff. Returns the
    /// number removed; repeated calls with the same cutoff remove nothing.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.completed_at >= cutoff);
        before - records.len()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PaymentMethod, Place};

    fn place(label: &str) -> Place {
        Place {
            label: label.to_string(),
            latitude: 53.1428,
            longitude: 90.4167,
        }
    }

    fn ride(passenger_id: PassengerId) -> Ride {
        Ride {
            id: 0,
            passenger_id,
            driver_id: None,
            pickup: place("pickup"),
            dropoff: place("dropoff"),
            price: 250.0,
            distance_km: 10.0,
            payment_method: PaymentMethod::Cash,
            status: RideStatus::Searching,
            requested_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = RideStore::new();
        let first = store.insert(ride(1)).await;
        let second = store.insert(ride(2)).await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn assign_driver_succeeds_once_then_conflicts() {
        let store = RideStore::new();
        let created = store.insert(ride(1)).await;

        let assigned = store.assign_driver(created.id, 7).await.expect("first claim");
        assert_eq!(assigned.driver_id, Some(7));
        assert_eq!(assigned.status, RideStatus::Waiting);

        // A retry by the winning driver conflicts the same way a rival does.
        assert_eq!(
            store.assign_driver(created.id, 7).await,
            Err(DispatchError::Conflict("order already accepted by another driver"))
        );
        assert_eq!(
            store.assign_driver(created.id, 8).await,
            Err(DispatchError::Conflict("order already accepted by another driver"))
        );
        assert_eq!(
            store.assign_driver(999, 8).await,
            Err(DispatchError::NotFound("order"))
        );
    }

    #[tokio::test]
    async fn unassigned_excludes_accepted_rides() {
        let store = RideStore::new();
        let open = store.insert(ride(1)).await;
        let claimed = store.insert(ride(2)).await;
        store.assign_driver(claimed.id, 7).await.expect("claim");

        let available = store.unassigned().await;
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, open.id);
    }

    #[tokio::test]
    async fn pending_check_sees_searching_and_waiting_only() {
        let store = RideStore::new();
        let created = store.insert(ride(1)).await;
        assert!(store.has_pending_for_passenger(1).await);

        store.assign_driver(created.id, 7).await.expect("claim");
        assert!(store.has_pending_for_passenger(1).await);

        store
            .set_status(created.id, RideStatus::InTransit)
            .await
            .expect("status");
        assert!(!store.has_pending_for_passenger(1).await);
        assert!(!store.has_pending_for_passenger(2).await);
    }

    #[tokio::test]
    async fn history_queries_filter_by_role_and_sort_newest_first() {
        let store = HistoryStore::new();
        let base = Utc::now();
        for (passenger, driver, age_hours) in [(1, Some(7), 48), (1, Some(8), 2), (2, Some(7), 24)] {
            let source = ride(passenger);
            store
                .append(RideHistory {
                    id: 0,
                    passenger_id: source.passenger_id,
                    driver_id: driver,
                    pickup: source.pickup,
                    dropoff: source.dropoff,
                    price: source.price,
                    distance_km: source.distance_km,
                    payment_method: source.payment_method,
                    completed_at: base - chrono::Duration::hours(age_hours),
                })
                .await;
        }

        let for_passenger = store.for_user(1, HistoryRole::Passenger).await;
        assert_eq!(for_passenger.len(), 2);
        assert!(for_passenger[0].completed_at > for_passenger[1].completed_at);

        let for_driver = store.for_user(7, HistoryRole::Driver).await;
        assert_eq!(for_driver.len(), 2);
        assert!(for_driver.iter().all(|r| r.driver_id == Some(7)));
    }
}
