//! Ride lifecycle operations: creation, first-claim driver acceptance,
//! status updates, price adjustment, cancellation, completion, and the
//! archival handoff.
//!
//! The manager owns no state of its own; it holds handles to the stores, the
//! party directory and the event hub, and every mutation is atomic at the
//! store layer. Event publishing is fire-and-forget: a state change never
//! fails or rolls back because nobody could be notified.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::broadcast::OrderEvents;
use crate::directory::PartyDirectory;
use crate::error::DispatchError;
use crate::model::{
    DriverId, HistoryRole, OrderEvent, PassengerId, PaymentMethod, Ride, RideHistory, RideId,
    RideStatus, TripRequest,
};
use crate::spatial;
use crate::store::{HistoryStore, RideStore};

#[derive(Clone)]
pub struct RideLifecycle {
    rides: Arc<RideStore>,
    history: Arc<HistoryStore>,
    directory: Arc<dyn PartyDirectory>,
    events: Arc<OrderEvents>,
}

impl RideLifecycle {
    pub fn new(
        rides: Arc<RideStore>,
        history: Arc<HistoryStore>,
        directory: Arc<dyn PartyDirectory>,
        events: Arc<OrderEvents>,
    ) -> Self {
        Self {
            rides,
            history,
            directory,
            events,
        }
    }

    /// Create a ride in `Searching` with no driver.
    ///
    /// The trip fields are validated before anything is persisted, the
    /// passenger must exist, and a passenger with a ride still in
    /// `Searching` or `Waiting` cannot open a second one. No event is
    /// published: a ride has no subscribers before it exists.
    pub async fn create_ride(&self, request: TripRequest) -> Result<Ride, DispatchError> {
        let payment_method = validate_trip_request(&request)?;
        if !self.directory.passenger_exists(request.passenger_id).await {
            return Err(DispatchError::NotFound("passenger"));
        }
        if self.rides.has_pending_for_passenger(request.passenger_id).await {
            return Err(DispatchError::Conflict("passenger already has an active ride"));
        }

        let ride = self
            .rides
            .insert(Ride {
                id: 0,
                passenger_id: request.passenger_id,
                driver_id: None,
                pickup: request.pickup,
                dropoff: request.dropoff,
                price: request.price,
                distance_km: request.distance_km,
                payment_method,
                status: RideStatus::Searching,
                requested_at: Utc::now(),
            })
            .await;
        info!(order = ride.id, passenger = ride.passenger_id, "ride created");
        Ok(ride)
    }

    /// Bind a driver to an unassigned order.
    ///
    /// The store performs the check-and-set as one atomic step, so exactly
    /// one of any number of racing drivers wins; the rest get `Conflict`,
    /// including the winner retrying its own acceptance.
    pub async fn accept_order(
        &self,
        order_id: RideId,
        driver_id: DriverId,
    ) -> Result<(), DispatchError> {
        let ride = self
            .rides
            .get(order_id)
            .await
            .ok_or(DispatchError::NotFound("order"))?;
        if ride.driver_id.is_some() {
            return Err(DispatchError::Conflict("order already accepted by another driver"));
        }
        if !self.directory.driver_exists(driver_id).await {
            return Err(DispatchError::NotFound("driver"));
        }

        let updated = self.rides.assign_driver(order_id, driver_id).await?;
        info!(order = order_id, driver = driver_id, "order accepted");
        self.publish(order_id, Some(updated.status)).await;
        Ok(())
    }

    /// Move an order to another in-progress status.
    ///
    /// Only {Waiting, Approaching, InTransit} are accepted; membership in the
    /// set is the whole check, so statuses may move in any order within it.
    pub async fn update_order_status(
        &self,
        order_id: RideId,
        new_status: RideStatus,
    ) -> Result<(), DispatchError> {
        if !new_status.is_in_progress() {
            return Err(DispatchError::Validation(format!(
                "status {new_status:?} cannot be set on an order"
            )));
        }
        self.rides
            .set_status(order_id, new_status)
            .await
            .ok_or(DispatchError::NotFound("order"))?;
        info!(order = order_id, status = ?new_status, "order status updated");
        self.publish(order_id, Some(new_status)).await;
        Ok(())
    }

    /// Add a strictly positive amount to the order's price.
    pub async fn update_ride_price(
        &self,
        order_id: RideId,
        amount: f64,
    ) -> Result<Ride, DispatchError> {
        if !(amount > 0.0) {
            return Err(DispatchError::Validation(
                "price adjustment must be positive".to_string(),
            ));
        }
        let ride = self
            .rides
            .add_price(order_id, amount)
            .await
            .ok_or(DispatchError::NotFound("order"))?;
        info!(order = order_id, price = ride.price, "ride price adjusted");
        Ok(ride)
    }

    /// Cancel an order: remove it without a trace and signal its subscribers
    /// with an identifier-only event.
    pub async fn delete_ride(&self, order_id: RideId) -> Result<(), DispatchError> {
        self.rides
            .remove(order_id)
            .await
            .ok_or(DispatchError::NotFound("order"))?;
        info!(order = order_id, "ride deleted");
        self.publish(order_id, None).await;
        Ok(())
    }

    /// Complete an order: archive its trip attributes stamped with the
    /// current time, drop it from the active set, and signal subscribers.
    ///
    /// Removal from the active set decides which caller completes the order,
    /// so concurrent completions produce exactly one history record.
    pub async fn complete_order(&self, order_id: RideId) -> Result<(), DispatchError> {
        let ride = self
            .rides
            .remove(order_id)
            .await
            .ok_or(DispatchError::NotFound("order"))?;
        self.history
            .append(RideHistory {
                id: 0,
                passenger_id: ride.passenger_id,
                driver_id: ride.driver_id,
                pickup: ride.pickup,
                dropoff: ride.dropoff,
                price: ride.price,
                distance_km: ride.distance_km,
                payment_method: ride.payment_method,
                completed_at: Utc::now(),
            })
            .await;
        info!(order = order_id, "order completed");
        self.publish(order_id, None).await;
        Ok(())
    }

    pub async fn active_ride_for_passenger(&self, passenger_id: PassengerId) -> Option<Ride> {
        self.rides.first_for_passenger(passenger_id).await
    }

    pub async fn active_ride_for_driver(&self, driver_id: DriverId) -> Option<Ride> {
        self.rides.first_for_driver(driver_id).await
    }

    /// Orders still open to acceptance: no driver yet, any status.
    pub async fn available_rides(&self) -> Vec<Ride> {
        self.rides.unassigned().await
    }

    /// Past trips for one side of the market, newest first.
    pub async fn ride_history(
        &self,
        user_id: u64,
        role: &str,
    ) -> Result<Vec<RideHistory>, DispatchError> {
        let role = HistoryRole::parse(role).ok_or_else(|| {
            DispatchError::Validation("role must be 'driver' or 'passenger'".to_string())
        })?;
        Ok(self.history.for_user(user_id, role).await)
    }

    async fn publish(&self, order_id: RideId, status: Option<RideStatus>) {
        let delivered = self.events.publish(OrderEvent { order_id, status }).await;
        debug!(order = order_id, delivered, "order event published");
    }
}

fn validate_trip_request(request: &TripRequest) -> Result<PaymentMethod, DispatchError> {
    if request.pickup.label.trim().is_empty() || request.dropoff.label.trim().is_empty() {
        return Err(DispatchError::Validation(
            "pickup and dropoff labels are required".to_string(),
        ));
    }
    if spatial::coordinate(request.pickup.latitude, request.pickup.longitude).is_none() {
        return Err(DispatchError::Validation(
            "pickup coordinates are out of range".to_string(),
        ));
    }
    if spatial::coordinate(request.dropoff.latitude, request.dropoff.longitude).is_none() {
        return Err(DispatchError::Validation(
            "dropoff coordinates are out of range".to_string(),
        ));
    }
    if !(request.price >= 0.0) {
        return Err(DispatchError::Validation(
            "price must be non-negative".to_string(),
        ));
    }
    if !(request.distance_km > 0.0) {
        return Err(DispatchError::Validation(
            "distance must be positive".to_string(),
        ));
    }
    PaymentMethod::parse(&request.payment_method).ok_or_else(|| {
        DispatchError::Validation(format!(
            "unknown payment method {:?}",
            request.payment_method
        ))
    })
}
