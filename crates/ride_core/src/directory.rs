//! Existence lookups for passengers and drivers.
//!
//! Identity is owned by a separate subsystem; dispatch only needs to know
//! whether a referenced party exists before touching a ride.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{DriverId, PassengerId};

#[async_trait]
pub trait PartyDirectory: Send + Sync {
    async fn passenger_exists(&self, id: PassengerId) -> bool;
    async fn driver_exists(&self, id: DriverId) -> bool;
}

/// Directory backed by in-process sets, for tests and single-node setups.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    passengers: RwLock<HashSet<PassengerId>>,
    drivers: RwLock<HashSet<DriverId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_passenger(&self, id: PassengerId) {
        self.passengers.write().await.insert(id);
    }

    pub async fn register_driver(&self, id: DriverId) {
        self.drivers.write().await.insert(id);
    }
}

#[async_trait]
impl PartyDirectory for InMemoryDirectory {
    async fn passenger_exists(&self, id: PassengerId) -> bool {
        self.passengers.read().await.contains(&id)
    }

    async fn driver_exists(&self, id: DriverId) -> bool {
        self.drivers.read().await.contains(&id)
    }
}
