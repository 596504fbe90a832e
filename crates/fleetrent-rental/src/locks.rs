//! # Per-Vehicle Locks
//!
//! Serializes lifecycle operations on the same vehicle inside one process.
//! Operations on different vehicles never wait on each other.
//!
//! Cross-process exclusivity comes from the database (partial unique index
//! plus check-and-set updates), not from these locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use fleetrent_core::VehicleId;

#[derive(Debug, Default)]
pub struct VehicleLocks {
    slots: Mutex<HashMap<VehicleId, Arc<AsyncMutex<()>>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `vehicle_id`. Released on drop.
    pub async fn acquire(&self, vehicle_id: VehicleId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
            // Drop slots nobody holds or waits on
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry(vehicle_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }
}
