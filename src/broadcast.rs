//! Fire-and-forget event bus for live client updates.
//!
//! All connected clients receive every event; there is no per-client
//! acknowledgment, no delivery guarantee, and no ordering guarantee across
//! independent employees. Events about the same employee/week are emitted in
//! mutation order, and a well-behaved subscriber applies them in that order
//! (last event wins for finalization state).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::api::{Branch, BranchId, Employee, EmployeeId, Shift, ShiftId};

/// Wire events. The serde tags match the event names clients already listen
/// for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    #[serde(rename = "SHIFT_ADD")]
    ShiftAdd(Shift),
    #[serde(rename = "SHIFT_DELETE")]
    ShiftDelete { id: ShiftId },
    #[serde(rename = "role_updated")]
    RoleUpdated { role: String, hourly_rate: f64 },
    #[serde(rename = "employee_added")]
    EmployeeAdded {
        branch_id: BranchId,
        employee: Employee,
    },
    #[serde(rename = "finalized_added")]
    FinalizedAdded {
        employee_id: EmployeeId,
        week_start: NaiveDate,
    },
    #[serde(rename = "finalized_deleted")]
    FinalizedDeleted {
        employee_id: EmployeeId,
        week_start: NaiveDate,
    },
    #[serde(rename = "BRANCH_SETTINGS_UPDATED")]
    BranchSettingsUpdated { branch: Branch },
}

impl Event {
    /// The wire name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ShiftAdd(_) => "SHIFT_ADD",
            Event::ShiftDelete { .. } => "SHIFT_DELETE",
            Event::RoleUpdated { .. } => "role_updated",
            Event::EmployeeAdded { .. } => "employee_added",
            Event::FinalizedAdded { .. } => "finalized_added",
            Event::FinalizedDeleted { .. } => "finalized_deleted",
            Event::BranchSettingsUpdated { .. } => "BRANCH_SETTINGS_UPDATED",
        }
    }
}

/// Publish/subscribe channel shared by the coordinator and the HTTP layer.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventBus { tx }
    }

    /// Publish an event to all current subscribers. Publishing with no
    /// subscribers is not an error.
    pub fn publish(&self, event: Event) {
        tracing::debug!(event = event.kind(), "broadcast");
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        // Enough for a handful of managers editing concurrently.
        Self::new(256)
    }
}
