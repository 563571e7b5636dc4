use serde::Serialize;

use crate::domain::{Alert, Incident, IncidentStatus};
use crate::error::AppError;

/// Published after every mutation that changed state, and when a write-through fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StateEvent {
    IncidentReported {
        incident: Incident,
        alert: Option<Alert>,
    },
    IncidentStatusChanged {
        id: String,
        status: IncidentStatus,
    },
    AlertCreated {
        alert: Alert,
    },
    AlertResolved {
        id: String,
    },
    DataCleared,
    PersistFailed {
        key: String,
        error: AppError,
    },
}

impl StateEvent {
    /// Short user-facing line for a transient notification.
    pub fn message(&self) -> String {
        match self {
            StateEvent::IncidentReported { alert: Some(_), .. } => {
                "Emergency incident reported and alert created".to_string()
            }
            StateEvent::IncidentReported { alert: None, .. } => {
                "Incident reported successfully!".to_string()
            }
            StateEvent::IncidentStatusChanged { status, .. } => {
                format!("Incident status updated to {status}")
            }
            StateEvent::AlertCreated { .. } => "New alert created".to_string(),
            StateEvent::AlertResolved { .. } => "Alert resolved".to_string(),
            StateEvent::DataCleared => "All data cleared and reset to defaults".to_string(),
            StateEvent::PersistFailed { key, .. } => format!("Could not save {key}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StateEvent)>;

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn publish(&mut self, event: &StateEvent) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }
}
