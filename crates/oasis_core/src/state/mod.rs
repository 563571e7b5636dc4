//! The session's single source of truth for incidents and alerts.
//!
//! [`IncidentState`] owns both collections, applies every mutation, and writes the affected
//! collection through to its [`KeyValueStore`] afterwards. Screens read from it and subscribe to
//! [`StateEvent`]s instead of polling.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::activity::{self, ActivityItem, AlertFilter};
use crate::clock::{Clock, MonotonicStamp, SystemClock};
use crate::config::StoreConfig;
use crate::demo::{default_alerts, default_incidents};
use crate::domain::{
    Alert, AlertDraft, AlertKind, AlertStatus, Incident, IncidentDraft, IncidentKind,
    IncidentStatus, Severity,
};
use crate::notify::{StateEvent, SubscriptionId, Subscribers};
use crate::store::{load_collection, save_collection, KeyValueStore, Loaded};

/// What a targeted update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Updated,
    /// The record already had the requested value; nothing was written.
    Unchanged,
    /// No record has that id. The call was ignored.
    NotFound,
}

pub struct IncidentState<S: KeyValueStore> {
    store: S,
    incidents_key: String,
    alerts_key: String,
    feed_limit: usize,
    clock: Box<dyn Clock>,
    stamp: MonotonicStamp,
    incidents: Vec<Incident>,
    alerts: Vec<Alert>,
    subscribers: Subscribers,
}

impl<S: KeyValueStore> IncidentState<S> {
    pub fn load(store: S, config: &StoreConfig) -> Self {
        Self::load_with_clock(store, config, SystemClock)
    }

    /// Restores both collections from `store`, each independently falling back to the built-in
    /// defaults when its entry is missing or unreadable. A collection that fell back is written
    /// straight away so the store mirrors the session from the start.
    pub fn load_with_clock(store: S, config: &StoreConfig, clock: impl Clock + 'static) -> Self {
        let now = clock.now();
        let (incidents, incidents_defaulted) =
            restore(&store, &config.incidents_key, || default_incidents(now));
        let (alerts, alerts_defaulted) =
            restore(&store, &config.alerts_key, || default_alerts(now));
        let stamp = MonotonicStamp::starting_after(
            incidents.iter().map(|i| &i.time).chain(alerts.iter().map(|a| &a.time)),
        );

        let mut state = Self {
            store,
            incidents_key: config.incidents_key.clone(),
            alerts_key: config.alerts_key.clone(),
            feed_limit: config.feed_limit,
            clock: Box::new(clock),
            stamp,
            incidents,
            alerts,
            subscribers: Subscribers::default(),
        };
        if incidents_defaulted {
            state.persist_incidents();
        }
        if alerts_defaulted {
            state.persist_alerts();
        }
        state
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    pub fn alert(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StateEvent) + 'static) -> SubscriptionId {
        self.subscribers.add(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Files a new report. An emergency report also raises a high-severity alert at the same
    /// location.
    pub fn add_incident(&mut self, draft: IncidentDraft) -> Incident {
        let time = self.next_time();
        let incident = Incident {
            id: fresh_id(|id| self.incident(id).is_some()),
            kind: draft.kind,
            description: draft.description,
            reporter: draft.reporter,
            time,
            location: draft.location,
            status: IncidentStatus::Reported,
            photos: draft.photos,
        };
        log::info!(
            "incident {} reported ({}) at {}",
            incident.id,
            incident.kind,
            incident.location.name
        );
        self.incidents.insert(0, incident.clone());
        self.persist_incidents();

        let alert = if incident.kind == IncidentKind::Emergency {
            let alert = Alert {
                id: fresh_id(|id| self.alert(id).is_some()),
                title: "Emergency incident reported".to_string(),
                description: format!(
                    "Emergency situation reported at {}",
                    incident.location.name
                ),
                severity: Severity::High,
                kind: AlertKind::Emergency,
                time,
                location: Some(incident.location.clone()),
                status: AlertStatus::Active,
            };
            log::info!("alert {} raised for emergency incident {}", alert.id, incident.id);
            self.alerts.insert(0, alert.clone());
            self.persist_alerts();
            Some(alert)
        } else {
            None
        };

        self.subscribers.publish(&StateEvent::IncidentReported {
            incident: incident.clone(),
            alert,
        });
        incident
    }

    /// Sets the status of one incident. Any status may follow any other.
    pub fn update_incident_status(&mut self, id: &str, status: IncidentStatus) -> Outcome {
        let Some(incident) = self.incidents.iter_mut().find(|i| i.id == id) else {
            log::warn!("ignoring status update for unknown incident {id:?}");
            return Outcome::NotFound;
        };
        if incident.status == status {
            return Outcome::Unchanged;
        }
        log::info!("incident {id} status {} -> {status}", incident.status);
        incident.status = status;
        self.persist_incidents();
        self.subscribers.publish(&StateEvent::IncidentStatusChanged {
            id: id.to_string(),
            status,
        });
        Outcome::Updated
    }

    pub fn add_alert(&mut self, draft: AlertDraft) -> Alert {
        let alert = Alert {
            id: fresh_id(|id| self.alert(id).is_some()),
            title: draft.title,
            description: draft.description,
            severity: draft.severity,
            kind: draft.kind,
            time: self.next_time(),
            location: draft.location,
            status: AlertStatus::Active,
        };
        log::info!("alert {} created ({}, {})", alert.id, alert.kind, alert.severity);
        self.alerts.insert(0, alert.clone());
        self.persist_alerts();
        self.subscribers.publish(&StateEvent::AlertCreated {
            alert: alert.clone(),
        });
        alert
    }

    /// Marks an alert resolved. Its severity tier is left alone.
    pub fn resolve_alert(&mut self, id: &str) -> Outcome {
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) else {
            log::warn!("ignoring resolve for unknown alert {id:?}");
            return Outcome::NotFound;
        };
        if alert.status == AlertStatus::Resolved {
            return Outcome::Unchanged;
        }
        log::info!("alert {id} resolved");
        alert.status = AlertStatus::Resolved;
        self.persist_alerts();
        self.subscribers.publish(&StateEvent::AlertResolved { id: id.to_string() });
        Outcome::Updated
    }

    /// Restores the day-one collections and erases both persisted entries.
    pub fn clear_all_data(&mut self) {
        let now = self.clock.now();
        self.incidents = default_incidents(now);
        self.alerts = default_alerts(now);
        log::info!("all incident and alert data reset to defaults");

        for key in [self.incidents_key.clone(), self.alerts_key.clone()] {
            if let Err(error) = self.store.remove(&key) {
                self.report_persist_failure(key, error);
            }
        }
        self.subscribers.publish(&StateEvent::DataCleared);
    }

    /// The merged feed at the configured default length.
    pub fn recent_activities(&self) -> Vec<ActivityItem> {
        self.recent_activities_with_limit(self.feed_limit)
    }

    pub fn recent_activities_with_limit(&self, limit: usize) -> Vec<ActivityItem> {
        activity::recent_activities(&self.incidents, &self.alerts, limit)
    }

    pub fn get_alerts(&self, filter: &AlertFilter, limit: usize) -> Vec<Alert> {
        activity::sorted_alerts(&self.alerts, filter, limit)
    }

    fn next_time(&mut self) -> OffsetDateTime {
        let now = self.clock.now();
        self.stamp.next(now)
    }

    fn persist_incidents(&mut self) {
        if let Err(error) = save_collection(&mut self.store, &self.incidents_key, &self.incidents) {
            let key = self.incidents_key.clone();
            self.report_persist_failure(key, error);
        } else {
            log::debug!("saved {} incidents", self.incidents.len());
        }
    }

    fn persist_alerts(&mut self) {
        if let Err(error) = save_collection(&mut self.store, &self.alerts_key, &self.alerts) {
            let key = self.alerts_key.clone();
            self.report_persist_failure(key, error);
        } else {
            log::debug!("saved {} alerts", self.alerts.len());
        }
    }

    // The in-memory change stands; the mirror catches up on the next successful write.
    fn report_persist_failure(&mut self, key: String, error: crate::error::AppError) {
        log::warn!("failed to persist {key}: {error}");
        self.subscribers.publish(&StateEvent::PersistFailed { key, error });
    }
}

/// Returns the stored collection, or the defaults plus `true` when the entry could not be used.
fn restore<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    defaults: impl FnOnce() -> Vec<T>,
) -> (Vec<T>, bool) {
    match load_collection(store, key) {
        Loaded::Found(items) => {
            log::debug!("restored {} records from {key}", items.len());
            return (items, false);
        }
        Loaded::Missing => log::debug!("no stored {key}; using defaults"),
        Loaded::Corrupt { details } => {
            log::warn!("stored {key} is malformed; using defaults ({details})")
        }
        Loaded::Unreadable(error) => {
            log::warn!("could not read stored {key}; using defaults ({error})")
        }
    }
    (defaults(), true)
}

fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken(&id) {
            return id;
        }
    }
}
