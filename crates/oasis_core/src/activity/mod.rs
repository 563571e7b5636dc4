use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::{Alert, AlertStatus, Incident, Severity};

pub const DEFAULT_FEED_LIMIT: usize = 10;

/// One entry of the merged feed, tagged with where it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "activityType", rename_all = "lowercase")]
pub enum ActivityItem {
    Incident(Incident),
    Alert(Alert),
}

impl ActivityItem {
    pub fn id(&self) -> &str {
        match self {
            ActivityItem::Incident(incident) => &incident.id,
            ActivityItem::Alert(alert) => &alert.id,
        }
    }

    pub fn time(&self) -> OffsetDateTime {
        match self {
            ActivityItem::Incident(incident) => incident.time,
            ActivityItem::Alert(alert) => alert.time,
        }
    }

    pub fn is_incident(&self) -> bool {
        matches!(self, ActivityItem::Incident(_))
    }
}

/// Narrows [`sorted_alerts`]. Empty fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
}

impl AlertFilter {
    pub fn active() -> Self {
        Self {
            severity: None,
            status: Some(AlertStatus::Active),
        }
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.severity.map_or(true, |s| alert.severity == s)
            && self.status.map_or(true, |s| alert.status == s)
    }
}

/// Newest-first merge of both collections, capped at `limit`.
///
/// Records with equal times keep their input order, incidents ahead of alerts.
pub fn recent_activities(
    incidents: &[Incident],
    alerts: &[Alert],
    limit: usize,
) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = incidents
        .iter()
        .cloned()
        .map(ActivityItem::Incident)
        .chain(alerts.iter().cloned().map(ActivityItem::Alert))
        .collect();

    // `sort_by` is stable.
    items.sort_by(|a, b| b.time().cmp(&a.time()));
    items.truncate(limit);
    items
}

/// Newest-first copy of the alerts that pass `filter`, capped at `limit`.
pub fn sorted_alerts(alerts: &[Alert], filter: &AlertFilter, limit: usize) -> Vec<Alert> {
    let mut out: Vec<Alert> = alerts.iter().filter(|a| filter.matches(a)).cloned().collect();
    out.sort_by(|a, b| b.time.cmp(&a.time));
    out.truncate(limit);
    out
}
