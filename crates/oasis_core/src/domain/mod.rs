use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;

/// A named point on campus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl Location {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
        }
    }
}

/// Generates the `as_str`, `Display` and `FromStr` impls shared by every lowercase wire tag.
macro_rules! wire_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $tag:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($tag => Ok($ty::$variant),)+
                    other => Err(AppError::invalid_argument(format!("Unknown {}", $what))
                        .with_details(format!(
                            "got={other:?}; expected one of {}",
                            [$($tag),+].join(", ")
                        ))),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    Theft,
    Harassment,
    Suspicious,
    Hazard,
    Emergency,
    Other,
}

wire_enum!(IncidentKind, "incident type", {
    Theft => "theft",
    Harassment => "harassment",
    Suspicious => "suspicious",
    Hazard => "hazard",
    Emergency => "emergency",
    Other => "other",
});

/// Ordered lifecycle tag. Any value may be set at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Reported,
    Investigating,
    Resolved,
}

wire_enum!(IncidentStatus, "incident status", {
    Reported => "reported",
    Investigating => "investigating",
    Resolved => "resolved",
});

/// Priority tier of an alert. `Resolved` is a pre-seeded "all clear" tier and is unrelated to
/// [`AlertStatus::Resolved`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Resolved,
}

wire_enum!(Severity, "alert severity", {
    High => "high",
    Medium => "medium",
    Low => "low",
    Resolved => "resolved",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Security,
    Weather,
    Info,
    Theft,
    Emergency,
}

wire_enum!(AlertKind, "alert type", {
    Security => "security",
    Weather => "weather",
    Info => "info",
    Theft => "theft",
    Emergency => "emergency",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

wire_enum!(AlertStatus, "alert status", {
    Active => "active",
    Resolved => "resolved",
});

/// A user-submitted safety report.
///
/// Field names on the wire match the persisted blobs written by earlier app versions
/// (`type`, `time`), so existing on-device data keeps loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub description: String,
    pub reporter: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub location: Location,
    pub status: IncidentStatus,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Everything an incident submission carries; id, time and status are assigned by the state core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentDraft {
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub description: String,
    pub reporter: String,
    pub location: Location,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// A broadcast notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub status: AlertStatus,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertDraft {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}
