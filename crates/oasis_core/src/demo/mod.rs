use time::{Duration, OffsetDateTime};

use crate::domain::{
    Alert, AlertKind, AlertStatus, Incident, IncidentKind, IncidentStatus, Location, Severity,
};

// Day-one content shown to first-time users and restored by a reset.
// Timestamps are relative to `now` so the feed always looks fresh.

pub fn default_incidents(now: OffsetDateTime) -> Vec<Incident> {
    vec![
        Incident {
            id: "1".to_string(),
            kind: IncidentKind::Theft,
            description: "Bike stolen from rack near library".to_string(),
            reporter: "John Doe".to_string(),
            time: now - Duration::hours(2),
            location: Location::new(29.7200, -95.3400, "Library"),
            status: IncidentStatus::Investigating,
            photos: Vec::new(),
        },
        Incident {
            id: "2".to_string(),
            kind: IncidentKind::Harassment,
            description: "Verbal harassment reported near student center".to_string(),
            reporter: "Sarah M.".to_string(),
            time: now - Duration::hours(4),
            location: Location::new(29.7210, -95.3420, "Student Center"),
            status: IncidentStatus::Resolved,
            photos: Vec::new(),
        },
    ]
}

pub fn default_alerts(now: OffsetDateTime) -> Vec<Alert> {
    vec![
        Alert {
            id: "1".to_string(),
            title: "Suspicious person near East Parking Garage".to_string(),
            description: "Campus police are investigating. Avoid the area if possible.".to_string(),
            severity: Severity::High,
            kind: AlertKind::Security,
            time: now - Duration::minutes(15),
            location: Some(Location::new(29.7215, -95.3430, "East Parking Garage")),
            status: AlertStatus::Active,
        },
        Alert {
            id: "2".to_string(),
            title: "Weather Alert: Heavy Rain Expected".to_string(),
            description: "Thunderstorms expected this evening. Plan your commute accordingly."
                .to_string(),
            severity: Severity::Medium,
            kind: AlertKind::Weather,
            time: now - Duration::hours(1),
            location: None,
            status: AlertStatus::Active,
        },
        Alert {
            id: "3".to_string(),
            title: "Safe Walk Service Extended Hours".to_string(),
            description: "Due to high demand, escort service will operate until 3 AM this week."
                .to_string(),
            severity: Severity::Low,
            kind: AlertKind::Info,
            time: now - Duration::hours(3),
            location: None,
            status: AlertStatus::Active,
        },
        Alert {
            id: "4".to_string(),
            title: "All Clear: Library Area Incident Resolved".to_string(),
            description: "Campus police have resolved the earlier reported incident.".to_string(),
            severity: Severity::Resolved,
            kind: AlertKind::Security,
            time: now - Duration::hours(5),
            location: Some(Location::new(29.7200, -95.3400, "Library Area")),
            status: AlertStatus::Resolved,
        },
        Alert {
            id: "5".to_string(),
            title: "Bike Theft Reported in Stadium Area".to_string(),
            description: "Multiple bike thefts reported. Use designated bike racks and locks."
                .to_string(),
            severity: Severity::Medium,
            kind: AlertKind::Theft,
            time: now - Duration::days(1),
            location: Some(Location::new(29.7180, -95.3380, "Stadium Area")),
            status: AlertStatus::Active,
        },
    ]
}
