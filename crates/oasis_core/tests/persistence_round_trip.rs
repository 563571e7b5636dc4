use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use time::macros::datetime;
use time::Duration;

use oasis_core::clock::{Clock, ManualClock};
use oasis_core::config::{StoreConfig, ALERTS_KEY, INCIDENTS_KEY};
use oasis_core::demo::{default_alerts, default_incidents};
use oasis_core::domain::{
    AlertDraft, AlertKind, IncidentDraft, IncidentKind, IncidentStatus, Location, Severity,
};
use oasis_core::state::IncidentState;
use oasis_core::store::{KeyValueStore, SqliteStore};

fn open_state(db_path: &Path, clock: &ManualClock) -> IncidentState<SqliteStore> {
    let store = SqliteStore::open(db_path).expect("open store");
    IncidentState::load_with_clock(store, &StoreConfig::default(), clock.clone())
}

#[test]
fn restart_restores_collections_exactly() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("device").join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 21:15:30.123456789 UTC));

    let (incidents, alerts) = {
        let mut state = open_state(&db_path, &clock);
        state.add_incident(IncidentDraft {
            kind: IncidentKind::Harassment,
            description: "Followed from the bus stop, twice".to_string(),
            reporter: "Zoë".to_string(),
            location: Location::new(29.721_534_987, -95.343_012_001, "Bus Stop 7"),
            photos: vec!["photo-1.jpg".to_string(), "photo-2.jpg".to_string()],
        });
        clock.advance(Duration::seconds(3));
        state.add_incident(IncidentDraft {
            kind: IncidentKind::Emergency,
            description: "Fire alarm".to_string(),
            reporter: "RA Desk".to_string(),
            location: Location::new(29.7199, -95.3411, "Cougar Village"),
            photos: Vec::new(),
        });
        state.add_alert(AlertDraft {
            title: "Road closure".to_string(),
            description: "Entrance 14 closed".to_string(),
            severity: Severity::Low,
            kind: AlertKind::Info,
            location: None,
        });
        state.update_incident_status("1", IncidentStatus::Resolved);
        state.resolve_alert("5");
        (state.incidents().to_vec(), state.alerts().to_vec())
    };

    // Much later, a new session on the same device.
    clock.advance(Duration::days(2));
    let state = open_state(&db_path, &clock);
    assert_eq!(state.incidents(), incidents.as_slice());
    assert_eq!(state.alerts(), alerts.as_slice());
}

#[test]
fn corrupt_entry_falls_back_without_touching_the_other() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 09:00 UTC));

    let alerts = {
        let mut state = open_state(&db_path, &clock);
        state.resolve_alert("1");
        state.alerts().to_vec()
    };

    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store.set(INCIDENTS_KEY, "[{\"id\": \"1\", \"type\": ").unwrap();
    }

    let state = open_state(&db_path, &clock);
    assert_eq!(state.incidents(), default_incidents(clock.now()).as_slice());
    assert_eq!(state.alerts(), alerts.as_slice());
}

#[test]
fn seeds_keep_their_times_across_restarts() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 12:00 UTC));

    let (incidents, alerts, user_alert) = {
        let mut state = open_state(&db_path, &clock);
        let alert = state.add_alert(AlertDraft {
            title: "user alert".to_string(),
            description: "Flooding near Lot 9".to_string(),
            severity: Severity::Medium,
            kind: AlertKind::Weather,
            location: None,
        });
        (state.incidents().to_vec(), state.alerts().to_vec(), alert)
    };

    clock.advance(Duration::hours(3));
    let state = open_state(&db_path, &clock);
    assert_eq!(state.incidents(), incidents.as_slice());
    assert_eq!(state.alerts(), alerts.as_slice());
    assert_eq!(state.incident("1").unwrap().time, datetime!(2026-04-10 10:00 UTC));

    let feed = state.recent_activities();
    assert_eq!(feed[0].id(), user_alert.id);
}

#[test]
fn corrupt_entry_is_replaced_by_the_defaults() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 09:00 UTC));
    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store.set(INCIDENTS_KEY, "{broken").unwrap();
    }

    let incidents = open_state(&db_path, &clock).incidents().to_vec();

    let store = SqliteStore::open(&db_path).unwrap();
    let raw = store.get(INCIDENTS_KEY).unwrap().expect("defaults written back");
    let stored: Vec<oasis_core::domain::Incident> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, incidents);
    assert_eq!(stored, default_incidents(datetime!(2026-04-10 09:00 UTC)));

    clock.advance(Duration::days(1));
    assert_eq!(open_state(&db_path, &clock).incidents(), incidents.as_slice());
}

#[test]
fn unknown_enum_tag_counts_as_corrupt() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 09:00 UTC));
    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store
            .set(
                ALERTS_KEY,
                r#"[{"id":"9","title":"t","description":"d","severity":"urgent","type":"info","time":"2026-04-10T08:00:00.000Z","status":"active"}]"#,
            )
            .unwrap();
    }

    let state = open_state(&db_path, &clock);
    assert_eq!(state.alerts(), default_alerts(clock.now()).as_slice());
}

#[test]
fn reads_blobs_written_by_the_web_client() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 09:00 UTC));
    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store
            .set(
                INCIDENTS_KEY,
                r#"[{"id":"1712739600000","type":"suspicious","description":"Someone trying car doors","reporter":"Anon","time":"2026-04-10T08:20:00.000Z","location":{"lat":29.72,"lng":-95.34,"name":"Lot 20A"},"status":"investigating","photos":[]}]"#,
            )
            .unwrap();
        store
            .set(
                ALERTS_KEY,
                r#"[{"id":"alert-1712739600000","title":"Emergency incident reported","description":"Emergency situation reported at Lot 20A","severity":"high","type":"emergency","time":"2026-04-10T08:20:00.000Z","location":null,"status":"active"}]"#,
            )
            .unwrap();
    }

    let state = open_state(&db_path, &clock);
    let incident = state.incident("1712739600000").expect("stored incident");
    assert_eq!(incident.kind, IncidentKind::Suspicious);
    assert_eq!(incident.time, datetime!(2026-04-10 08:20 UTC));
    assert_eq!(state.alerts().len(), 1);
    assert_eq!(state.alerts()[0].location, None);
}

#[test]
fn persisted_blob_uses_wire_field_names() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 09:00 UTC));

    let mut state = open_state(&db_path, &clock);
    state.add_incident(IncidentDraft {
        kind: IncidentKind::Theft,
        description: "Laptop".to_string(),
        reporter: "Jane".to_string(),
        location: Location::new(1.5, -2.25, "Library"),
        photos: Vec::new(),
    });

    let raw = state.store().get(INCIDENTS_KEY).unwrap().expect("written");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &json[0];
    assert_eq!(first["type"], "theft");
    assert_eq!(first["status"], "reported");
    assert_eq!(first["time"], "2026-04-10T09:00:00Z");
    assert_eq!(first["location"]["lng"], -2.25);
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[test]
fn clear_all_data_restores_defaults_now_and_after_restart() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("oasis.sqlite");
    let clock = ManualClock::new(datetime!(2026-04-10 09:00 UTC));

    {
        let mut state = open_state(&db_path, &clock);
        state.add_incident(IncidentDraft {
            kind: IncidentKind::Emergency,
            description: "Gas smell".to_string(),
            reporter: "Jane".to_string(),
            location: Location::new(0.0, 0.0, "Chem Lab"),
            photos: Vec::new(),
        });
        clock.advance(Duration::minutes(10));
        state.clear_all_data();

        assert_eq!(state.incidents(), default_incidents(clock.now()).as_slice());
        assert_eq!(state.alerts(), default_alerts(clock.now()).as_slice());
        assert_eq!(state.store().get(INCIDENTS_KEY).unwrap(), None);
        assert_eq!(state.store().get(ALERTS_KEY).unwrap(), None);
    }

    clock.advance(Duration::hours(1));
    let state = open_state(&db_path, &clock);
    assert_eq!(state.incidents(), default_incidents(clock.now()).as_slice());
    assert_eq!(state.alerts(), default_alerts(clock.now()).as_slice());
    assert!(state.incidents().iter().all(|i| i.description != "Gas smell"));
}
