use std::collections::BTreeSet;
use uuid::Uuid;
use zoneplan_core::db::open_db_in_memory;
use zoneplan_core::{
    EventService, EventValidationError, RepoError, ScheduleError, ScheduleRequest,
    SqliteEventRepository, SqliteUserRepository, UserId, UserService,
};

fn request(participants: &[UserId], timezone: &str) -> ScheduleRequest {
    ScheduleRequest {
        participants: participants.iter().copied().collect::<BTreeSet<_>>(),
        start_date: "2024-03-10".to_string(),
        start_time: "09:00".to_string(),
        end_date: "2024-03-10".to_string(),
        end_time: "10:00".to_string(),
        timezone: timezone.to_string(),
    }
}

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = UserService::new(SqliteUserRepository::new(&conn))
        .create_user("Alice")
        .unwrap();

    let mut service = EventService::new(SqliteEventRepository::new(&mut conn));
    let created = service.create_event(&request(&[alice.uuid], "Asia/Kolkata")).unwrap();

    let loaded = service.get_event(created.uuid).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.version, 0);
    assert!(loaded.history.is_empty());
    assert_eq!(loaded.fields.timezone, "Asia/Kolkata");
    // 09:00 IST resolves to 03:30 UTC.
    assert_eq!(loaded.fields.start_at, 1_710_041_400_000);
}

#[test]
fn created_instants_match_the_scheduled_wall_clock() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = EventService::new(SqliteEventRepository::new(&mut conn));

    let created = service.create_event(&request(&[], "UTC")).unwrap();
    assert_eq!(
        created.fields.start_at,
        zoneplan_core::to_instant("2024-03-10", "09:00", "UTC").unwrap()
    );
    assert_eq!(
        created.fields.end_at - created.fields.start_at,
        60 * 60 * 1000
    );
}

#[test]
fn empty_participant_set_is_accepted() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = EventService::new(SqliteEventRepository::new(&mut conn));

    let created = service.create_event(&request(&[], "Europe/London")).unwrap();
    assert!(created.fields.participants.is_empty());
    assert!(service.get_event(created.uuid).is_ok());
}

#[test]
fn unknown_participant_is_rejected_and_nothing_is_persisted() {
    let mut conn = open_db_in_memory().unwrap();
    let ghost = Uuid::new_v4();

    {
        let mut service = EventService::new(SqliteEventRepository::new(&mut conn));
        let err = service.create_event(&request(&[ghost], "UTC")).unwrap_err();
        match err {
            ScheduleError::Repo(RepoError::UnknownUser(id)) => assert_eq!(id, ghost),
            other => panic!("unexpected error: {other}"),
        }
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn reversed_window_is_rejected_and_nothing_is_persisted() {
    let mut conn = open_db_in_memory().unwrap();

    {
        let mut service = EventService::new(SqliteEventRepository::new(&mut conn));
        let mut bad = request(&[], "UTC");
        bad.end_date = "2024-03-09".to_string();

        let err = service.create_event(&bad).unwrap_err();
        match err {
            ScheduleError::Repo(RepoError::Validation(
                EventValidationError::InvalidTimeRange { start, end },
            )) => assert!(start >= end),
            other => panic!("unexpected error: {other}"),
        }
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn unknown_timezone_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = EventService::new(SqliteEventRepository::new(&mut conn));

    let err = service.create_event(&request(&[], "Atlantis/Sunken")).unwrap_err();
    assert!(matches!(err, ScheduleError::Time(_)));
}

#[test]
fn get_missing_event_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let service = EventService::new(SqliteEventRepository::new(&mut conn));

    let missing = Uuid::new_v4();
    let err = service.get_event(missing).unwrap_err();
    match err {
        ScheduleError::Repo(RepoError::EventNotFound(id)) => assert_eq!(id, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn list_events_for_user_filters_by_membership() {
    let mut conn = open_db_in_memory().unwrap();
    let (alice, bob) = {
        let users = UserService::new(SqliteUserRepository::new(&conn));
        (
            users.create_user("Alice").unwrap(),
            users.create_user("Bob").unwrap(),
        )
    };

    let mut service = EventService::new(SqliteEventRepository::new(&mut conn));
    let shared = service
        .create_event(&request(&[alice.uuid, bob.uuid], "UTC"))
        .unwrap();
    let alice_only = service.create_event(&request(&[alice.uuid], "UTC")).unwrap();

    let for_alice = service.list_events_for_user(alice.uuid).unwrap();
    let alice_ids: Vec<_> = for_alice.iter().map(|event| event.uuid).collect();
    assert!(alice_ids.contains(&shared.uuid));
    assert!(alice_ids.contains(&alice_only.uuid));

    let for_bob = service.list_events_for_user(bob.uuid).unwrap();
    let bob_ids: Vec<_> = for_bob.iter().map(|event| event.uuid).collect();
    assert_eq!(bob_ids, vec![shared.uuid]);

    assert_eq!(service.list_events().unwrap().len(), 2);
}

#[test]
fn viewer_zone_projection_leaves_stored_instants_alone() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = EventService::new(SqliteEventRepository::new(&mut conn));

    let created = service.create_event(&request(&[], "Asia/Kolkata")).unwrap();
    let view = zoneplan_core::event_in_zone(&created, "UTC").unwrap();

    assert_eq!(view.timezone, "UTC");
    assert_eq!(view.start.time, "03:30");
    assert_eq!(view.end.time, "04:30");

    // The owner's zone and the stored instants are untouched.
    let reloaded = service.get_event(created.uuid).unwrap();
    assert_eq!(reloaded.fields.timezone, "Asia/Kolkata");
    assert_eq!(reloaded.fields.start_at, created.fields.start_at);
}

#[test]
fn user_registry_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::new(SqliteUserRepository::new(&conn));

    let alice = users.create_user("Alice").unwrap();
    let bob = users.create_user("Bob").unwrap();

    let loaded = users.get_user(alice.uuid).unwrap().unwrap();
    assert_eq!(loaded, alice);
    assert!(users.get_user(Uuid::new_v4()).unwrap().is_none());

    let all = users.list_users().unwrap();
    assert_eq!(all, vec![alice, bob]);
}
