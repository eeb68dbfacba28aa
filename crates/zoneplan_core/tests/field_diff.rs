use std::collections::BTreeSet;
use uuid::Uuid;
use zoneplan_core::{diff_fields, EventFields, FieldChange};

fn fields(participants: &[Uuid], start_at: i64, end_at: i64, timezone: &str) -> EventFields {
    EventFields {
        participants: participants.iter().copied().collect::<BTreeSet<_>>(),
        start_at,
        end_at,
        timezone: timezone.to_string(),
    }
}

#[test]
fn identical_fields_produce_empty_change_set() {
    let user = Uuid::new_v4();
    let previous = fields(&[user], 1_000, 2_000, "Asia/Kolkata");
    let next = previous.clone();

    assert!(diff_fields(&previous, &next).is_empty());
}

#[test]
fn participant_only_change_emits_single_entry_with_full_sets() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();

    let previous = fields(&[a, b], 1_000, 2_000, "Asia/Kolkata");
    let next = fields(&[a, c], 1_000, 2_000, "Asia/Kolkata");

    let changes = diff_fields(&previous, &next);
    assert_eq!(changes.len(), 1);
    match &changes[0] {
        FieldChange::Participants { old, new } => {
            assert_eq!(old, &previous.participants);
            assert_eq!(new, &next.participants);
        }
        other => panic!("unexpected change entry: {other:?}"),
    }
}

#[test]
fn participant_reordering_is_not_a_change() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let previous = fields(&[a, b], 1_000, 2_000, "UTC");
    let next = fields(&[b, a], 1_000, 2_000, "UTC");

    assert!(diff_fields(&previous, &next).is_empty());
}

#[test]
fn instants_compare_by_absolute_value_not_display() {
    // Same absolute window entered through a different zone: only the
    // timezone field itself differs.
    let previous = fields(&[], 1_710_034_200_000, 1_710_037_800_000, "Asia/Kolkata");
    let next = fields(&[], 1_710_034_200_000, 1_710_037_800_000, "UTC");

    let changes = diff_fields(&previous, &next);
    assert_eq!(changes.len(), 1);
    assert!(matches!(changes[0], FieldChange::Timezone { .. }));
}

#[test]
fn every_field_difference_is_reported_once() {
    let a = Uuid::new_v4();
    let previous = fields(&[a], 1_000, 2_000, "Asia/Kolkata");
    let next = fields(&[], 1_500, 2_500, "Europe/London");

    let changes = diff_fields(&previous, &next);
    let names: Vec<&str> = changes.iter().map(FieldChange::field_name).collect();
    assert_eq!(names, ["participants", "start_at", "end_at", "timezone"]);
}

#[test]
fn change_entries_serialize_with_field_tags() {
    let previous = fields(&[], 1_000, 2_000, "UTC");
    let next = fields(&[], 3_000, 4_000, "UTC");

    let changes = diff_fields(&previous, &next);
    let json = serde_json::to_value(&changes).unwrap();

    assert_eq!(json[0]["field"], "start_at");
    assert_eq!(json[0]["old"], 1_000);
    assert_eq!(json[0]["new"], 3_000);
    assert_eq!(json[1]["field"], "end_at");
}
