//! Field-level change-set computation between event revisions.
//!
//! # Responsibility
//! - Compare two event field sets and report exactly what differs.
//!
//! # Invariants
//! - Instants are compared by absolute value, never by display string.
//! - The participant set is compared as an unordered set; reordering
//!   alone never produces an entry.
//! - Identical inputs produce an empty change set; callers must not
//!   append an empty set to the ledger.

use crate::model::event::{EventFields, FieldChange};

/// Computes the minimal change set between two event field revisions.
///
/// At most one entry per declared field, in declaration order. The
/// participants entry carries the full before/after sets so complete
/// membership at each revision is reconstructable from the ledger.
pub fn diff_fields(previous: &EventFields, next: &EventFields) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if previous.participants != next.participants {
        changes.push(FieldChange::Participants {
            old: previous.participants.clone(),
            new: next.participants.clone(),
        });
    }

    if previous.start_at != next.start_at {
        changes.push(FieldChange::StartAt {
            old: previous.start_at,
            new: next.start_at,
        });
    }

    if previous.end_at != next.end_at {
        changes.push(FieldChange::EndAt {
            old: previous.end_at,
            new: next.end_at,
        });
    }

    if previous.timezone != next.timezone {
        changes.push(FieldChange::Timezone {
            old: previous.timezone.clone(),
            new: next.timezone.clone(),
        });
    }

    changes
}
