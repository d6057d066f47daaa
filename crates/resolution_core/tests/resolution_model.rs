use resolution_core::{
    completion_status, is_complete, CompletionStatus, JournalEntry, Milestone, Resolution,
};

const NOW: &str = "2026-01-01T12:00:00.000Z";

fn resolution_with(states: &[bool]) -> Resolution {
    let mut resolution = Resolution::new("goal", "");
    for (index, completed) in states.iter().enumerate() {
        let mut milestone = Milestone::new(format!("step {index}"), None);
        milestone.completed = *completed;
        resolution.milestones.push(milestone);
    }
    resolution
}

#[test]
fn new_resolution_sets_defaults() {
    let resolution = Resolution::new("Learn French", "B1 by December");

    assert!(!resolution.id.is_empty());
    assert_eq!(resolution.title, "Learn French");
    assert_eq!(resolution.description, "B1 by December");
    assert_eq!(resolution.whats_next, "");
    assert!(resolution.milestones.is_empty());
    assert!(resolution.journal_entries.is_empty());
    assert!(resolution.created_at_utc().is_some());
    assert_eq!(resolution.completed_at, None);
}

#[test]
fn constructors_accept_empty_strings_without_validation() {
    let resolution = Resolution::new("", "");
    let milestone = Milestone::new("", None);
    let entry = JournalEntry::new("  padded  ");

    assert_eq!(resolution.title, "");
    assert_eq!(milestone.title, "");
    assert!(!milestone.completed);
    assert_eq!(milestone.completed_at, None);
    assert_eq!(entry.text, "  padded  ");
}

#[test]
fn constructors_generate_distinct_ids() {
    let first = Resolution::new("a", "");
    let second = Resolution::new("a", "");
    assert_ne!(first.id, second.id);
    assert_ne!(Milestone::new("m", None).id, Milestone::new("m", None).id);
}

#[test]
fn empty_milestones_are_never_complete() {
    let resolution = resolution_with(&[]);
    assert!(!is_complete(&resolution));
    assert_eq!(completion_status(&resolution), CompletionStatus::NotStarted);
}

#[test]
fn zero_completed_is_not_started() {
    let resolution = resolution_with(&[false, false, false]);
    assert!(!is_complete(&resolution));
    assert_eq!(completion_status(&resolution), CompletionStatus::NotStarted);
}

#[test]
fn all_completed_is_complete() {
    for total in 1..=4 {
        let resolution = resolution_with(&vec![true; total]);
        assert!(is_complete(&resolution), "total={total}");
        assert_eq!(completion_status(&resolution), CompletionStatus::Complete);
    }
}

#[test]
fn partially_completed_is_in_progress() {
    for states in [
        vec![true, false],
        vec![false, true, false],
        vec![true, true, false],
    ] {
        let resolution = resolution_with(&states);
        assert!(!is_complete(&resolution));
        assert_eq!(completion_status(&resolution), CompletionStatus::InProgress);
    }
}

#[test]
fn learn_french_transitions_through_every_status() {
    let mut resolution = Resolution::new("Learn French", "");
    resolution.milestones.push(Milestone::new("Finish A1 course", None));
    resolution
        .milestones
        .push(Milestone::new("Hold a 10 minute conversation", None));
    let first = resolution.milestones[0].id.clone();
    let second = resolution.milestones[1].id.clone();

    assert_eq!(resolution.completion_status(), CompletionStatus::NotStarted);

    assert!(resolution.toggle_milestone(&first, NOW));
    assert!(!resolution.is_complete());
    assert_eq!(resolution.completion_status(), CompletionStatus::InProgress);

    assert!(resolution.toggle_milestone(&second, NOW));
    assert!(resolution.is_complete());
    assert_eq!(resolution.completion_status(), CompletionStatus::Complete);
    assert_eq!(resolution.progress().completed, 2);
    assert_eq!(resolution.progress().total, 2);
}

#[test]
fn journal_entries_are_most_recent_first() {
    let mut resolution = Resolution::new("Write", "");
    let older = JournalEntry::new("day one");
    let newer = JournalEntry::new("day two");

    resolution.add_journal_entry(older.clone());
    resolution.add_journal_entry(newer.clone());

    assert_eq!(resolution.journal_entries, vec![newer, older]);
}

#[test]
fn wire_fields_use_camel_case_and_omit_absent_options() {
    let mut resolution = Resolution::new("Run", "");
    resolution.milestones.push(Milestone::new("5k", Some("2026-06-01".to_string())));
    resolution.add_journal_entry(JournalEntry::new("felt good"));

    let json = serde_json::to_value(&resolution).unwrap();
    assert_eq!(json["whatsNext"], "");
    assert!(json["journalEntries"].is_array());
    assert!(json["createdAt"].is_string());
    assert!(json.get("completedAt").is_none());
    assert_eq!(json["milestones"][0]["targetDate"], "2026-06-01");
    assert_eq!(json["milestones"][0]["completed"], false);
    assert!(json["milestones"][0].get("completedAt").is_none());
    assert!(json["journalEntries"][0]["createdAt"].is_string());
}
