use super::*;

#[test]
fn new_store_is_idle_and_empty() {
    let store = TranscriptStore::new();
    assert_eq!(store.state(), ActionState::Idle);
    assert!(!store.busy());
    assert_eq!(store.text(), "");
}

#[test]
fn append_preserves_order_with_blank_line_separator() {
    let store = TranscriptStore::new();
    store.reset();
    store.append("first");
    store.append("second");
    store.append("third");

    assert_eq!(store.text(), "first\n\nsecond\n\nthird");
    assert_eq!(store.snapshot().lines, vec!["first", "second", "third"]);
}

#[test]
fn reset_twice_is_idempotent() {
    let store = TranscriptStore::new();
    store.reset();
    store.append("leftover");
    store.reset();
    store.reset();

    assert_eq!(store.text(), "");
    assert_eq!(store.state(), ActionState::Running);
    assert!(store.busy());
}

#[test]
fn finish_clears_busy_and_keeps_lines() {
    let store = TranscriptStore::new();
    store.reset();
    store.append("balance: 42");
    store.finish();

    assert_eq!(store.state(), ActionState::Succeeded);
    assert!(!store.busy());
    assert_eq!(store.text(), "balance: 42");
}

#[test]
fn fail_appends_notice_and_clears_busy() {
    let store = TranscriptStore::new();
    store.reset();
    store.append("signing message...");
    store.fail("An error occurred");

    assert_eq!(store.state(), ActionState::Failed);
    assert!(!store.busy());
    assert_eq!(store.text(), "signing message...\n\nAn error occurred");
}

#[test]
fn announce_replaces_transcript_and_goes_idle() {
    let store = TranscriptStore::new();
    store.reset();
    store.append("one");
    store.announce("Status: Wallet not connected. Please connect wallet first.");

    assert_eq!(store.state(), ActionState::Idle);
    assert_eq!(
        store.text(),
        "Status: Wallet not connected. Please connect wallet first."
    );
}

#[test]
fn subscribers_see_mutations_in_order() {
    let store = TranscriptStore::new();
    let mut events = store.subscribe();

    store.reset();
    store.append("a");
    store.finish();

    assert_eq!(events.try_recv().expect("reset"), TranscriptEvent::Reset);
    assert_eq!(
        events.try_recv().expect("append"),
        TranscriptEvent::Appended("a".to_string())
    );
    assert_eq!(events.try_recv().expect("finish"), TranscriptEvent::Finished);
    assert!(events.try_recv().is_err());
}

#[test]
fn watch_receiver_tracks_latest_snapshot() {
    let store = TranscriptStore::new();
    let watcher = store.watch();

    store.reset();
    store.append("latest");

    let snapshot = watcher.borrow().clone();
    assert_eq!(snapshot.text(), "latest");
    assert!(snapshot.busy());
}

#[test]
fn busy_after_maps_lifecycle_events() {
    assert_eq!(TranscriptEvent::Reset.busy_after(), Some(true));
    assert_eq!(TranscriptEvent::Appended("x".into()).busy_after(), None);
    assert_eq!(TranscriptEvent::Finished.busy_after(), Some(false));
    assert_eq!(
        TranscriptEvent::Failed {
            notice: "n".into()
        }
        .busy_after(),
        Some(false)
    );
}
