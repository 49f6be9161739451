use super::*;

fn pid(n: i64) -> PatchId {
    PatchId::new(n)
}

#[test]
fn insert_into_empty_ring_becomes_singleton_and_cursor() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let outcome = ring.insert(a, pid(1), "m1", 1_000);
    assert_eq!(outcome, InsertOutcome::Inserted(a));
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.cursor(), Some(a));
    assert_eq!(ring.get_first(), Some(a));
    assert_eq!(ring.get_last(), Some(a));
}

#[test]
fn reinserting_same_message_id_is_a_no_op() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 1_000);
    let b = QueueItemId::new();
    let outcome = ring.insert(b, pid(1), "m1", 2_000);
    assert_eq!(outcome, InsertOutcome::Unchanged(a));
    assert_eq!(ring.len(), 1);
}

#[test]
fn patch_set_replacement_lands_right_after_unprocessed_cursor() {
    // Scenario: insert(5, m1); insert(7, m2); insert(5, m3).
    // 5/m1 starts as the lone, unprocessed item and stays at the cursor, so
    // 7/m2 lands immediately after it. Replacing 5 with m3 removes 5/m1 (the
    // cursor advances to 7/m2) and the fresh item lands right after the
    // cursor again, i.e. still right after 7/m2.
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    ring.insert(a, pid(5), "m1", 1_000);

    let b = QueueItemId::new();
    ring.insert(b, pid(7), "m2", 1_001);
    assert_eq!(ring.iter_from_first(), vec![a, b]);

    let c = QueueItemId::new();
    let outcome = ring.insert(c, pid(5), "m3", 1_002);
    assert_eq!(outcome, InsertOutcome::Inserted(c));

    assert_eq!(ring.len(), 2);
    assert!(ring.find_by_patch(pid(5)).is_some());
    assert_eq!(ring.cursor(), Some(b));
    assert_eq!(ring.iter_from_first(), vec![b, c]);
    assert_eq!(ring.get(c).unwrap().message_id, "m3");
}

#[test]
fn insert_after_a_fully_processed_lap_appends_at_the_tail() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let b = QueueItemId::new();
    let c = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.insert(b, pid(2), "m2", 0);
    ring.insert(c, pid(3), "m3", 0);

    // Process a full lap: a, b, c, then wrap back to a.
    ring.get_and_advance(10);
    ring.get_and_advance(11);
    ring.get_and_advance(12);
    assert_eq!(ring.cursor(), Some(a));

    let d = QueueItemId::new();
    ring.insert(d, pid(4), "m4", 13);
    assert_eq!(ring.iter_from_first(), vec![a, b, c, d]);
}

#[test]
fn get_and_advance_walks_forward_and_wraps() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let b = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.insert(b, pid(2), "m2", 0);

    let (got, new_cursor) = ring.get_and_advance(100);
    assert_eq!(got, Some(a));
    assert_eq!(new_cursor, Some(b));
    assert!(ring.get(a).unwrap().processed_at_ms.is_some());

    let (got, new_cursor) = ring.get_and_advance(101);
    assert_eq!(got, Some(b));
    assert_eq!(new_cursor, Some(a));
}

#[test]
fn get_and_advance_skips_ignored_items() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let b = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.insert(b, pid(2), "m2", 0);
    ring.set_ignored(a, 5);

    let (got, new_cursor) = ring.get_and_advance(10);
    assert_eq!(got, Some(b));
    assert_eq!(new_cursor, Some(a));
    assert!(ring.get(a).unwrap().processed_at_ms.is_some());
}

#[test]
fn get_and_advance_on_all_ignored_ring_returns_none() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.set_ignored(a, 0);

    assert_eq!(ring.get_and_advance(10), (None, None));
}

#[test]
fn get_and_advance_on_multi_item_all_ignored_ring_returns_none() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let b = QueueItemId::new();
    let c = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.insert(b, pid(2), "m2", 0);
    ring.insert(c, pid(3), "m3", 0);
    ring.set_ignored(a, 5);
    ring.set_ignored(b, 5);
    ring.set_ignored(c, 5);

    assert_eq!(ring.get_and_advance(10), (None, None));
    assert!(ring.get(a).unwrap().processed_at_ms.is_some());
    assert!(ring.get(b).unwrap().processed_at_ms.is_some());
    assert!(ring.get(c).unwrap().processed_at_ms.is_some());
}

#[test]
fn empty_ring_get_and_advance_is_none() {
    let mut ring = QueueRing::new();
    assert_eq!(ring.get_and_advance(0), (None, None));
    assert_eq!(ring.peek(), None);
    assert_eq!(ring.get_first(), None);
}

#[test]
fn remove_at_cursor_advances_to_next() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let b = QueueItemId::new();
    let c = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.insert(b, pid(2), "m2", 0);
    ring.insert(c, pid(3), "m3", 0);
    assert_eq!(ring.cursor(), Some(a));

    ring.remove(a).unwrap();
    assert_eq!(ring.cursor(), Some(b));
    assert_eq!(ring.iter_from_first(), vec![b, c]);
    assert_eq!(ring.get_first(), Some(b));
}

#[test]
fn remove_at_cursor_wraps_when_tail() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    let b = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.insert(b, pid(2), "m2", 0);
    ring.get_and_advance(0); // cursor now at b

    ring.remove(b).unwrap();
    assert_eq!(ring.cursor(), Some(a));
    assert_eq!(ring.len(), 1);
}

#[test]
fn remove_last_item_empties_the_ring() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    ring.remove(a).unwrap();
    assert!(ring.is_empty());
    assert_eq!(ring.cursor(), None);
}

#[test]
fn remove_unknown_item_errors() {
    let mut ring = QueueRing::new();
    let ghost = QueueItemId::new();
    assert_eq!(ring.remove(ghost), Err(QueueError::NotFound(ghost)));
}

#[test]
fn set_last_base_commit_records_sha() {
    let mut ring = QueueRing::new();
    let a = QueueItemId::new();
    ring.insert(a, pid(1), "m1", 0);
    assert!(ring.set_last_base_commit(a, "deadbeef"));
    assert_eq!(ring.get(a).unwrap().last_base_commit.as_deref(), Some("deadbeef"));
    assert!(!ring.set_last_base_commit(QueueItemId::new(), "0000"));
}
