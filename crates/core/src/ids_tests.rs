use super::*;

#[test]
fn patch_id_displays_as_integer() {
    let id = PatchId::new(4521);
    assert_eq!(id.to_string(), "4521");
}

#[test]
fn patch_id_equality_is_by_value() {
    assert_eq!(PatchId::new(1), PatchId::new(1));
    assert_ne!(PatchId::new(1), PatchId::new(2));
}

#[test]
fn generated_ids_carry_their_prefix() {
    let id = QueueItemId::new();
    assert!(id.as_str().starts_with("qi-"));
    let id = TaskId::new();
    assert!(id.as_str().starts_with("tsk-"));
}

#[test]
fn ids_roundtrip_through_string() {
    let id = BranchId::new();
    let s = id.to_string();
    let parsed = BranchId::from_string(&s);
    assert_eq!(id, parsed);
}
