use super::*;

#[test]
fn terminal_states_match_the_six_failed_aborted_variants_plus_finished() {
    let terminal = [
        BranchStatus::Finished,
        BranchStatus::ApplyingFailed,
        BranchStatus::ApplyingAborted,
        BranchStatus::CompilingFailed,
        BranchStatus::CompilingAborted,
        BranchStatus::TestingFailed,
        BranchStatus::TestingAborted,
    ];
    for s in terminal {
        assert!(s.is_terminal(), "{s} should be terminal");
    }

    let non_terminal = [
        BranchStatus::New,
        BranchStatus::Applying,
        BranchStatus::Applied,
        BranchStatus::Compiling,
        BranchStatus::Compiled,
        BranchStatus::Testing,
        BranchStatus::Tested,
        BranchStatus::Notifying,
    ];
    for s in non_terminal {
        assert!(!s.is_terminal(), "{s} should not be terminal");
    }
}

#[test]
fn finished_is_terminal_but_not_a_failure() {
    assert!(BranchStatus::Finished.is_terminal());
    assert!(!BranchStatus::Finished.is_failure());
}

#[test]
fn failure_statuses_are_exactly_the_aborted_and_failed_variants() {
    assert!(BranchStatus::ApplyingFailed.is_failure());
    assert!(BranchStatus::CompilingAborted.is_failure());
    assert!(BranchStatus::TestingFailed.is_failure());
    assert!(!BranchStatus::Applied.is_failure());
}

#[test]
fn display_uses_hyphenated_source_strings() {
    assert_eq!(BranchStatus::CompilingFailed.to_string(), "compiling-failed");
    assert_eq!(BranchStatus::New.to_string(), "new");
}

#[test]
fn new_branch_starts_in_new_with_matching_timestamps() {
    let branch = Branch::new(PatchId::new(1), BranchId::new(), "cf/1", 1_000);
    assert_eq!(branch.status, BranchStatus::New);
    assert_eq!(branch.created_ms, 1_000);
    assert_eq!(branch.modified_ms, 1_000);
    assert!(branch.patch_count.is_none());
}

#[test]
fn touch_updates_modified_only() {
    let mut branch = Branch::new(PatchId::new(1), BranchId::new(), "cf/1", 1_000);
    branch.touch(2_000);
    assert_eq!(branch.created_ms, 1_000);
    assert_eq!(branch.modified_ms, 2_000);
}
