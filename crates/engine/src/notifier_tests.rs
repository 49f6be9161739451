// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cfbot_core::{BranchId, PatchId};

#[tokio::test]
async fn logging_notifier_does_not_panic_on_a_fresh_branch() {
    let branch = Branch::new(PatchId::new(1), BranchId::new(), "cf/1", 0);
    LoggingNotifier.branch_tested(&branch).await;
}
