// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn tasks_query_serializes_with_tagged_type() {
    let query = Query::Tasks { branch_id: "brn-abc".to_string() };
    let json = serde_json::to_value(&query).expect("serialize");
    assert_eq!(json["type"], "Tasks");
    assert_eq!(json["branch_id"], "brn-abc");
}

#[test]
fn unit_variants_round_trip() {
    for query in [Query::Peek, Query::GetQueue, Query::Branches] {
        let json = serde_json::to_string(&query).expect("serialize");
        let back: Query = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, query);
    }
}
