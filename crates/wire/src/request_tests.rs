// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn enqueue_patch_round_trips() {
    let request = Request::EnqueuePatch { patch_id: 42, message_id: "msg-a".to_string() };
    let json = serde_json::to_string(&request).expect("serialize");
    let back: Request = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, request);
}

#[test]
fn query_request_nests_the_query_tag() {
    let request = Request::Query { query: Query::Peek };
    let json = serde_json::to_value(&request).expect("serialize");
    assert_eq!(json["type"], "Query");
    assert_eq!(json["query"]["type"], "Peek");
}
