#![allow(clippy::unwrap_used)]
// Fetch and mutation flows against an in-memory upstream.

mod common;

use std::collections::HashSet;

use pretty_assertions::assert_eq;

use cfdash::cloudflare::types::Zone;
use cfdash::error::AppError;
use cfdash::records::{
    self, BulkOutcome, DeletePolicy, FailedDelete, create_bulk, delete_many, delete_one,
    fetch_records,
};
use cfdash::session::credential;

use common::{FakeUpstream, TOKEN, new_record, record, session};

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_preserves_upstream_order() {
    let upstream = FakeUpstream::with_records(&["r2", "r1", "r3"]);

    let records = fetch_records(&upstream, &session(), 5000).await.unwrap();

    let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(got, vec!["r2", "r1", "r3"]);
    assert_eq!(records[1], record("r1"));
    assert_eq!(upstream.list_calls(), 1);
}

#[tokio::test]
async fn fetch_follows_pages_until_exhausted() {
    let upstream = FakeUpstream::with_records(&["a", "b", "c", "d", "e"]);

    let records = fetch_records(&upstream, &session(), 2).await.unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(upstream.list_calls(), 3);
    let unique: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(unique.len(), 5);
    assert!(records.iter().all(|r| !r.id.is_empty()));
}

#[tokio::test]
async fn fetch_drops_empty_and_repeated_ids() {
    let upstream = FakeUpstream::with_records(&["r1", "", "r2", "r1"]);

    let records = fetch_records(&upstream, &session(), 5000).await.unwrap();

    let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(got, vec!["r1", "r2"]);
}

#[tokio::test]
async fn fetch_surfaces_upstream_rejection() {
    let upstream = FakeUpstream::with_records(&["r1"]);
    let bad = cfdash::session::Session::new(Some("wrong".into()), Some("zone_1".into())).unwrap();

    let err = fetch_records(&upstream, &bad, 5000).await.unwrap_err();

    assert_eq!(err, AppError::upstream("Invalid API Token"));
}

// ── Zones ───────────────────────────────────────────────────────────

#[tokio::test]
async fn zones_are_listed_across_pages() {
    let upstream = FakeUpstream {
        zones: (0..120)
            .map(|i| Zone {
                id: format!("z{i}"),
                name: format!("example{i}.com"),
            })
            .collect(),
        ..FakeUpstream::default()
    };

    let zones = records::list_zones(&upstream, &credential(Some(TOKEN.into())).unwrap())
        .await
        .unwrap();

    assert_eq!(zones.len(), 120);
    assert_eq!(zones[119].id, "z119");
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_create_creates_every_record() {
    let upstream = FakeUpstream::with_records(&[]);
    let batch = vec![new_record("www"), new_record("api")];

    let created = create_bulk(&upstream, &session(), &batch).await.unwrap();

    assert_eq!(created, 2);
    assert_eq!(upstream.ids(), ids(&["new0", "new1"]));
}

#[tokio::test]
async fn bulk_create_is_not_idempotent() {
    let upstream = FakeUpstream::with_records(&[]);
    let batch = vec![new_record("www")];

    create_bulk(&upstream, &session(), &batch).await.unwrap();
    create_bulk(&upstream, &session(), &batch).await.unwrap();

    assert_eq!(upstream.ids().len(), 2);
}

#[tokio::test]
async fn bulk_create_stops_at_first_failure() {
    let upstream = FakeUpstream {
        create_limit: Some(1),
        ..FakeUpstream::default()
    };
    let batch = vec![new_record("a"), new_record("b"), new_record("c")];

    let err = create_bulk(&upstream, &session(), &batch).await.unwrap_err();

    assert_eq!(
        err,
        AppError::upstream("quota exceeded (created 1 of 3 records)")
    );
    assert_eq!(upstream.ids(), ids(&["new0"]));
}

#[tokio::test]
async fn bulk_create_without_records_is_missing_parameter() {
    let upstream = FakeUpstream::default();

    let err = create_bulk(&upstream, &session(), &[]).await.unwrap_err();

    assert_eq!(err, AppError::MissingParameter("records"));
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_of_unknown_record_is_not_found() {
    let upstream = FakeUpstream::with_records(&["r1"]);

    let err = delete_one(&upstream, &session(), "ghost").await.unwrap_err();

    assert_eq!(err, AppError::upstream("not found"));
    assert_eq!(upstream.ids(), ids(&["r1"]));
}

#[tokio::test]
async fn delete_many_of_nothing_is_a_no_op() {
    let upstream = FakeUpstream::with_records(&["r1"]);

    let outcome = delete_many(&upstream, &session(), &[], DeletePolicy::Continue).await;

    assert_eq!(outcome, BulkOutcome::default());
    assert!(upstream.deletes().is_empty());
}

#[tokio::test]
async fn delete_many_continues_past_a_failure() {
    let upstream = FakeUpstream::with_records(&["r1", "r2", "r3"]).failing("r2");

    let outcome = delete_many(
        &upstream,
        &session(),
        &ids(&["r1", "r2", "r3"]),
        DeletePolicy::Continue,
    )
    .await;

    assert_eq!(outcome.deleted, ids(&["r1", "r3"]));
    assert_eq!(
        outcome.failed,
        vec![FailedDelete {
            id: "r2".into(),
            error: "rate limited".into(),
        }]
    );
    assert!(!outcome.is_complete_success());

    let after = fetch_records(&upstream, &session(), 5000).await.unwrap();
    let remaining: Vec<&str> = after.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(remaining, vec!["r2"]);
}

#[tokio::test]
async fn delete_many_can_halt_on_error() {
    let upstream = FakeUpstream::with_records(&["r1", "r2", "r3"]).failing("r2");

    let outcome = delete_many(
        &upstream,
        &session(),
        &ids(&["r1", "r2", "r3"]),
        DeletePolicy::HaltOnError,
    )
    .await;

    assert_eq!(outcome.deleted, ids(&["r1"]));
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.skipped, ids(&["r3"]));
    assert_eq!(upstream.deletes(), ids(&["r1", "r2"]));
}

#[tokio::test]
async fn delete_many_reports_invalid_ids_without_calling_upstream() {
    let upstream = FakeUpstream::with_records(&["r1"]);

    let outcome = delete_many(
        &upstream,
        &session(),
        &ids(&["../zones", "r1"]),
        DeletePolicy::Continue,
    )
    .await;

    assert_eq!(outcome.deleted, ids(&["r1"]));
    assert_eq!(outcome.failed[0].id, "../zones");
    assert_eq!(upstream.deletes(), ids(&["r1"]));
}
