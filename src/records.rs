//! Record fetching and mutation against the upstream authority.
//!
//! Nothing here caches: every call goes to the upstream, and callers re-fetch
//! after a mutation to observe the new state.
use std::collections::HashSet;

use secrecy::SecretString;
use serde::Serialize;
use tracing::{info, warn};

use crate::cloudflare::types::{DnsRecord, NewRecord, Zone};
use crate::error::AppError;
use crate::session::{Session, identifier};
use crate::upstream::DnsUpstream;

/// Largest page Cloudflare serves for the zone listing.
pub const ZONES_PER_PAGE: u32 = 50;

/// List every zone the token can see, following pagination.
pub async fn list_zones(
    upstream: &dyn DnsUpstream,
    token: &SecretString,
) -> Result<Vec<Zone>, AppError> {
    let mut zones = Vec::new();
    let mut page = 1;
    loop {
        let batch = upstream.list_zones(token, page, ZONES_PER_PAGE).await?;
        zones.extend(batch.items);
        if page >= batch.total_pages {
            break;
        }
        page += 1;
    }
    Ok(zones)
}

/// Fetch all records of the session's zone in upstream order.
///
/// Pages are requested with `per_page` and followed until exhausted. Records
/// without an id, and repeats of an id already seen on an earlier page, are
/// dropped so every returned id is unique and non-empty.
pub async fn fetch_records(
    upstream: &dyn DnsUpstream,
    session: &Session,
    per_page: u32,
) -> Result<Vec<DnsRecord>, AppError> {
    let mut records: Vec<DnsRecord> = Vec::new();
    let mut seen = HashSet::new();
    let mut page = 1;
    loop {
        let batch = upstream
            .list_records(session.token(), session.zone_id(), page, per_page)
            .await?;
        for record in batch.items {
            if record.id.is_empty() {
                warn!(zone = session.zone_id(), "dropping record without id");
                continue;
            }
            if seen.insert(record.id.clone()) {
                records.push(record);
            }
        }
        if page >= batch.total_pages {
            break;
        }
        page += 1;
    }
    Ok(records)
}

/// Create `records` one after another, stopping at the first failure.
///
/// Not idempotent: calling it twice creates every record twice. Returns the
/// number of records created.
pub async fn create_bulk(
    upstream: &dyn DnsUpstream,
    session: &Session,
    records: &[NewRecord],
) -> Result<usize, AppError> {
    if records.is_empty() {
        return Err(AppError::MissingParameter("records"));
    }

    for (created, record) in records.iter().enumerate() {
        if let Err(err) = upstream
            .create_record(session.token(), session.zone_id(), record)
            .await
        {
            warn!(
                zone = session.zone_id(),
                created,
                total = records.len(),
                "bulk create stopped: {err}"
            );
            return Err(match AppError::from(err) {
                AppError::Upstream { message } if created > 0 => AppError::upstream(format!(
                    "{message} (created {created} of {} records)",
                    records.len()
                )),
                other => other,
            });
        }
    }

    info!(zone = session.zone_id(), count = records.len(), "bulk create done");
    Ok(records.len())
}

/// Delete a single record. A record the upstream does not know is reported
/// as an upstream error with message "not found".
pub async fn delete_one(
    upstream: &dyn DnsUpstream,
    session: &Session,
    record_id: &str,
) -> Result<(), AppError> {
    let record_id = identifier("recordId", Some(record_id.to_string()))?;
    upstream
        .delete_record(session.token(), session.zone_id(), &record_id)
        .await?;
    Ok(())
}

/// What `delete_many` does when one delete fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Attempt every id regardless of earlier failures.
    #[default]
    Continue,
    /// Stop at the first failure; the remaining ids are reported as skipped.
    HaltOnError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDelete {
    pub id: String,
    pub error: String,
}

/// Aggregate result of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDelete>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl BulkOutcome {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Delete `ids` in order, one awaited call at a time.
///
/// Each delete is independent; per-id failures land in the outcome rather
/// than aborting the call.
pub async fn delete_many(
    upstream: &dyn DnsUpstream,
    session: &Session,
    ids: &[String],
    policy: DeletePolicy,
) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    let mut queue = ids.iter();

    while let Some(id) = queue.next() {
        match delete_one(upstream, session, id).await {
            Ok(()) => outcome.deleted.push(id.clone()),
            Err(err) => {
                warn!(zone = session.zone_id(), record = %id, "delete failed: {err}");
                outcome.failed.push(FailedDelete {
                    id: id.clone(),
                    error: err.user_message(),
                });
                if policy == DeletePolicy::HaltOnError {
                    outcome.skipped.extend(queue.by_ref().cloned());
                    break;
                }
            }
        }
    }

    if !outcome.is_empty() {
        info!(
            zone = session.zone_id(),
            deleted = outcome.deleted.len(),
            failed = outcome.failed.len(),
            skipped = outcome.skipped.len(),
            "bulk delete done"
        );
    }
    outcome
}
