//! Record endpoints: list, delete one, bulk add, bulk delete.
use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Query, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::SharedState;
use crate::cloudflare::types::{DnsRecord, NewRecord};
use crate::controller::{GateGuard, ZONE_BUSY};
use crate::error::AppError;
use crate::records::{self, BulkOutcome, DeletePolicy};
use crate::session::{Session, identifier};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub api_key: Option<String>,
    pub zone_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub api_key: Option<String>,
    pub zone_id: Option<String>,
    pub record_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub api_key: Option<String>,
    pub zone_id: Option<String>,
    /// Falls back to the configured template when absent.
    pub records: Option<Vec<NewRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub api_key: Option<String>,
    pub zone_id: Option<String>,
    pub record_ids: Option<Vec<String>>,
    #[serde(default)]
    pub halt_on_error: bool,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub created: usize,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(req)| req)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

fn lock_zone(state: &SharedState, session: &Session) -> Result<GateGuard, AppError> {
    state
        .gate
        .try_acquire(session.zone_id())
        .ok_or_else(|| AppError::conflict(ZONE_BUSY))
}

// GET /dnsrecords?apiKey=&zoneId=
pub async fn list_records(
    Extension(state): Extension<SharedState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Vec<DnsRecord>>, AppError> {
    let session = Session::new(query.api_key, query.zone_id)?;
    let records = records::fetch_records(
        state.upstream.as_ref(),
        &session,
        state.config.records_per_page,
    )
    .await?;
    Ok(Json(records))
}

// DELETE /dnsrecords?apiKey=&zoneId=&recordId=
pub async fn delete_record(
    Extension(state): Extension<SharedState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeletedResponse>, AppError> {
    let session = Session::new(query.api_key, query.zone_id)?;
    let record_id = identifier("recordId", query.record_id)?;

    records::delete_one(state.upstream.as_ref(), &session, &record_id).await?;
    Ok(Json(DeletedResponse { deleted: record_id }))
}

// POST /dnsrecords/bulk
pub async fn bulk_create(
    Extension(state): Extension<SharedState>,
    body: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let req = json_body(body)?;
    let session = Session::new(req.api_key, req.zone_id)?;
    let batch = req
        .records
        .unwrap_or_else(|| state.config.bulk_template.clone());
    if batch.is_empty() {
        return Err(AppError::MissingParameter("records"));
    }

    let _guard = lock_zone(&state, &session)?;
    let created = records::create_bulk(state.upstream.as_ref(), &session, &batch).await?;
    Ok(Json(CreatedResponse { created }))
}

// POST /dnsrecords/bulk-delete
pub async fn bulk_delete(
    Extension(state): Extension<SharedState>,
    body: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> Result<Json<BulkOutcome>, AppError> {
    let req = json_body(body)?;
    let session = Session::new(req.api_key, req.zone_id)?;
    let ids = req
        .record_ids
        .ok_or(AppError::MissingParameter("recordIds"))?;

    let mut seen = HashSet::new();
    let ids: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    let policy = if req.halt_on_error {
        DeletePolicy::HaltOnError
    } else {
        DeletePolicy::Continue
    };

    let _guard = lock_zone(&state, &session)?;
    let outcome = records::delete_many(state.upstream.as_ref(), &session, &ids, policy).await;
    Ok(Json(outcome))
}
