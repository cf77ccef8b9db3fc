//! Zone listing for a pasted token.
use axum::{Extension, Json, extract::rejection::JsonRejection};
use serde::Deserialize;

use crate::SharedState;
use crate::cloudflare::types::Zone;
use crate::error::AppError;
use crate::records;
use crate::session::credential;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonesRequest {
    pub api_key: Option<String>,
}

// POST /zones
pub async fn list_zones(
    Extension(state): Extension<SharedState>,
    body: Result<Json<ZonesRequest>, JsonRejection>,
) -> Result<Json<Vec<Zone>>, AppError> {
    let Json(req) = body.map_err(|e| AppError::bad_request(e.body_text()))?;
    let token = credential(req.api_key)?;

    let zones = records::list_zones(state.upstream.as_ref(), &token).await?;
    Ok(Json(zones))
}
