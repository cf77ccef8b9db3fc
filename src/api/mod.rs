pub mod dns;
pub mod zones;

use std::time::Instant;

use axum::{
    Extension, Json, Router,
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::info;

use crate::SharedState;

pub fn create_router(state: SharedState) -> Router {
    use crate::api::{dns, zones};

    Router::new()
        .route("/zones", post(zones::list_zones))
        .route(
            "/dnsrecords",
            get(dns::list_records).delete(dns::delete_record),
        )
        .route("/dnsrecords/bulk", post(dns::bulk_create))
        .route("/dnsrecords/bulk-delete", post(dns::bulk_delete))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(access_log))
        .layer(Extension(state))
}

/// Logs one line per request. Only the path is logged: the query string
/// carries the API token.
async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        target: "access",
        "{} {} {} {:.3}ms",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
