use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use axum::{
    Router,
    body::Body,
    extract::OriginalUri,
    http::{HeaderValue, Method, Response, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use cfdash::{
    AppState, SharedState, api,
    cloudflare::{CLOUDFLARE_API_BASE, CloudflareClient},
    config::{self, AppConfig, DEFAULT_RECORDS_PER_PAGE},
};
use clap::Parser;
use rust_embed::RustEmbed;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// Listen address for the HTTP server
    #[arg(long, value_name = "ADDR", env = "CFDASH_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// Cloudflare API base URL
    #[arg(long, value_name = "URL", env = "CFDASH_UPSTREAM_URL", default_value = CLOUDFLARE_API_BASE)]
    upstream_url: String,
    /// Timeout for each upstream request, in seconds
    #[arg(long, value_name = "SECS", env = "CFDASH_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
    /// Page size used when listing DNS records
    #[arg(long, value_name = "N", env = "CFDASH_RECORDS_PER_PAGE", default_value_t = DEFAULT_RECORDS_PER_PAGE)]
    records_per_page: u32,
    /// TOML file with the records a bulk add creates when the request names none
    #[arg(long, value_name = "PATH", env = "CFDASH_BULK_TEMPLATE")]
    bulk_template: Option<PathBuf>,
    /// Origin allowed to call the API cross-site (repeat for multiple values)
    #[arg(long = "allow-origin", value_name = "ORIGIN")]
    allow_origin: Vec<String>,
}

#[derive(RustEmbed)]
#[folder = "dist"]
struct EmbeddedDist;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = build_app_config(&cli)?;
    let state = init_shared_state(&cli, config)?;

    let spa_routes = get(frontend_handler).head(frontend_handler);
    let mut app = Router::new()
        .merge(api::create_router(state))
        .route("/", spa_routes.clone())
        .route("/{*path}", spa_routes);
    if let Some(cors) = build_cors(&cli.allow_origin)? {
        app = app.layer(cors);
    }

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind to {}", cli.listen))?;

    info!("listening on http://{}", listener.local_addr()?);
    info!("upstream: {}", cli.upstream_url);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

fn init_shared_state(cli: &Cli, config: AppConfig) -> Result<SharedState> {
    let upstream = CloudflareClient::new(&cli.upstream_url, Duration::from_secs(cli.timeout_secs))
        .context("failed to build HTTP client")?;
    Ok(Arc::new(AppState::new(config, Arc::new(upstream))))
}

fn build_app_config(cli: &Cli) -> Result<AppConfig> {
    if cli.records_per_page == 0 {
        bail!("--records-per-page must be at least 1");
    }
    if cli.timeout_secs == 0 {
        bail!("--timeout-secs must be at least 1");
    }

    let bulk_template = match &cli.bulk_template {
        Some(path) => {
            let records = config::load_bulk_template(path)?;
            info!(
                "loaded {} bulk template record(s) from {}",
                records.len(),
                path.display()
            );
            records
        }
        None => Vec::new(),
    };

    Ok(AppConfig {
        records_per_page: cli.records_per_page,
        bulk_template,
    })
}

fn build_cors(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim_end_matches('/'))
                .with_context(|| format!("invalid allow-origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]),
    ))
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

async fn frontend_handler(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path().trim_start_matches('/');
    if path.contains("..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let candidate = if path.is_empty() { "index.html" } else { path };
    if let Some(resp) = embedded_response(candidate, &method) {
        return resp;
    }
    if let Some(resp) = embedded_response("index.html", &method) {
        return resp;
    }

    StatusCode::NOT_FOUND.into_response()
}

fn embedded_response(path: &str, method: &Method) -> Option<Response<Body>> {
    let asset = EmbeddedDist::get(path)?;
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(asset.data.into_owned())
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "no-cache")
        .header(
            header::CONTENT_SECURITY_POLICY,
            "default-src 'self'; base-uri 'self'; frame-ancestors 'none'; form-action 'self'; \
             script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; \
             connect-src 'self'; object-src 'none'",
        )
        .header(header::REFERRER_POLICY, "no-referrer")
        .body(body)
        .ok()
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
