//! Crate entrypoint wiring together configuration, the Cloudflare client, and APIs.

pub mod api;
pub mod cloudflare;
pub mod config;
pub mod controller;
pub mod error;
pub mod records;
pub mod session;
pub mod upstream;
pub mod validation;

use config::AppConfig;
use controller::MutationGate;
use upstream::DnsUpstream;

use std::sync::Arc;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub upstream: Arc<dyn DnsUpstream>,
    pub gate: Arc<MutationGate>,
}

impl AppState {
    pub fn new(config: AppConfig, upstream: Arc<dyn DnsUpstream>) -> Self {
        Self {
            config,
            upstream,
            gate: Arc::new(MutationGate::new()),
        }
    }
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
