//! The seam between the dashboard and the authoritative DNS API.
use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::cloudflare::types::{DnsRecord, NewRecord, Zone};

/// One page of a paginated upstream listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of pages the upstream reports; 1 when it reports none.
    pub total_pages: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The upstream answered with a structured failure.
    #[error("upstream error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The upstream could not be reached or its answer could not be read.
    #[error("transport error: {0}")]
    Transport(String),
}

impl UpstreamError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        UpstreamError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        UpstreamError::Transport(err.to_string())
    }
}

/// Operations the dashboard needs from the DNS authority.
///
/// Every call receives the bearer token explicitly; implementations must not
/// retain it beyond the call.
#[async_trait]
pub trait DnsUpstream: Send + Sync {
    async fn list_zones(
        &self,
        token: &SecretString,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Zone>, UpstreamError>;

    async fn list_records(
        &self,
        token: &SecretString,
        zone_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<DnsRecord>, UpstreamError>;

    async fn create_record(
        &self,
        token: &SecretString,
        zone_id: &str,
        record: &NewRecord,
    ) -> Result<DnsRecord, UpstreamError>;

    async fn delete_record(
        &self,
        token: &SecretString,
        zone_id: &str,
        record_id: &str,
    ) -> Result<(), UpstreamError>;
}
