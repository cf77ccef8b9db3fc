use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cloudflare::types::*;
use crate::upstream::{DnsUpstream, Page, UpstreamError};

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

#[derive(Clone)]
pub struct CloudflareClient {
    http: Client,
    base_url: String, // e.g. "https://api.cloudflare.com/client/v4"
}

impl CloudflareClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("cfdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send an authorized request and unwrap the Cloudflare envelope.
    ///
    /// A non-2xx status or `success: false` becomes [`UpstreamError::Api`]
    /// carrying the first error message. A body that is not a Cloudflare
    /// envelope becomes [`UpstreamError::Transport`] whatever the status.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        token: &SecretString,
        what: &str,
    ) -> Result<CfEnvelope<T>, UpstreamError> {
        debug!("cloudflare {what}");
        let res = req
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(UpstreamError::transport)?;
        let status = res.status();
        let body = res.bytes().await.map_err(UpstreamError::transport)?;

        let envelope: CfEnvelope<T> = serde_json::from_slice(&body).map_err(|err| {
            UpstreamError::Transport(format!(
                "unparsable response to {what} ({status}): {err}"
            ))
        })?;

        // A 2xx envelope that omits `success` is taken at its status.
        if !status.is_success() || envelope.success == Some(false) {
            let message = envelope
                .errors
                .into_iter()
                .next()
                .map(|e| e.message)
                .unwrap_or_else(|| reason(status));
            debug!("cloudflare {what} failed with {status}");
            return Err(UpstreamError::api(status.as_u16(), message));
        }

        Ok(envelope)
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| format!("upstream returned {}", status.as_u16()))
}

fn page_of<T>(envelope: CfEnvelope<Vec<T>>) -> Page<T> {
    let total_pages = envelope
        .result_info
        .and_then(|info| info.total_pages)
        .unwrap_or(1)
        .max(1);
    Page {
        items: envelope.result.unwrap_or_default(),
        total_pages,
    }
}

#[async_trait]
impl DnsUpstream for CloudflareClient {
    async fn list_zones(
        &self,
        token: &SecretString,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Zone>, UpstreamError> {
        let req = self
            .http
            .get(self.url("zones"))
            .query(&[("page", page), ("per_page", per_page)]);
        let envelope = self.send::<Vec<Zone>>(req, token, "GET zones").await?;
        Ok(page_of(envelope))
    }

    async fn list_records(
        &self,
        token: &SecretString,
        zone_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<DnsRecord>, UpstreamError> {
        let req = self
            .http
            .get(self.url(&format!("zones/{zone_id}/dns_records")))
            .query(&[("page", page), ("per_page", per_page)]);
        let envelope = self
            .send::<Vec<DnsRecord>>(req, token, "GET dns_records")
            .await?;
        Ok(page_of(envelope))
    }

    async fn create_record(
        &self,
        token: &SecretString,
        zone_id: &str,
        record: &NewRecord,
    ) -> Result<DnsRecord, UpstreamError> {
        let req = self
            .http
            .post(self.url(&format!("zones/{zone_id}/dns_records")))
            .json(record);
        self.send::<DnsRecord>(req, token, "POST dns_records")
            .await?
            .result
            .ok_or_else(|| UpstreamError::Transport("no result in create response".into()))
    }

    async fn delete_record(
        &self,
        token: &SecretString,
        zone_id: &str,
        record_id: &str,
    ) -> Result<(), UpstreamError> {
        let req = self
            .http
            .delete(self.url(&format!("zones/{zone_id}/dns_records/{record_id}")));
        match self
            .send::<serde_json::Value>(req, token, "DELETE dns_records")
            .await
        {
            Ok(_) => Ok(()),
            Err(UpstreamError::Api { status: 404, .. }) => Err(UpstreamError::api(404, "not found")),
            Err(err) => Err(err),
        }
    }
}
