#![allow(dead_code)]
// In-memory stand-in for the DNS authority.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use cfdash::cloudflare::types::{DnsRecord, NewRecord, Zone};
use cfdash::session::Session;
use cfdash::upstream::{DnsUpstream, Page, UpstreamError};

pub const TOKEN: &str = "tok_abc";
pub const ZONE: &str = "zone_1";

pub fn record(id: &str) -> DnsRecord {
    DnsRecord {
        id: id.into(),
        record_type: "A".into(),
        name: format!("{id}.example.com"),
        content: "1.2.3.4".into(),
        ttl: 300,
        proxied: true,
    }
}

pub fn new_record(name: &str) -> NewRecord {
    NewRecord {
        record_type: "A".into(),
        name: name.into(),
        content: "192.0.2.1".into(),
        ttl: 1,
        proxied: false,
    }
}

pub fn session() -> Session {
    Session::new(Some(TOKEN.into()), Some(ZONE.into())).unwrap()
}

#[derive(Default)]
pub struct FakeUpstream {
    pub zones: Vec<Zone>,
    pub records: Mutex<Vec<DnsRecord>>,
    /// Deletes of these ids fail with an upstream error.
    pub failing_deletes: HashSet<String>,
    /// Creates fail once this many records have been created.
    pub create_limit: Option<usize>,
    pub list_calls: AtomicUsize,
    pub delete_calls: Mutex<Vec<String>>,
    pub create_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn with_records(ids: &[&str]) -> Self {
        Self {
            records: Mutex::new(ids.iter().map(|id| record(id)).collect()),
            ..Self::default()
        }
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing_deletes.insert(id.into());
        self
    }

    pub fn ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    fn check_token(token: &SecretString) -> Result<(), UpstreamError> {
        if token.expose_secret() == TOKEN {
            Ok(())
        } else {
            Err(UpstreamError::api(403, "Invalid API Token"))
        }
    }
}

fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1) as usize;
    let total_pages = items.len().div_ceil(per_page).max(1) as u32;
    let start = (page.saturating_sub(1) as usize) * per_page;
    Page {
        items: items.iter().skip(start).take(per_page).cloned().collect(),
        total_pages,
    }
}

#[async_trait]
impl DnsUpstream for FakeUpstream {
    async fn list_zones(
        &self,
        token: &SecretString,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Zone>, UpstreamError> {
        Self::check_token(token)?;
        Ok(paginate(&self.zones, page, per_page))
    }

    async fn list_records(
        &self,
        token: &SecretString,
        _zone_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<DnsRecord>, UpstreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Self::check_token(token)?;
        let records = self.records.lock().unwrap().clone();
        Ok(paginate(&records, page, per_page))
    }

    async fn create_record(
        &self,
        token: &SecretString,
        _zone_id: &str,
        record: &NewRecord,
    ) -> Result<DnsRecord, UpstreamError> {
        Self::check_token(token)?;
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.create_limit.is_some_and(|limit| n >= limit) {
            return Err(UpstreamError::api(400, "quota exceeded"));
        }
        let created = DnsRecord {
            id: format!("new{n}"),
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            content: record.content.clone(),
            ttl: record.ttl,
            proxied: record.proxied,
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_record(
        &self,
        token: &SecretString,
        _zone_id: &str,
        record_id: &str,
    ) -> Result<(), UpstreamError> {
        Self::check_token(token)?;
        self.delete_calls.lock().unwrap().push(record_id.to_string());
        if self.failing_deletes.contains(record_id) {
            return Err(UpstreamError::api(429, "rate limited"));
        }
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(UpstreamError::api(404, "not found"));
        }
        Ok(())
    }
}
