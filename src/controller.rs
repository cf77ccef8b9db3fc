//! Record selection and bulk actions for one zone view.
//!
//! [`Selection`] tracks which records are checked. [`ZoneView`] owns the last
//! fetched record list, keeps the selection reconciled against it, and runs
//! bulk actions behind a per-zone [`MutationGate`] so the same zone never has
//! two bulk operations in flight.
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::cloudflare::types::{DnsRecord, NewRecord};
use crate::error::AppError;
use crate::records::{self, BulkOutcome, DeletePolicy};
use crate::session::Session;
use crate::upstream::DnsUpstream;

pub const ZONE_BUSY: &str = "a bulk operation is already running for this zone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    PartiallySelected,
    AllSelected,
}

/// Checked record ids, always a subset of the last reconciled record list.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    known: Vec<String>,
    checked: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `id`. Ids outside the current record list are ignored.
    /// Returns whether `id` is checked afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.known.iter().any(|k| k == id) {
            return false;
        }
        if self.checked.remove(id) {
            false
        } else {
            self.checked.insert(id.to_string());
            true
        }
    }

    pub fn select_all(&mut self) {
        self.checked = self.known.iter().cloned().collect();
    }

    pub fn deselect_all(&mut self) {
        self.checked.clear();
    }

    /// Header checkbox click.
    pub fn toggle_all(&mut self) {
        if self.state() == SelectionState::AllSelected {
            self.deselect_all();
        } else {
            self.select_all();
        }
    }

    /// Adopt a freshly fetched record list and drop checked ids that vanished.
    pub fn reconcile(&mut self, records: &[DnsRecord]) {
        self.known = records.iter().map(|r| r.id.clone()).collect();
        let known: HashSet<&str> = self.known.iter().map(String::as_str).collect();
        self.checked.retain(|id| known.contains(id.as_str()));
    }

    pub fn state(&self) -> SelectionState {
        if self.checked.is_empty() {
            SelectionState::Empty
        } else if self.checked.len() == self.known.len() {
            SelectionState::AllSelected
        } else {
            SelectionState::PartiallySelected
        }
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    /// Checked ids in record-list order.
    pub fn ids(&self) -> Vec<String> {
        self.known
            .iter()
            .filter(|id| self.checked.contains(*id))
            .cloned()
            .collect()
    }
}

/// Zones with a bulk mutation in flight.
#[derive(Debug, Default)]
pub struct MutationGate {
    zones: Mutex<HashSet<String>>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn zones(&self) -> MutexGuard<'_, HashSet<String>> {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `zone_id` busy. `None` if it already is. The mark is cleared when
    /// the returned guard drops, on success and failure paths alike.
    pub fn try_acquire(self: &Arc<Self>, zone_id: &str) -> Option<GateGuard> {
        if !self.zones().insert(zone_id.to_string()) {
            return None;
        }
        Some(GateGuard {
            gate: Arc::clone(self),
            zone_id: zone_id.to_string(),
        })
    }

    pub fn is_busy(&self, zone_id: &str) -> bool {
        self.zones().contains(zone_id)
    }
}

#[must_use]
pub struct GateGuard {
    gate: Arc<MutationGate>,
    zone_id: String,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.gate.zones().remove(&self.zone_id);
    }
}

#[derive(Debug, Default)]
struct ViewState {
    records: Vec<DnsRecord>,
    selection: Selection,
    error: Option<String>,
    loaded: bool,
}

/// Client-side state of one zone page.
pub struct ZoneView {
    upstream: Arc<dyn DnsUpstream>,
    gate: Arc<MutationGate>,
    session: Session,
    per_page: u32,
    state: Mutex<ViewState>,
    alive: AtomicBool,
}

impl ZoneView {
    pub fn new(
        upstream: Arc<dyn DnsUpstream>,
        gate: Arc<MutationGate>,
        session: Session,
        per_page: u32,
    ) -> Self {
        Self {
            upstream,
            gate,
            session,
            per_page,
            state: Mutex::new(ViewState::default()),
            alive: AtomicBool::new(true),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tear the view down. Calls still in flight run to completion upstream,
    /// but their results are no longer applied.
    pub fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Re-fetch the record list and reconcile the selection against it.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let result =
            records::fetch_records(self.upstream.as_ref(), &self.session, self.per_page).await;
        if !self.is_alive() {
            debug!(zone = self.session.zone_id(), "view closed, dropping fetch result");
            return result.map(|_| ());
        }

        let mut state = self.state();
        state.loaded = true;
        match result {
            Ok(records) => {
                state.selection.reconcile(&records);
                state.records = records;
                state.error = None;
                Ok(())
            }
            Err(err) => {
                state.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.state().records.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state().loaded
    }

    /// The one message the page shows, if any.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy(self.session.zone_id())
    }

    pub fn selection_state(&self) -> SelectionState {
        self.state().selection.state()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.state().selection.ids()
    }

    pub fn toggle(&self, id: &str) -> bool {
        self.state().selection.toggle(id)
    }

    pub fn select_all(&self) {
        self.state().selection.select_all();
    }

    pub fn deselect_all(&self) {
        self.state().selection.deselect_all();
    }

    pub fn toggle_all(&self) {
        self.state().selection.toggle_all();
    }

    fn acquire(&self) -> Result<GateGuard, AppError> {
        self.gate
            .try_acquire(self.session.zone_id())
            .ok_or_else(|| AppError::conflict(ZONE_BUSY))
    }

    /// Delete every selected record, clear the selection, then refresh.
    ///
    /// The selection is cleared even when some deletes fail; the refresh shows
    /// which records survived. An empty selection issues no upstream calls.
    pub async fn commit_bulk_delete(&self, policy: DeletePolicy) -> Result<BulkOutcome, AppError> {
        let _guard = self.acquire()?;

        let ids = self.selected_ids();
        if ids.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let outcome =
            records::delete_many(self.upstream.as_ref(), &self.session, &ids, policy).await;
        if self.is_alive() {
            self.state().selection.deselect_all();
        }

        if !self.is_alive() {
            debug!(zone = self.session.zone_id(), "view closed, skipping refresh");
            return Ok(outcome);
        }
        if let Err(err) = self.refresh().await {
            warn!(zone = self.session.zone_id(), "refresh after bulk delete failed: {err}");
        }

        match outcome.failed.first() {
            Some(first) => {
                self.state().error = Some(format!(
                    "failed to delete {} of {} records: {}",
                    outcome.failed.len(),
                    ids.len(),
                    first.error
                ));
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// Create `batch`, then refresh. Refreshes on failure too since part of
    /// the batch may already exist upstream. An empty batch is rejected
    /// before any upstream call.
    pub async fn create_bulk(&self, batch: &[NewRecord]) -> Result<usize, AppError> {
        if batch.is_empty() {
            return Err(AppError::MissingParameter("records"));
        }
        let _guard = self.acquire()?;

        let result = records::create_bulk(self.upstream.as_ref(), &self.session, batch).await;
        if !self.is_alive() {
            return result;
        }
        if let Err(err) = self.refresh().await {
            warn!(zone = self.session.zone_id(), "refresh after bulk create failed: {err}");
        }

        match &result {
            Err(err) => self.state().error = Some(err.user_message()),
            _ => {}
        }
        result
    }
}
