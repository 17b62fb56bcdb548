//! Client-side lists with optimistic mutations.
//!
//! A mutation is applied to the local list first, then sent. If the request
//! fails the list goes back to the snapshot taken before the change and the
//! error is returned to the caller. Nothing is retried.
//!
//! [`LatestFetch`] keeps at most one load in flight: starting a new one
//! aborts the superseded task so stale data never lands.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiClient, ProductQuery};
use crate::errors::ApiError;
use crate::form::{IpqcPatch, OqcPatch};
use crate::model::{DailyEntry, EntryFilter, EntryKind, Product, Role, User};

/// Anything listed by a stable id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for DailyEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Product {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Items as they were before an optimistic change.
#[derive(Debug, Clone)]
pub struct Snapshot<T>(Vec<T>);

#[derive(Debug, Clone)]
pub struct OptimisticList<T> {
    items: Vec<T>,
}

impl<T> Default for OptimisticList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Clone + Keyed> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|i| i.key() == key)
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Mutate the list and return what it looked like before.
    pub fn apply(&mut self, change: impl FnOnce(&mut Vec<T>)) -> Snapshot<T> {
        let snapshot = Snapshot(self.items.clone());
        change(&mut self.items);
        snapshot
    }

    /// Mutate one item. `None` when the key is not listed.
    pub fn update(&mut self, key: &str, change: impl FnOnce(&mut T)) -> Option<Snapshot<T>> {
        let idx = self.items.iter().position(|i| i.key() == key)?;
        Some(self.apply(|items| change(&mut items[idx])))
    }

    pub fn remove(&mut self, key: &str) -> Option<Snapshot<T>> {
        self.get(key)?;
        Some(self.apply(|items| items.retain(|i| i.key() != key)))
    }

    pub fn rollback(&mut self, snapshot: Snapshot<T>) {
        self.items = snapshot.0;
    }
}

/// Roll back on failure and hand the result through.
fn settle<T: Clone + Keyed, R>(
    list: &mut OptimisticList<T>,
    snapshot: Option<Snapshot<T>>,
    result: Result<R, ApiError>,
    what: &str,
) -> Result<R, ApiError> {
    if let Err(e) = &result {
        warn!(error = %e, "{} failed, rolling back", what);
        if let Some(snapshot) = snapshot {
            list.rollback(snapshot);
        }
    }
    result
}

/// Entries of one channel for one date/shift scope.
pub struct EntryBoard {
    client: ApiClient,
    kind: EntryKind,
    filter: EntryFilter,
    list: OptimisticList<DailyEntry>,
}

impl EntryBoard {
    pub fn new(client: ApiClient, kind: EntryKind, filter: EntryFilter) -> Self {
        Self {
            client,
            kind,
            filter,
            list: OptimisticList::default(),
        }
    }

    pub fn entries(&self) -> &[DailyEntry] {
        self.list.items()
    }

    pub fn get(&self, id: &str) -> Option<&DailyEntry> {
        self.list.get(id)
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        let entries = self.client.list_entries(self.kind, &self.filter).await?;
        debug!(count = entries.len(), kind = self.kind.as_str(), "entries loaded");
        self.list.replace(entries);
        Ok(())
    }

    pub async fn save_ipqc(&mut self, id: &str, patch: &IpqcPatch) -> Result<(), ApiError> {
        let snapshot = self.list.update(id, |e| patch.apply_to(e));
        let result = self.client.update_entry(id, patch).await.map(|_| ());
        settle(&mut self.list, snapshot, result, "entry update")
    }

    pub async fn save_oqc(&mut self, id: &str, patch: &OqcPatch) -> Result<(), ApiError> {
        let snapshot = self.list.update(id, |e| patch.apply_to(e));
        let result = self.client.update_entry(id, patch).await.map(|_| ());
        settle(&mut self.list, snapshot, result, "entry update")
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        let snapshot = self.list.remove(id);
        let result = self.client.delete_entry(id).await;
        settle(&mut self.list, snapshot, result, "entry delete")
    }
}

/// Product admin list with soft delete and restore.
pub struct ProductBoard {
    client: ApiClient,
    pub query: ProductQuery,
    list: OptimisticList<Product>,
    pub total: u64,
    pub pages: u32,
}

impl ProductBoard {
    pub fn new(client: ApiClient, query: ProductQuery) -> Self {
        Self {
            client,
            query,
            list: OptimisticList::default(),
            total: 0,
            pages: 1,
        }
    }

    pub fn products(&self) -> &[Product] {
        self.list.items()
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        let page = self.client.list_products(&self.query).await?;
        self.query.page = page.page;
        self.total = page.total;
        self.pages = page.pages;
        self.list.replace(page.items);
        Ok(())
    }

    /// Range of rows shown, 1-based, as "from..=to". `(0, 0)` when empty.
    pub fn shown_range(&self) -> (u64, u64) {
        let n = self.list.items().len() as u64;
        if n == 0 {
            return (0, 0);
        }
        let offset = (self.query.page.max(1) as u64 - 1) * self.query.take as u64;
        (offset + 1, offset + n)
    }

    pub async fn deactivate(&mut self, id: &str) -> Result<(), ApiError> {
        let snapshot = self.list.update(id, |p| p.is_active = false);
        let result = self.client.deactivate_product(id).await;
        settle(&mut self.list, snapshot, result, "product deactivate")
    }

    pub async fn restore(&mut self, id: &str) -> Result<(), ApiError> {
        let snapshot = self.list.update(id, |p| p.is_active = true);
        let result = self.client.restore_product(id).await.map(|_| ());
        settle(&mut self.list, snapshot, result, "product restore")
    }
}

pub struct UserBoard {
    client: ApiClient,
    list: OptimisticList<User>,
}

impl UserBoard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            list: OptimisticList::default(),
        }
    }

    pub fn users(&self) -> &[User] {
        self.list.items()
    }

    /// Case-insensitive match on name, email and role.
    pub fn filtered(&self, text: &str) -> Vec<&User> {
        let needle = text.trim().to_lowercase();
        self.list
            .items()
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || format!("{} {} {}", u.name, u.email, u.role)
                        .to_lowercase()
                        .contains(&needle)
            })
            .collect()
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        let users = self.client.list_users().await?;
        self.list.replace(users);
        Ok(())
    }

    pub async fn change_role(&mut self, id: &str, role: Role) -> Result<(), ApiError> {
        let snapshot = self.list.update(id, |u| u.role = role);
        let result = self.client.change_role(id, role).await;
        match settle(&mut self.list, snapshot, result, "role change") {
            Ok(updated) => {
                self.list.update(id, |u| *u = updated);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// At most one load in flight; a newer load aborts the older one.
pub struct LatestFetch<T> {
    in_flight: Option<JoinHandle<T>>,
}

impl<T> Default for LatestFetch<T> {
    fn default() -> Self {
        Self { in_flight: None }
    }
}

impl<T: Send + 'static> LatestFetch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<F>(&mut self, fetch: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.cancel();
        self.in_flight = Some(tokio::spawn(fetch));
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Wait for the latest load. `None` if nothing is running or it was cancelled.
    pub async fn finish(&mut self) -> Option<T> {
        let handle = self.in_flight.take()?;
        match handle.await {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!(error = %e, "fetch task failed");
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            debug!("aborting superseded fetch");
            prev.abort();
        }
    }
}

impl<T> Drop for LatestFetch<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
