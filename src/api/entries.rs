//! `/entries` endpoints.

use serde::Serialize;

use super::{ApiClient, Query};
use crate::errors::ApiError;
use crate::model::{DailyEntry, EntryFilter, EntryKind, ListEnvelope, NewEntry, PreviousQty, Shift};

impl ApiClient {
    /// Entries of one channel for a date/shift scope.
    pub async fn list_entries(&self, kind: EntryKind, filter: &EntryFilter) -> Result<Vec<DailyEntry>, ApiError> {
        let mut query: Query = vec![("type", kind.as_str().to_string())];
        query.extend(filter.query_pairs());
        let list: ListEnvelope<DailyEntry> = self.get("/entries", &query).await?;
        Ok(list.into_items())
    }

    pub async fn create_entry(&self, entry: &NewEntry) -> Result<DailyEntry, ApiError> {
        self.post("/entries", entry).await
    }

    /// Send a partial update. The body is any of the row patches.
    pub async fn update_entry<P: Serialize>(&self, id: &str, patch: &P) -> Result<serde_json::Value, ApiError> {
        self.patch(&format!("/entries/{}", id), patch).await
    }

    pub async fn delete_entry(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/entries/{}", id)).await.map(|_| ())
    }

    /// Carry-over quantities from the shift before `date`/`shift`.
    pub async fn previous_qty(&self, product_id: &str, date: &str, shift: Shift) -> Result<PreviousQty, ApiError> {
        let query: Query = vec![
            ("productId", product_id.to_string()),
            ("date", date.to_string()),
            ("shift", shift.as_str().to_string()),
        ];
        self.get("/entries/previous-qty", &query).await
    }
}
