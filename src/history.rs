//! Audit history helpers: resolving the final values of a history row,
//! labels, per-page action counts and CSV.

use serde_json::Value;

use crate::api::reports::HistoryPage;
use crate::api::{ApiClient, HistoryQuery};
use crate::board::LatestFetch;
use crate::errors::ApiError;
use crate::export::{CsvQuote, flatten, to_csv};
use crate::model::{EntryHistory, EntryKind, HistoryAction};

/// The three quantity keys and the note key shown for a channel.
pub fn final_keys(kind: EntryKind) -> [&'static str; 4] {
    match kind {
        EntryKind::Ipqc => ["beforeIpqc", "afterIpqc", "afterPostcured", "note"],
        EntryKind::Oqc => ["beforeOqc", "afterOqc", "onHoldOrReturn", "note"],
    }
}

fn present(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

/// Value after the recorded action: `changes[key].new`, else
/// `snapshot[key]`, else `Null`.
pub fn pick_final<'a>(row: &'a EntryHistory, key: &str) -> Option<&'a Value> {
    present(
        row.changes
            .as_ref()
            .and_then(|c| c.get(key))
            .and_then(|c| c.get("new")),
    )
    .or_else(|| present(row.snapshot.as_ref().and_then(|s| s.get(key))))
}

/// Final quantity; missing or non-numeric values read as 0.
pub fn final_qty(row: &EntryHistory, key: &str) -> u64 {
    match pick_final(row, key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn final_note(row: &EntryHistory) -> String {
    match pick_final(row, "note") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn product_size(row: &EntryHistory) -> Option<String> {
    if let Some(size) = row.product_size.as_ref().filter(|s| !s.is_empty()) {
        return Some(size.clone());
    }
    let snapshot = row.snapshot.as_ref()?;
    present(snapshot.pointer("/product/size"))
        .or_else(|| present(snapshot.get("size")))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `CODE — Name`, plus ` • size` when a size is known.
pub fn product_label(row: &EntryHistory) -> String {
    let mut label = format!("{} — {}", row.product_code, row.product_name);
    if let Some(size) = product_size(row) {
        label.push_str(" • ");
        label.push_str(&size);
    }
    label
}

/// Local display time of an ISO timestamp; the raw string when unparseable.
pub fn display_time(iso: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(iso)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%-d/%-m/%Y, %H.%M.%S")
                .to_string()
        })
        .unwrap_or_else(|_| iso.to_string())
}

/// Tally of actions on the loaded page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub create: u64,
    pub update: u64,
    pub delete: u64,
}

impl ActionCounts {
    pub fn tally(rows: &[EntryHistory]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.action {
                HistoryAction::Create => counts.create += 1,
                HistoryAction::Update => counts.update += 1,
                HistoryAction::Delete => counts.delete += 1,
            }
        }
        counts
    }
}

/// Number of pages for `total` rows, never less than one.
pub fn page_count(total: u64, take: u32) -> u64 {
    if take == 0 {
        return 1;
    }
    total.div_ceil(take as u64).max(1)
}

/// 1-based `(first, last)` row numbers of a page.
pub fn page_span(page: u32, take: u32, total: u64) -> (u64, u64) {
    let page = page.max(1) as u64;
    let take = take as u64;
    let first = (page - 1) * take + 1;
    let last = if total == 0 { page * take } else { (page * take).min(total) };
    (first, last)
}

pub fn history_csv(kind: EntryKind, rows: &[EntryHistory]) -> String {
    let [k1, k2, k3, _] = final_keys(kind);
    let qty_headers = match kind {
        EntryKind::Ipqc => ["Before IPQC", "After IPQC / Before Postcured", "After Postcured"],
        EntryKind::Oqc => ["Before OQC", "After OQC", "Hold/Return"],
    };
    let mut headers = vec!["Waktu", "Aksi", "Produk", "Tanggal", "Shift"];
    headers.extend(qty_headers);
    headers.extend(["Catatan", "User", "Role"]);

    let lines = rows.iter().map(|h| {
        vec![
            display_time(&h.created_at),
            h.action.as_str().to_string(),
            product_label(h),
            h.date.get(..10).unwrap_or(&h.date).to_string(),
            h.shift.to_string(),
            final_qty(h, k1).to_string(),
            final_qty(h, k2).to_string(),
            final_qty(h, k3).to_string(),
            flatten(&final_note(h)),
            h.by_user_id.clone(),
            h.by_role.to_string(),
        ]
    });
    to_csv(&headers, lines, CsvQuote::Always)
}

/// Pages through history; a new load supersedes one still running.
pub struct HistoryBrowser {
    client: ApiClient,
    pub query: HistoryQuery,
    fetch: LatestFetch<Result<HistoryPage, ApiError>>,
}

impl HistoryBrowser {
    pub fn new(client: ApiClient, query: HistoryQuery) -> Self {
        Self {
            client,
            query,
            fetch: LatestFetch::new(),
        }
    }

    /// Start loading the current query without waiting.
    pub fn request(&mut self) {
        let client = self.client.clone();
        let query = self.query.clone();
        self.fetch.start(async move { client.history(&query).await });
    }

    /// Load the current query. `Ok(None)` if it was superseded or cancelled.
    pub async fn load(&mut self) -> Result<Option<HistoryPage>, ApiError> {
        self.request();
        self.fetch.finish().await.transpose()
    }
}
