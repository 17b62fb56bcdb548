//! Wire types for the QC REST API.
//!
//! Field names follow the service's camelCase JSON. Counters are `u64`; the
//! service never stores negative quantities and the client never sends them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shift {
    #[default]
    S1,
    S2,
    S3,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
        }
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "S1" => Ok(Self::S1),
            "S2" => Ok(Self::S2),
            "S3" => Ok(Self::S3),
            _ => Err(format!("Invalid shift: {} (expected S1, S2 or S3)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Ipqc,
    Oqc,
    Master,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipqc => "IPQC",
            Self::Oqc => "OQC",
            Self::Master => "MASTER",
            Self::Admin => "ADMIN",
        }
    }

    /// Dashboard a user of this role lands on after login.
    pub fn home(&self) -> &'static str {
        match self {
            Self::Ipqc => "/ipqc",
            Self::Oqc => "/oqc",
            Self::Master => "/master",
            Self::Admin => "/admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IPQC" => Ok(Self::Ipqc),
            "OQC" => Ok(Self::Oqc),
            "MASTER" => Ok(Self::Master),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Which inspection channel an entry or history row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    Ipqc,
    Oqc,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipqc => "IPQC",
            Self::Oqc => "OQC",
        }
    }

    /// Lowercase prefix used in export file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Ipqc => "ipqc",
            Self::Oqc => "oqc",
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IPQC" => Ok(Self::Ipqc),
            "OQC" => Ok(Self::Oqc),
            _ => Err(format!("Invalid kind: {} (expected ipqc or oqc)", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub computer_code: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uom: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// `CODE — Name`, as shown in the product picker.
    pub fn label(&self) -> String {
        format!("{} — {}", self.computer_code, self.name)
    }
}

/// Create/update body for `/products`. Empty optionals are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
}

/// One page of `GET /products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub take: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub pages: u32,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub name: String,
    pub computer_code: String,
    #[serde(default)]
    pub size: Option<String>,
}

/// A persisted daily entry. Both the IPQC and OQC halves travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub date: String,
    pub shift: Shift,
    #[serde(default)]
    pub plant: Option<String>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub before_ipqc: u64,
    #[serde(default)]
    pub after_ipqc: u64,
    #[serde(default)]
    pub on_going_postcured: u64,
    #[serde(default)]
    pub after_postcured: u64,
    #[serde(default)]
    pub before_oqc: u64,
    #[serde(default)]
    pub after_oqc: u64,
    #[serde(default)]
    pub on_hold_or_return: u64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_by_user_id: Option<String>,
    #[serde(default)]
    pub created_by_role: Option<Role>,
    #[serde(default)]
    pub updated_by_user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DailyEntry {
    /// Date part of the entry (`YYYY-MM-DD`), regardless of how the service serialized it.
    pub fn day(&self) -> &str {
        self.date.get(..10).unwrap_or(&self.date)
    }

    pub fn note_or_empty(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }
}

/// Body of `POST /entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub product_id: String,
    pub date: String,
    pub shift: Shift,
    pub plant: Option<String>,
    pub line: Option<String>,
    pub role: Role,
    pub before_ipqc: u64,
    pub after_ipqc: u64,
    pub on_going_postcured: u64,
    pub after_postcured: u64,
    pub before_oqc: u64,
    pub after_oqc: u64,
    pub on_hold_or_return: u64,
    pub note: Option<String>,
}

/// Response of `GET /entries/previous-qty`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousQty {
    pub found: bool,
    #[serde(default)]
    pub before_ipqc: u64,
    #[serde(default)]
    pub after_ipqc: u64,
    #[serde(default)]
    pub on_going_postcured: u64,
    #[serde(default)]
    pub after_postcured: u64,
    #[serde(default)]
    pub previous_date: Option<String>,
    #[serde(default)]
    pub previous_shift: Option<String>,
    #[serde(default)]
    pub total_inputs: Option<u64>,
}

/// IPQC dashboard KPIs. Missing fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpqcSummary {
    pub total_before_ipqc: u64,
    pub total_after_ipqc: u64,
    pub total_on_going_postcured: u64,
    pub total_after_postcured: u64,
    pub total_before_oqc: u64,
    pub total_after_oqc: u64,
    pub total_hold_or_return: u64,
    pub net_available: i64,
    pub pass_rate_ipqc: f64,
    pub pass_rate_postcure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OqcSummary {
    pub total_before_oqc: u64,
    pub total_after_oqc: u64,
    pub total_hold_or_return: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShiftCounts {
    #[serde(rename = "S1")]
    pub s1: u64,
    #[serde(rename = "S2")]
    pub s2: u64,
    #[serde(rename = "S3")]
    pub s3: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: String,
    pub date: String,
    pub product_name: String,
    pub shift: Shift,
    #[serde(default)]
    pub before_ipqc: Option<u64>,
    #[serde(default)]
    pub after_ipqc: Option<u64>,
    #[serde(default)]
    pub on_going_postcured: Option<u64>,
    #[serde(default)]
    pub after_postcured: Option<u64>,
    #[serde(default)]
    pub before_oqc: Option<u64>,
    #[serde(default)]
    pub after_oqc: Option<u64>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub by_role: Option<Role>,
}

impl RecentEntry {
    /// Whether this row belongs in a table of the given kind.
    pub fn is_kind(&self, kind: EntryKind) -> bool {
        match self.by_role {
            Some(Role::Ipqc) => kind == EntryKind::Ipqc,
            Some(Role::Oqc) => kind == EntryKind::Oqc,
            _ => match kind {
                EntryKind::Ipqc => self.before_ipqc.unwrap_or(0) + self.after_ipqc.unwrap_or(0) > 0,
                EntryKind::Oqc => self.before_oqc.unwrap_or(0) + self.after_oqc.unwrap_or(0) > 0,
            },
        }
    }
}

/// Response of `GET /summary` (admin overview).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminOverview {
    pub total_products: u64,
    pub active_products: u64,
    pub total_users: u64,
    pub today_by_shift: ShiftCounts,
    pub last_entries: Vec<RecentEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// One audit row from `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryHistory {
    pub id: String,
    #[serde(default)]
    pub daily_entry_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub product_code: String,
    pub product_name: String,
    #[serde(default)]
    pub product_size: Option<String>,
    pub date: String,
    pub shift: Shift,
    pub action: HistoryAction,
    pub by_user_id: String,
    pub by_role: Role,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub changes: Option<serde_json::Value>,
    #[serde(default)]
    pub snapshot: Option<serde_json::Value>,
    pub created_at: String,
}

/// Per-product row of `GET /admin/aggregate-by-product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotals {
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    #[serde(default)]
    pub product_size: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub before_ipqc: u64,
    #[serde(default)]
    pub after_ipqc: u64,
    #[serde(default)]
    pub on_going_postcured: u64,
    #[serde(default)]
    pub after_postcured: u64,
    #[serde(default)]
    pub before_oqc: u64,
    #[serde(default)]
    pub after_oqc: u64,
    #[serde(default)]
    pub hold: u64,
    #[serde(default)]
    pub total_ok: u64,
    #[serde(default)]
    pub total_belum_ok: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrandTotals {
    pub total_ok: u64,
    pub total_belum_ok: u64,
    pub after_ipqc: u64,
    pub after_postcured: u64,
    pub before_oqc: u64,
    pub after_oqc: u64,
    pub hold: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateResponse {
    pub items: Vec<ProductTotals>,
    pub total_products: u64,
    pub grand: GrandTotals,
}

/// Date/shift/plant/line scope shared by the dashboards, the entry list and
/// the create payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    pub date: String,
    pub shift: Shift,
    pub plant: Option<String>,
    pub line: Option<String>,
    pub product_id: Option<String>,
}

impl EntryFilter {
    pub fn new(date: impl Into<String>, shift: Shift) -> Self {
        Self {
            date: date.into(),
            shift,
            plant: None,
            line: None,
            product_id: None,
        }
    }

    /// Today's date in local time, first shift.
    pub fn today() -> Self {
        Self::new(today(), Shift::S1)
    }

    pub fn with_plant(mut self, plant: Option<String>) -> Self {
        self.plant = plant.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_line(mut self, line: Option<String>) -> Self {
        self.line = line.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_product(mut self, product_id: Option<String>) -> Self {
        self.product_id = product_id;
        self
    }

    /// Query parameters in the order the service documents them. Empty
    /// plant/line are left out.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("date", self.date.clone()),
            ("shift", self.shift.as_str().to_string()),
        ];
        if let Some(plant) = &self.plant {
            pairs.push(("plant", plant.clone()));
        }
        if let Some(line) = &self.line {
            pairs.push(("line", line.clone()));
        }
        if let Some(product_id) = &self.product_id {
            pairs.push(("productId", product_id.clone()));
        }
        pairs
    }
}

/// `YYYY-MM-DD` in local time.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// List bodies come back in three shapes depending on the endpoint version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Items {
        items: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
    },
    Data {
        data: Vec<T>,
    },
}

impl<T> ListEnvelope<T> {
    /// Items plus the total reported by the server (or the item count).
    pub fn into_parts(self) -> (Vec<T>, u64) {
        match self {
            ListEnvelope::Bare(items) => {
                let n = items.len() as u64;
                (items, n)
            }
            ListEnvelope::Items { items, total } => {
                let n = total.unwrap_or(items.len() as u64);
                (items, n)
            }
            ListEnvelope::Data { data } => {
                let n = data.len() as u64;
                (data, n)
            }
        }
    }

    pub fn into_items(self) -> Vec<T> {
        self.into_parts().0
    }
}
