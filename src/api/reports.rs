//! Read-only reporting endpoints: dashboard summaries, audit history and
//! per-product aggregates.

use tracing::warn;

use super::{ApiClient, Query};
use crate::errors::ApiError;
use crate::model::{
    AdminOverview, AggregateResponse, EntryFilter, EntryHistory, EntryKind, IpqcSummary,
    ListEnvelope, OqcSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desc => "desc",
            Self::Asc => "asc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desc" => Ok(Self::Desc),
            "asc" => Ok(Self::Asc),
            _ => Err(format!("Invalid order: {} (expected asc or desc)", s)),
        }
    }
}

/// Filters for `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub kind: EntryKind,
    pub filter: EntryFilter,
    pub text: Option<String>,
    pub only_mine: bool,
    pub page: u32,
    pub take: u32,
}

impl HistoryQuery {
    pub fn new(kind: EntryKind, filter: EntryFilter) -> Self {
        Self {
            kind,
            filter,
            text: None,
            only_mine: false,
            page: 1,
            take: 20,
        }
    }

    pub fn pairs(&self) -> Query {
        let mut pairs: Query = vec![("type", self.kind.as_str().to_string())];
        pairs.extend(self.filter.query_pairs());
        if let Some(text) = self.text.as_ref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("q", text.clone()));
        }
        if self.only_mine {
            pairs.push(("by", "me".to_string()));
        }
        pairs.push(("page", self.page.max(1).to_string()));
        pairs.push(("take", self.take.to_string()));
        pairs
    }
}

/// One page of history rows plus the server-side total.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub items: Vec<EntryHistory>,
    pub total: u64,
}

/// Filters for `GET /admin/aggregate-by-product`. All optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub plant: Option<String>,
    pub line: Option<String>,
    pub text: Option<String>,
    pub order: SortOrder,
    pub take: u32,
}

impl Default for AggregateQuery {
    fn default() -> Self {
        Self {
            date_from: None,
            date_to: None,
            plant: None,
            line: None,
            text: None,
            order: SortOrder::Desc,
            take: 20,
        }
    }
}

impl AggregateQuery {
    pub fn pairs(&self) -> Query {
        let mut pairs: Query = Vec::new();
        let optional = [
            ("dateFrom", &self.date_from),
            ("dateTo", &self.date_to),
            ("plant", &self.plant),
            ("line", &self.line),
            ("q", &self.text),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_ref().filter(|v| !v.trim().is_empty()) {
                pairs.push((key, v.clone()));
            }
        }
        pairs.push(("order", self.order.as_str().to_string()));
        pairs.push(("take", self.take.to_string()));
        pairs
    }
}

impl ApiClient {
    /// IPQC KPIs. Older deployments only serve `/ipqc/summary`, so that is
    /// tried when the primary path fails.
    pub async fn ipqc_summary(&self, filter: &EntryFilter) -> Result<IpqcSummary, ApiError> {
        let mut query = filter.query_pairs();
        query.retain(|(k, _)| *k != "productId");
        match self.get::<IpqcSummary>("/ipqc/summary/summary", &query).await {
            Ok(summary) => Ok(summary),
            Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
            Err(e) => {
                warn!(error = %e, "primary IPQC summary endpoint failed, trying fallback");
                self.get("/ipqc/summary", &query).await
            }
        }
    }

    pub async fn oqc_summary(&self, filter: &EntryFilter) -> Result<OqcSummary, ApiError> {
        let mut query = filter.query_pairs();
        query.retain(|(k, _)| *k != "productId");
        self.get("/oqc/summary", &query).await
    }

    pub async fn admin_overview(&self, take: u32) -> Result<AdminOverview, ApiError> {
        self.get("/summary", &vec![("take", take.to_string())]).await
    }

    pub async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, ApiError> {
        let list: ListEnvelope<EntryHistory> = self.get("/history", &query.pairs()).await?;
        let (items, total) = list.into_parts();
        Ok(HistoryPage { items, total })
    }

    pub async fn aggregate_by_product(&self, query: &AggregateQuery) -> Result<AggregateResponse, ApiError> {
        self.get("/admin/aggregate-by-product", &query.pairs()).await
    }
}
