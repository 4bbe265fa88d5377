//! HTTP client for the Presentation side.
//!
//! Two usage profiles over the same endpoints:
//!
//! - **chart fetches** (10 s timeout): any transport error, timeout, or
//!   non-success status degrades to an empty result — the dashboard shows
//!   a "no data" notice instead of an error page;
//! - **export fetches** (40 s timeout): transport errors propagate, since
//!   a partially assembled export artifact would be worse than a failure
//!   message.
//!
//! Calls are issued sequentially from one coordination point per page
//! load; the endpoints are independent reads with no ordering dependency.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::models::{ExpandedTip, RatedSiteSummary, ReviewerSummary, SiteSummary};

/// Timeout for the chart-facing fetches.
pub const CHART_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for the export fetches.
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(40);

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

#[derive(Default, Deserialize)]
struct SitesBody {
    #[serde(default)]
    sitios: Vec<SiteSummary>,
}

#[derive(Default, Deserialize)]
struct RatedSitesBody {
    #[serde(default)]
    sitios: Vec<RatedSiteSummary>,
}

#[derive(Default, Deserialize)]
struct ReviewersBody {
    #[serde(default, rename = "reseñantes")]
    reviewers: Vec<ReviewerSummary>,
}

#[derive(Default, Deserialize)]
struct TipsBody {
    #[serde(default)]
    tips: Vec<ExpandedTip>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Curated site listing, degraded to empty on any failure.
    pub async fn sites(&self, departamento: &str) -> Vec<SiteSummary> {
        self.chart_fetch::<SitesBody>("/foursquare/sities_clean", departamento)
            .await
            .sitios
    }

    /// Curated reviewer listing, degraded to empty on any failure.
    pub async fn reviewers(&self, departamento: &str) -> Vec<ReviewerSummary> {
        self.chart_fetch::<ReviewersBody>("/foursquare/reseñantes", departamento)
            .await
            .reviewers
    }

    /// Curated rated-site listing, degraded to empty on any failure.
    pub async fn rated_sites(&self, departamento: &str) -> Vec<RatedSiteSummary> {
        self.chart_fetch::<RatedSitesBody>("/google/sities", departamento)
            .await
            .sitios
    }

    /// Expanded tip rows, degraded to empty on any failure.
    pub async fn tips(&self, departamento: &str) -> Vec<ExpandedTip> {
        self.chart_fetch::<TipsBody>("/foursquare/tips_expand", departamento)
            .await
            .tips
    }

    /// Full-projection rows for one export sheet. A body without the
    /// entity key (e.g. a 404 for a region with no data) yields an empty
    /// sheet; transport errors propagate to the caller.
    pub async fn full_rows(
        &self,
        path: &str,
        departamento: &str,
        entity_key: &str,
    ) -> Result<Vec<Value>> {
        let body: Value = self
            .get(path, departamento)
            .await
            .with_context(|| format!("fetching {}", path))?
            .json()
            .await
            .with_context(|| format!("decoding {}", path))?;
        Ok(body
            .get(entity_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Liveness check against a running service.
    pub async fn ping(&self) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}/ping", self.base))
            .send()
            .await
            .context("fetching /ping")?;
        let status = resp.status();
        let body: Value = resp.json().await.context("decoding /ping")?;
        if !status.is_success() {
            anyhow::bail!("ping failed ({}): {}", status, body);
        }
        Ok(body)
    }

    async fn get(&self, path: &str, departamento: &str) -> reqwest::Result<reqwest::Response> {
        self.http
            .get(format!("{}{}", self.base, path))
            .query(&[("departamento", departamento)])
            .send()
            .await
    }

    /// Fetch-and-degrade: a 404 is an ordinary "no data for this view",
    /// anything else unexpected is logged and also rendered as no data.
    async fn chart_fetch<T: DeserializeOwned + Default>(&self, path: &str, departamento: &str) -> T {
        let resp = match self.get(path, departamento).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!(path, %err, "fetch failed, rendering as no data");
                return T::default();
            }
        };
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return T::default();
        }
        if !resp.status().is_success() {
            warn!(path, status = %resp.status(), "unexpected status, rendering as no data");
            return T::default();
        }
        match resp.json::<T>().await {
            Ok(body) => body,
            Err(err) => {
                warn!(path, %err, "undecodable body, rendering as no data");
                T::default()
            }
        }
    }
}
