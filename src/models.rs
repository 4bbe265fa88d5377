//! Record types for the scraped tourism collections.
//!
//! The source documents have no enforced schema, so every field is optional
//! and unknown scrape fields ride along in a flattened `extra` map. Curated
//! projections are separate types built by field selection, never by
//! poking at raw JSON in the handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A point of interest from either source.
///
/// `puntuacion` only appears in the mapping-service scrape; the
/// location-discovery scrape carries coordinates instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puntuacion: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A person who left reviews. No uniqueness is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reviewer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single free-text annotation inside a tip document.
///
/// `fecha` is not machine-parsable: a localized month name followed by
/// arbitrary text (see [`crate::aggregate::month_from_fecha`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parent document carrying reviewer identity and an embedded tip list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_actualizacion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<Tip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One output row of the tip expansion: all [`TipDocument`] fields except
/// the list, with a single element substituted under `tip`.
///
/// `tip` is `None` only under [`crate::query::EmptyTips::EmitNull`], in
/// which case it serializes as an explicit `"tip": null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedTip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_actualizacion: Option<String>,
    #[serde(default)]
    pub tip: Option<Tip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Curated site projection for the chart-facing listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl From<&Site> for SiteSummary {
    fn from(site: &Site) -> Self {
        Self {
            nombre: site.nombre.clone(),
            categoria: site.categoria.clone(),
            departamento: site.departamento.clone(),
            municipio: site.municipio.clone(),
            latitude: site.latitude,
            longitude: site.longitude,
        }
    }
}

/// Curated site projection for the mapping-service source, rating included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedSiteSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puntuacion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
}

impl From<&Site> for RatedSiteSummary {
    fn from(site: &Site) -> Self {
        Self {
            nombre: site.nombre.clone(),
            puntuacion: site.puntuacion,
            categoria: site.categoria.clone(),
            municipio: site.municipio.clone(),
            departamento: site.departamento.clone(),
        }
    }
}

/// Curated reviewer projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
}

impl From<&Reviewer> for ReviewerSummary {
    fn from(reviewer: &Reviewer) -> Self {
        Self {
            nombre: reviewer.nombre.clone(),
            municipio: reviewer.municipio.clone(),
            departamento: reviewer.departamento.clone(),
        }
    }
}

/// Documents that carry the region attribute the listing filter runs on.
pub trait Regional {
    fn region(&self) -> Option<&str>;
}

impl Regional for Site {
    fn region(&self) -> Option<&str> {
        self.departamento.as_deref()
    }
}

impl Regional for Reviewer {
    fn region(&self) -> Option<&str> {
        self.departamento.as_deref()
    }
}

impl Regional for TipDocument {
    fn region(&self) -> Option<&str> {
        self.departamento.as_deref()
    }
}
