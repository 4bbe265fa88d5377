//! The filter-and-reshape core: region-filtered listings and tip expansion.
//!
//! Collections are tables holding one JSON document per row. Documents are
//! deserialized into the typed records from [`crate::models`] and the region
//! filter is evaluated here, in Rust, so the matching semantics stay pinned
//! instead of being delegated to a storage engine's text search.
//!
//! Matching contract: case-insensitive **substring**. Case folding is
//! ASCII-only — `"atlántico"` matches `"Atlántico"` (the accented letter is
//! identical), `"ÁTLANTICO"` does not (no accent-aware folding). The tests
//! below pin this.

use serde::de::DeserializeOwned;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::error::ApiError;
use crate::models::{ExpandedTip, Regional, Tip, TipDocument};

/// Region strings shorter than this are rejected before any storage access.
pub const MIN_REGION_LEN: usize = 2;

/// Collection tables of the location-discovery store.
pub const COLL_SITES: &str = "sities_clean";
pub const COLL_REVIEWERS: &str = "reviewers";
pub const COLL_TIPS: &str = "tips";
/// Collection table of the mapping-service store.
pub const COLL_GOOGLE_SITES: &str = "sities";

/// What to do with a parent whose tip list is empty or absent.
///
/// The historical behavior is an inner-join expansion: such parents vanish
/// from the output. That silently affects counts, so it is a named policy
/// here rather than a byproduct of the expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTips {
    /// Contribute zero rows (historical behavior).
    #[default]
    Drop,
    /// Emit one row with `"tip": null`.
    EmitNull,
}

pub fn validate_region(departamento: &str) -> Result<(), ApiError> {
    if departamento.chars().count() < MIN_REGION_LEN {
        return Err(ApiError::Validation(format!(
            "departamento must be at least {} characters",
            MIN_REGION_LEN
        )));
    }
    Ok(())
}

/// Unanchored, ASCII-case-insensitive substring match.
pub fn region_matches(value: &str, query: &str) -> bool {
    value
        .to_ascii_lowercase()
        .contains(&query.to_ascii_lowercase())
}

/// Retains the documents whose region attribute contains `departamento`.
/// Documents without a region attribute never match.
pub fn filter_by_region<T: Regional>(docs: Vec<T>, departamento: &str) -> Vec<T> {
    docs.into_iter()
        .filter(|doc| {
            doc.region()
                .is_some_and(|region| region_matches(region, departamento))
        })
        .collect()
}

/// Reads every document of a collection in storage order.
///
/// Rows whose body does not parse as the expected record are skipped with a
/// warning — the scrape occasionally leaves malformed entries behind and a
/// single one must not poison a whole listing.
pub async fn fetch_collection<T: DeserializeOwned>(
    pool: &SqlitePool,
    table: &str,
) -> Result<Vec<T>, ApiError> {
    let rows = sqlx::query(&format!("SELECT body FROM {}", table))
        .fetch_all(pool)
        .await?;

    let mut docs = Vec::with_capacity(rows.len());
    for row in &rows {
        let body: String = row.get("body");
        match serde_json::from_str::<T>(&body) {
            Ok(doc) => docs.push(doc),
            Err(err) => warn!(table, %err, "skipping malformed document"),
        }
    }
    Ok(docs)
}

/// Validates the region, then reads and filters one collection.
///
/// The returned sequence may be empty; the caller decides the not-found
/// message since it varies per entity.
pub async fn regional_listing<T: DeserializeOwned + Regional>(
    pool: &SqlitePool,
    table: &str,
    departamento: &str,
) -> Result<Vec<T>, ApiError> {
    validate_region(departamento)?;
    let docs = fetch_collection(pool, table).await?;
    Ok(filter_by_region(docs, departamento))
}

/// Fans a parent document out into one row per embedded tip.
pub fn expand_tips(parents: Vec<TipDocument>, policy: EmptyTips) -> Vec<ExpandedTip> {
    let mut rows = Vec::new();
    for parent in parents {
        if parent.tips.is_empty() {
            if policy == EmptyTips::EmitNull {
                rows.push(expanded_row(&parent, None));
            }
            continue;
        }
        for tip in parent.tips.clone() {
            rows.push(expanded_row(&parent, Some(tip)));
        }
    }
    rows
}

fn expanded_row(parent: &TipDocument, tip: Option<Tip>) -> ExpandedTip {
    ExpandedTip {
        user_id: parent.user_id.clone(),
        user_name: parent.user_name.clone(),
        user_location: parent.user_location.clone(),
        user_url: parent.user_url.clone(),
        departamento: parent.departamento.clone(),
        municipio: parent.municipio.clone(),
        fecha_actualizacion: parent.fecha_actualizacion.clone(),
        tip,
        tips_count: parent.tips_count,
        extra: parent.extra.clone(),
    }
}

/// Region-filtered tip expansion against the tips collection.
pub async fn expanded_tips(
    pool: &SqlitePool,
    departamento: &str,
    policy: EmptyTips,
) -> Result<Vec<ExpandedTip>, ApiError> {
    let parents: Vec<TipDocument> = regional_listing(pool, COLL_TIPS, departamento).await?;
    Ok(expand_tips(parents, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn parent(tips: Vec<Value>) -> TipDocument {
        let count = tips.len();
        serde_json::from_value(json!({
            "user_id": 77,
            "user_name": "Carla",
            "user_location": "Barranquilla, Colombia",
            "user_url": "https://example.com/carla",
            "departamento": "Atlántico",
            "municipio": "Barranquilla",
            "fecha_actualizacion": "2024-03-01",
            "tips": tips,
            "tips_count": count,
            "scrape_batch": "b-12"
        }))
        .unwrap()
    }

    #[test]
    fn matching_is_substring_and_ascii_case_insensitive() {
        assert!(region_matches("Atlántico", "atlántico"));
        assert!(region_matches("Atlántico", "Atlán"));
        assert!(region_matches("Atlántico", "tlánt"));
        assert!(region_matches("La Guajira", "guaj"));
        // ASCII folding only: accented uppercase is not folded, and an
        // unaccented query does not match the accented attribute.
        assert!(!region_matches("Atlántico", "ÁTLANTICO"));
        assert!(!region_matches("Atlántico", "atlantico"));
        // Not a prefix match.
        assert!(region_matches("San Andrés", "andr"));
    }

    #[test]
    fn short_regions_are_rejected() {
        assert!(validate_region("a").is_err());
        assert!(validate_region("").is_err());
        assert!(validate_region("su").is_ok());
        // Length is counted in characters, not bytes.
        assert!(validate_region("ví").is_ok());
    }

    #[test]
    fn documents_without_region_never_match() {
        let docs: Vec<TipDocument> = vec![
            serde_json::from_value(json!({ "user_name": "sin región", "tips": [] })).unwrap(),
            parent(vec![]),
        ];
        let filtered = filter_by_region(docs, "atlá");
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn expansion_yields_one_row_per_tip() {
        let parents = vec![parent(vec![
            json!({ "texto": "Muy bonito", "fecha": "Enero 2, 2024" }),
            json!({ "texto": "Volvería", "fecha": "Marzo 15, 2024" }),
            json!({ "texto": "Caro pero vale", "fecha": "Julio 9, 2023" }),
        ])];
        let rows = expand_tips(parents, EmptyTips::Drop);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1].tip.as_ref().unwrap().texto.as_deref(),
            Some("Volvería")
        );
    }

    #[test]
    fn removing_the_tip_key_reconstructs_the_parent() {
        let original = parent(vec![
            json!({ "texto": "uno", "fecha": "Enero 1" }),
            json!({ "texto": "dos", "fecha": "Febrero 2" }),
        ]);
        let rows = expand_tips(vec![original.clone()], EmptyTips::Drop);

        let mut parent_value = serde_json::to_value(&original).unwrap();
        parent_value.as_object_mut().unwrap().remove("tips");

        for row in rows {
            let mut row_value = serde_json::to_value(&row).unwrap();
            row_value.as_object_mut().unwrap().remove("tip");
            assert_eq!(row_value, parent_value);
        }
    }

    #[test]
    fn empty_tip_list_contributes_zero_rows() {
        let rows = expand_tips(vec![parent(vec![])], EmptyTips::Drop);
        assert!(rows.is_empty());
    }

    #[test]
    fn emit_null_policy_keeps_empty_parents() {
        let rows = expand_tips(vec![parent(vec![])], EmptyTips::EmitNull);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].tip.is_none());
        let value = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(value.get("tip"), Some(&Value::Null));
    }
}
