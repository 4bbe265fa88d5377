//! Multi-sheet spreadsheet export.
//!
//! Fetches the four full-projection datasets for a region and packages
//! each as one sheet of a single `.xlsx` artifact. The sheet count is
//! fixed: a collection with no rows still gets its sheet, holding a
//! single `Sin datos` marker row, so downstream consumers always find
//! the same four tabs.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::client::{ApiClient, EXPORT_TIMEOUT};
use crate::xlsx::{self, Sheet};

/// Fixed sheet names, in artifact order.
pub const SHEET_NAMES: [&str; 4] = [
    "Foursquare_Sitios",
    "GoogleMaps_Sitios",
    "Foursquare_Tips",
    "Foursquare_Reseñantes",
];

/// Marker row written to sheets whose query returned nothing.
pub const EMPTY_MARKER: &str = "Sin datos";

/// Builds the four sheets from the fetched datasets (same order as
/// [`SHEET_NAMES`]), substituting the marker row where a dataset is empty.
pub fn assemble_sheets(datasets: [Vec<Value>; 4]) -> Vec<Sheet> {
    SHEET_NAMES
        .iter()
        .zip(datasets)
        .map(|(name, rows)| Sheet {
            name: xlsx::truncate_sheet_name(name),
            rows: if rows.is_empty() {
                vec![json!({ "info": EMPTY_MARKER })]
            } else {
                rows
            },
        })
        .collect()
}

/// Default artifact filename for a region.
pub fn artifact_name(departamento: &str) -> String {
    format!("Datos_Completos_{}.xlsx", departamento)
}

/// Fetches the four full projections and writes the artifact.
///
/// Unlike the chart fetches, failures here propagate: a partial export is
/// worse than an explicit failure message.
pub async fn run_export(
    base_url: &str,
    departamento: &str,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let client = ApiClient::new(base_url, EXPORT_TIMEOUT)?;

    let fs_sites = client
        .full_rows("/foursquare/sities_full", departamento, "sitios")
        .await?;
    let gm_sites = client
        .full_rows("/google/sities_full", departamento, "sitios")
        .await?;
    let fs_tips = client
        .full_rows("/foursquare/tips_expand", departamento, "tips")
        .await?;
    let fs_reviewers = client
        .full_rows("/foursquare/reseñantes_full", departamento, "reseñantes")
        .await?;

    let sheets = assemble_sheets([fs_sites, gm_sites, fs_tips, fs_reviewers]);

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(artifact_name(departamento)));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    xlsx::write_workbook(file, &sheets)?;

    eprintln!(
        "Exported {} sheets to {} ({})",
        sheets.len(),
        path.display(),
        xlsx::MIME
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::reader;
    use std::io::Cursor;

    #[test]
    fn always_four_sheets_even_when_everything_is_empty() {
        let sheets = assemble_sheets([Vec::new(), Vec::new(), Vec::new(), Vec::new()]);
        assert_eq!(sheets.len(), 4);

        let mut cursor = Cursor::new(Vec::new());
        xlsx::write_workbook(&mut cursor, &sheets).unwrap();
        let bytes = cursor.into_inner();

        let names = reader::sheet_names(&bytes);
        assert_eq!(names, SHEET_NAMES.map(str::to_string).to_vec());
        for i in 0..4 {
            // Header plus exactly one marker row.
            assert_eq!(reader::cell_texts(&bytes, i), vec!["info", EMPTY_MARKER]);
        }
    }

    #[test]
    fn non_empty_datasets_keep_their_rows() {
        let sheets = assemble_sheets([
            vec![json!({ "nombre": "Playa Blanca", "departamento": "Bolívar" })],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ]);
        assert_eq!(sheets[0].rows.len(), 1);
        assert_eq!(sheets[1].rows[0].get("info").unwrap(), EMPTY_MARKER);
    }

    #[test]
    fn artifact_name_embeds_the_region() {
        assert_eq!(artifact_name("Sucre"), "Datos_Completos_Sucre.xlsx");
    }
}
