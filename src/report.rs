//! Terminal rendering of the dashboard aggregates.
//!
//! One page load = four chart fetches for the selected region, then the
//! aggregates from [`crate::aggregate`] printed as text sections. Any
//! fetch that failed or returned nothing renders an informational notice
//! for its section instead of an error.

use anyhow::Result;
use chrono::Local;

use crate::aggregate::{
    average_ratings, category_counts, comment_blob, monthly_tip_counts, reviewers_per_municipio,
    word_frequencies,
};
use crate::client::{ApiClient, CHART_TIMEOUT};

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const TOP_CATEGORIES: usize = 10;
const TOP_WORDS: usize = 15;
const BAR_WIDTH: usize = 40;

pub async fn run_report(base_url: &str, departamento: &str) -> Result<()> {
    let client = ApiClient::new(base_url, CHART_TIMEOUT)?;

    let sites = client.sites(departamento).await;
    let reviewers = client.reviewers(departamento).await;
    let rated = client.rated_sites(departamento).await;
    let tips = client.tips(departamento).await;

    println!("=== Análisis Turístico — {} ===", departamento);
    println!("generado: {}", Local::now().format("%Y-%m-%d %H:%M"));
    println!();

    // Indicators count only mappable sites, like the map view does.
    let mapped: Vec<_> = sites
        .iter()
        .filter(|s| s.latitude.is_some() && s.longitude.is_some())
        .cloned()
        .collect();
    let categories = category_counts(&mapped);

    println!("--- Indicadores Generales ---");
    println!("sitios:      {}", mapped.len());
    println!("reseñantes:  {}", reviewers.len());
    println!("categorías:  {}", categories.len());
    println!();

    println!("--- Top Categorías ---");
    if categories.is_empty() {
        println!("(no hay datos de categorías para este departamento)");
    } else {
        let max = categories[0].1;
        for (categoria, count) in categories.iter().take(TOP_CATEGORIES) {
            println!("{:<28} {} {}", categoria, bar(*count, max), count);
        }
    }
    println!();

    println!("--- Demanda por Municipio ---");
    let demand = reviewers_per_municipio(&reviewers);
    if demand.is_empty() {
        println!("(no se encontraron reseñantes para este departamento)");
    } else {
        let max = demand[0].1;
        for (municipio, count) in &demand {
            println!("{:<28} {} {}", municipio, bar(*count, max), count);
        }
    }
    println!();

    println!("--- Puntuación Promedio (municipio / categoría) ---");
    let averages = average_ratings(&rated);
    if averages.is_empty() {
        println!("(no se encontraron sitios de Google Maps para este departamento)");
    } else {
        for avg in &averages {
            println!("{:<20} {:<24} {:.2}", avg.municipio, avg.categoria, avg.promedio);
        }
    }
    println!();

    println!("--- Actividad Mensual de Tips ---");
    let monthly = monthly_tip_counts(&tips);
    if monthly.is_empty() {
        println!("(no se encontraron tips para este departamento)");
    } else {
        let max = monthly.values().copied().max().unwrap_or(1);
        for (month, count) in &monthly {
            let name = MONTH_NAMES[(*month as usize) - 1];
            println!("{:<12} {} {}", name, bar(*count, max), count);
        }
    }
    println!();

    println!("--- Palabras Frecuentes en Tips ---");
    let words = word_frequencies(&comment_blob(&tips));
    if words.is_empty() {
        println!("(sin comentarios)");
    } else {
        for (word, count) in words.iter().take(TOP_WORDS) {
            println!("{:<20} {}", word, count);
        }
    }

    Ok(())
}

fn bar(count: usize, max: usize) -> String {
    let max = max.max(1);
    let width = (count * BAR_WIDTH).div_ceil(max).min(BAR_WIDTH);
    "█".repeat(width)
}
