//! Chart-facing aggregates over flat result rows.
//!
//! Pure and stateless: everything here is re-derived from the raw rows on
//! every refresh, nothing is cached. These functions decide what data
//! reaches the charts, so their edge cases (missing ratings, unparsable
//! dates, stopwords) are part of the contract and pinned by tests.

use std::collections::BTreeMap;

use crate::models::{ExpandedTip, RatedSiteSummary, ReviewerSummary, SiteSummary};

/// Spanish month names to month numbers. Month 9 has a second,
/// alternate-spelling entry; both count toward the same bucket.
const MONTHS: [(&str, u32); 13] = [
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

/// Words excluded from the word-frequency output: short Spanish function
/// words on top of a base set of connectives.
const STOPWORDS: [&str; 40] = [
    "de", "la", "el", "en", "y", "a", "que", "los", "las", "un", "una", "unos", "unas", "es",
    "por", "con", "para", "del", "se", "su", "sus", "al", "lo", "como", "más", "mas", "muy",
    "pero", "le", "ya", "o", "si", "no", "este", "esta", "son", "hay", "te", "me", "mi",
];

/// Mean rating for one (municipio, categoria) group.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageRating {
    pub municipio: String,
    pub categoria: String,
    pub promedio: f64,
}

/// Sites per category, descending by count (ties broken alphabetically so
/// the output is stable).
pub fn category_counts(sites: &[SiteSummary]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for site in sites {
        if let Some(categoria) = site.categoria.as_deref() {
            *counts.entry(categoria).or_default() += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(categoria, n)| (categoria.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Reviewers per municipio, descending by count.
pub fn reviewers_per_municipio(reviewers: &[ReviewerSummary]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for reviewer in reviewers {
        if let Some(municipio) = reviewer.municipio.as_deref() {
            *counts.entry(municipio).or_default() += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(municipio, n)| (municipio.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Arithmetic mean of `puntuacion` per (municipio, categoria).
///
/// Rows with a missing rating are excluded from both the sum and the
/// count; rows missing either grouping key are skipped entirely.
pub fn average_ratings(sites: &[RatedSiteSummary]) -> Vec<AverageRating> {
    let mut groups: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for site in sites {
        let (Some(municipio), Some(categoria)) =
            (site.municipio.as_deref(), site.categoria.as_deref())
        else {
            continue;
        };
        let Some(puntuacion) = site.puntuacion else {
            continue;
        };
        let entry = groups.entry((municipio, categoria)).or_insert((0.0, 0));
        entry.0 += puntuacion;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((municipio, categoria), (sum, n))| AverageRating {
            municipio: municipio.to_string(),
            categoria: categoria.to_string(),
            promedio: sum / n as f64,
        })
        .collect()
}

/// Maps a free-text tip date to a month number by its first
/// whitespace-delimited token. Unknown tokens yield `None`.
pub fn month_from_fecha(fecha: &str) -> Option<u32> {
    let token = fecha.split_whitespace().next()?.to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|&(_, number)| number)
}

/// Tip count per month number. Tips whose date does not resolve to a month
/// are dropped from this aggregate only, never failing the whole refresh.
pub fn monthly_tip_counts(tips: &[ExpandedTip]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for tip in tips {
        let Some(month) = tip
            .tip
            .as_ref()
            .and_then(|t| t.fecha.as_deref())
            .and_then(month_from_fecha)
        else {
            continue;
        };
        *counts.entry(month).or_insert(0) += 1;
    }
    counts
}

/// Concatenates every tip comment with single-space separators, literal
/// quote characters removed. This is the word-cloud input blob.
pub fn comment_blob(tips: &[ExpandedTip]) -> String {
    tips.iter()
        .filter_map(|row| row.tip.as_ref())
        .filter_map(|tip| tip.texto.as_deref())
        .map(|texto| texto.replace('"', ""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word frequencies over the blob, stopwords excluded, descending by count.
/// Tokens are lowercased with surrounding punctuation stripped.
pub fn word_frequencies(blob: &str) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for raw in blob.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if word.is_empty() || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        *counts.entry(word).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rated(municipio: &str, categoria: &str, puntuacion: Option<f64>) -> RatedSiteSummary {
        RatedSiteSummary {
            nombre: None,
            puntuacion,
            categoria: Some(categoria.to_string()),
            municipio: Some(municipio.to_string()),
            departamento: Some("Atlántico".to_string()),
        }
    }

    fn tip_row(texto: &str, fecha: &str) -> ExpandedTip {
        serde_json::from_value(json!({ "tip": { "texto": texto, "fecha": fecha } })).unwrap()
    }

    #[test]
    fn category_counts_sort_descending() {
        let sites: Vec<SiteSummary> = ["Playa", "Museo", "Playa", "Playa", "Museo"]
            .iter()
            .map(|c| SiteSummary {
                nombre: None,
                categoria: Some(c.to_string()),
                departamento: None,
                municipio: None,
                latitude: None,
                longitude: None,
            })
            .collect();
        assert_eq!(
            category_counts(&sites),
            vec![("Playa".to_string(), 3), ("Museo".to_string(), 2)]
        );
    }

    #[test]
    fn missing_ratings_affect_neither_numerator_nor_denominator() {
        let sites = vec![
            rated("Soledad", "Playa", Some(5.0)),
            rated("Soledad", "Playa", None),
            rated("Soledad", "Playa", Some(3.0)),
        ];
        let averages = average_ratings(&sites);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].promedio, 4.0);
    }

    #[test]
    fn month_table_covers_both_spellings_of_month_nine() {
        assert_eq!(month_from_fecha("Septiembre 3, 2023"), Some(9));
        assert_eq!(month_from_fecha("Setiembre 3, 2023"), Some(9));
        assert_eq!(month_from_fecha("diciembre"), Some(12));
        assert_eq!(month_from_fecha("Foo 1, 2023"), None);
        assert_eq!(month_from_fecha(""), None);
    }

    #[test]
    fn unparsable_dates_are_dropped_from_the_histogram_only() {
        let tips = vec![
            tip_row("t1", "Enero 5, 2024"),
            tip_row("t2", "enero 9, 2024"),
            tip_row("t3", "Foo 1, 2024"),
            tip_row("t4", "Marzo 2, 2024"),
        ];
        let counts = monthly_tip_counts(&tips);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&3), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 3);
    }

    #[test]
    fn blob_strips_quotes_and_joins_with_single_spaces() {
        let tips = vec![tip_row("\"excelente\" lugar", "Enero 1"), tip_row("volveré", "Enero 2")];
        assert_eq!(comment_blob(&tips), "excelente lugar volveré");
    }

    #[test]
    fn word_frequencies_exclude_stopwords() {
        let freqs = word_frequencies("la playa es muy bonita, bonita de verdad");
        assert_eq!(freqs[0], ("bonita".to_string(), 2));
        assert!(freqs.iter().all(|(w, _)| w != "la" && w != "de" && w != "es"));
    }
}
