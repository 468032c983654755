//! Dates saisies librement
//!
//! Une date illisible n'est jamais une erreur : elle est considérée comme la
//! plus ancienne possible (`None` est inférieur à tout `Some`).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Clé de tri chronologique d'une date brute
pub type DateKey = Option<NaiveDateTime>;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse une date (ISO 8601, RFC 3339 ou format turc `jj.mm.aaaa`)
pub fn parse_date(input: &str) -> DateKey {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Intervalle de dates affiché dans un résumé
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    /// Date la plus ancienne (texte d'origine)
    pub first: String,
    /// Date la plus récente, absente si une seule date
    pub last: Option<String>,
}

impl std::fmt::Display for DateSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.last {
            Some(last) => write!(f, "{} – {}", self.first, last),
            None => f.write_str(&self.first),
        }
    }
}

/// Construit l'intervalle couvert par des dates brutes
///
/// Les dates vides sont ignorées ; les autres sont triées (tri stable) par
/// valeur calendaire croissante, les illisibles en tête.
pub fn date_span<'a, I>(dates: I) -> Option<DateSpan>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut keyed: Vec<(DateKey, &str)> = dates
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| (parse_date(s), s))
        .collect();

    if keyed.is_empty() {
        return None;
    }

    keyed.sort_by_key(|(key, _)| *key);

    let first = keyed[0].1.to_string();
    let last = (keyed.len() > 1).then(|| keyed[keyed.len() - 1].1.to_string());
    Some(DateSpan { first, last })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert!(parse_date("2024-03-01").is_some());
        assert!(parse_date("2024-03-01T10:30:00").is_some());
        assert!(parse_date("2024-03-01T10:30:00Z").is_some());
        assert!(parse_date("01.03.2024").is_some());
        assert_eq!(parse_date("2024-03-01"), parse_date("01.03.2024"));
    }

    #[test]
    fn test_unparsable_is_earliest() {
        assert_eq!(parse_date("dün"), None);
        assert_eq!(parse_date(""), None);
        assert!(parse_date("geçen hafta") < parse_date("1900-01-01"));
    }

    #[test]
    fn test_date_span_single() {
        let span = date_span([Some("2024-05-01"), None, Some("")]).unwrap();
        assert_eq!(span.to_string(), "2024-05-01");
    }

    #[test]
    fn test_date_span_range_sorted() {
        let span = date_span([Some("2024-05-01"), Some("2024-01-15"), Some("2024-03-10")]).unwrap();
        assert_eq!(span.first, "2024-01-15");
        assert_eq!(span.last.as_deref(), Some("2024-05-01"));
        assert_eq!(span.to_string(), "2024-01-15 – 2024-05-01");
    }

    #[test]
    fn test_date_span_empty() {
        assert_eq!(date_span(Vec::<Option<&str>>::new()), None);
    }
}
