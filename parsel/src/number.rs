//! Lecture tolérante des quantités numériques
//!
//! Les exports terrain mélangent `1234.5`, `1.234,5` et `12 kg` : tout est
//! ramené à un `f64`, une saisie illisible vaut 0.

use serde_json::Value;

/// Parse une quantité saisie librement (séparateurs de milliers, virgule décimale)
///
/// Si la chaîne contient une virgule, les points sont des séparateurs de
/// milliers et la virgule est la décimale. Sinon le point est la décimale.
/// Les caractères autres que chiffres, `.` et `-` sont ignorés. Seul le plus
/// long préfixe numérique est retenu ; une chaîne sans nombre vaut 0.
pub fn parse_flexible(input: &str) -> f64 {
    let cleaned: String = if input.contains(',') {
        input
            .chars()
            .filter(|&c| c != '.')
            .map(|c| if c == ',' { '.' } else { c })
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect()
    } else {
        input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect()
    };

    match fast_float::parse_partial::<f64, _>(&cleaned) {
        Ok((value, _)) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Convertit une valeur JSON en quantité
///
/// `None` si la valeur est absente ou `null` ; toute autre valeur donne un
/// nombre (0 si elle n'est pas interprétable).
pub fn flexible_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0)),
        Value::String(s) => Some(parse_flexible(s)),
        _ => Some(0.0),
    }
}
