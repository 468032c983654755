//! Utilitaires texte : casse turque, placeholders, concaténation

use serde_json::Value;

/// Valeur affichée à la place d'une donnée absente
pub const PLACEHOLDER: &str = "-";

/// Séparateur utilisé pour joindre plusieurs valeurs textuelles
pub const JOIN_SEPARATOR: &str = " / ";

/// Minuscules selon les règles turques (`I` → `ı`, `İ` → `i`)
pub fn turkish_lowercase(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            'I' => out.push('ı'),
            'İ' => out.push('i'),
            c => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Majuscules selon les règles turques (`i` → `İ`, `ı` → `I`)
pub fn turkish_uppercase(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            'i' => out.push('İ'),
            'ı' => out.push('I'),
            c => out.extend(c.to_uppercase()),
        }
    }
    out
}

/// Joint les valeurs non vides (trim), dédoublonnées dans l'ordre d'apparition
///
/// Retourne `None` si aucune valeur n'est retenue.
pub fn join_text<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut seen: Vec<&str> = Vec::new();
    for value in values.into_iter().flatten() {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !seen.contains(&trimmed) {
            seen.push(trimmed);
        }
    }

    if seen.is_empty() {
        None
    } else {
        Some(seen.join(JOIN_SEPARATOR))
    }
}

/// Texte d'un champ optionnel, ou le placeholder
pub fn or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(PLACEHOLDER)
}

/// Convertit une valeur JSON scalaire en texte non vide
///
/// Les nombres et booléens sont stringifiés ; `null`, les tableaux, objets
/// et chaînes vides donnent `None`.
pub fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
