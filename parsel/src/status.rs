//! Dérivation du statut courant d'une parcelle
//!
//! Pour l'ilaçlama et la gübreleme, le statut est celui de l'enregistrement
//! le plus récent. À date égale (ou toutes deux illisibles), l'enregistrement
//! listé en dernier l'emporte. Pour le recensement, l'absence de statut vaut
//! « fait ».

use serde::Serialize;

use crate::date::{parse_date, DateKey};
use crate::record::ActivityRecord;
use crate::text::turkish_lowercase;
use crate::types::{Mode, Parcel};

/// Statut canonique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKey {
    Done,
    Pending,
    Late,
}

impl StatusKey {
    pub const fn badge(self) -> StatusBadge {
        match self {
            Self::Done => StatusBadge {
                key: self,
                color: "#22c55e",
                symbol: "✓",
                title: "Yapıldı",
            },
            Self::Pending => StatusBadge {
                key: self,
                color: "#f59e0b",
                symbol: "🕒",
                title: "Beklemede",
            },
            Self::Late => StatusBadge {
                key: self,
                color: "#ef4444",
                symbol: "❗",
                title: "Zamanı Geçti",
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Pending => "pending",
            Self::Late => "late",
        }
    }
}

/// Pastille affichée au centre d'une parcelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub key: StatusKey,
    pub color: &'static str,
    pub symbol: &'static str,
    pub title: &'static str,
}

/// Normalise un statut libre (« Yapıldı », « Beklemede », « Zamanı Geçti »...)
pub fn norm_status(text: Option<&str>) -> Option<StatusKey> {
    let text = text?;
    if text.trim().is_empty() {
        return None;
    }

    let s = turkish_lowercase(text);
    if s.contains("yap") {
        Some(StatusKey::Done)
    } else if s.contains("bekle") || s.contains("plan") {
        Some(StatusKey::Pending)
    } else if s.contains("geç") || s.contains("gec") {
        Some(StatusKey::Late)
    } else {
        None
    }
}

/// Enregistrement le plus récent selon la clé (date, index d'origine)
pub fn latest_by_date(records: &[ActivityRecord]) -> Option<&ActivityRecord> {
    records
        .iter()
        .enumerate()
        .max_by_key(|(idx, record)| {
            let key: DateKey = record.date.as_deref().and_then(parse_date);
            (key, *idx)
        })
        .map(|(_, record)| record)
}

/// Statut courant d'une parcelle pour un mode
pub fn derive_status(parcel: &Parcel, mode: Mode) -> Option<StatusBadge> {
    let key = match mode {
        Mode::Spraying | Mode::Fertilizing => {
            let kind = mode.activity_kind()?;
            let latest = latest_by_date(parcel.activities(kind))?;
            norm_status(latest.status.as_deref())?
        }
        Mode::Census => match parcel.info.census_status.as_deref() {
            None => StatusKey::Done,
            Some(text) => norm_status(Some(text))?,
        },
        Mode::Harvest | Mode::Analysis => return None,
    };

    Some(key.badge())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ParcelInfo;
    use geo::LineString;
    use proptest::prelude::*;

    fn record(date: &str, status: &str) -> ActivityRecord {
        ActivityRecord {
            date: Some(date.to_string()),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    fn parcel_with(info: ParcelInfo) -> Parcel {
        let mut parcel = Parcel::new("p", LineString::from(vec![(27.0, 38.0), (27.1, 38.1)]));
        parcel.info = info;
        parcel
    }

    #[test]
    fn test_norm_status() {
        assert_eq!(norm_status(Some("Yapıldı")), Some(StatusKey::Done));
        assert_eq!(norm_status(Some("YAPILDI")), Some(StatusKey::Done));
        assert_eq!(norm_status(Some("Beklemede")), Some(StatusKey::Pending));
        assert_eq!(norm_status(Some("Planlandı")), Some(StatusKey::Pending));
        assert_eq!(norm_status(Some("Zamanı Geçti")), Some(StatusKey::Late));
        assert_eq!(norm_status(Some("ZAMANI GEÇTİ")), Some(StatusKey::Late));
        assert_eq!(norm_status(Some("gecikti")), Some(StatusKey::Late));
    }

    #[test]
    fn test_norm_status_total() {
        assert_eq!(norm_status(None), None);
        assert_eq!(norm_status(Some("")), None);
        assert_eq!(norm_status(Some("bilinmiyor")), None);
        assert_eq!(norm_status(Some("🙂\u{0}")), None);
    }

    #[test]
    fn test_tie_later_index_wins() {
        let info = ParcelInfo {
            spraying: Some(vec![record("2024-01-01", "Yapıldı"), record("2024-01-01", "Beklemede")]),
            ..Default::default()
        };
        let badge = derive_status(&parcel_with(info), Mode::Spraying).unwrap();
        assert_eq!(badge.key, StatusKey::Pending);
    }

    #[test]
    fn test_latest_date_wins() {
        let info = ParcelInfo {
            spraying: Some(vec![record("2024-03-01", "Beklemede"), record("2024-05-01", "Yapıldı")]),
            ..Default::default()
        };
        let badge = derive_status(&parcel_with(info), Mode::Spraying).unwrap();
        assert_eq!(badge.key, StatusKey::Done);
        assert_eq!(badge.symbol, "✓");
    }

    #[test]
    fn test_unparsable_date_is_earliest() {
        let info = ParcelInfo {
            fertilizing: Some(vec![record("2023-06-01", "Zamanı Geçti"), record("??", "Yapıldı")]),
            ..Default::default()
        };
        let badge = derive_status(&parcel_with(info), Mode::Fertilizing).unwrap();
        assert_eq!(badge.key, StatusKey::Late);
    }

    #[test]
    fn test_empty_list_has_no_status() {
        let info = ParcelInfo {
            spraying: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(derive_status(&parcel_with(info), Mode::Spraying), None);
        assert_eq!(derive_status(&parcel_with(ParcelInfo::default()), Mode::Fertilizing), None);
    }

    #[test]
    fn test_unrecognized_latest_status() {
        let info = ParcelInfo {
            spraying: Some(vec![record("2024-01-01", "Yapıldı"), record("2024-02-01", "?")]),
            ..Default::default()
        };
        assert_eq!(derive_status(&parcel_with(info), Mode::Spraying), None);
    }

    #[test]
    fn test_census_defaults_to_done() {
        let badge = derive_status(&parcel_with(ParcelInfo::default()), Mode::Census).unwrap();
        assert_eq!(badge.key, StatusKey::Done);

        let info = ParcelInfo {
            census_status: Some("Beklemede".to_string()),
            ..Default::default()
        };
        assert_eq!(derive_status(&parcel_with(info), Mode::Census).unwrap().key, StatusKey::Pending);

        let info = ParcelInfo {
            census_status: Some("eksik".to_string()),
            ..Default::default()
        };
        assert_eq!(derive_status(&parcel_with(info), Mode::Census), None);
    }

    #[test]
    fn test_no_status_for_harvest_and_analysis() {
        let info = ParcelInfo {
            harvest: Some(vec![record("2024-01-01", "Yapıldı")]),
            ..Default::default()
        };
        let parcel = parcel_with(info);
        assert_eq!(derive_status(&parcel, Mode::Harvest), None);
        assert_eq!(derive_status(&parcel, Mode::Analysis), None);
    }

    proptest! {
        #[test]
        fn norm_status_is_total(text in any::<String>()) {
            let key = norm_status(Some(&text));
            if text.trim().is_empty() {
                prop_assert_eq!(key, None);
            }
        }

        #[test]
        fn norm_status_ignores_case(word in "(yapıldı|beklemede|planlandı|zamanı geçti)") {
            let upper = crate::text::turkish_uppercase(&word);
            prop_assert_eq!(norm_status(Some(&upper)), norm_status(Some(&word)));
            prop_assert!(norm_status(Some(&word)).is_some());
        }
    }
}
