//! Empreinte d'un jeu de parcelles
//!
//! Sert à détecter si une nouvelle ingestion change réellement quelque chose.
//! Le contour est normalisé pour commencer au vertex lexicographiquement le
//! plus petit : un même polygone décrit depuis un autre sommet a la même empreinte.

use blake3::Hasher;
use geo::LineString;
use parsel::{Parcel, ParcelSet};

/// Empreinte d'une parcelle (identifiant, contour, attributs et historique)
pub fn parcel_hash(parcel: &Parcel) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hash_parcel(&mut hasher, parcel);
    *hasher.finalize().as_bytes()
}

/// Empreinte hexadécimale de tout le jeu, dans l'ordre d'ingestion
pub fn dataset_fingerprint(parcels: &ParcelSet) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&(parcels.len() as u64).to_le_bytes());
    for parcel in parcels.iter() {
        hasher.update(&parcel_hash(parcel));
    }
    hash_to_hex(hasher.finalize().as_bytes())
}

fn hash_parcel(hasher: &mut Hasher, parcel: &Parcel) {
    hasher.update(b"ID");
    hasher.update(parcel.id.as_str().as_bytes());

    hasher.update(b"RING");
    hash_ring(hasher, &parcel.ring);

    // Sérialisation déterministe : l'ordre des clés suit la source
    hasher.update(b"PROPS");
    if let Ok(bytes) = serde_json::to_vec(&parcel.properties) {
        hasher.update(&bytes);
    }
    hasher.update(b"INFO");
    if let Ok(bytes) = serde_json::to_vec(&parcel.info) {
        hasher.update(&bytes);
    }
}

/// Pas de quantification : 7 décimales, environ 1 cm en degrés
const COORD_SCALE: f64 = 1e7;

/// Sommets quantifiés du contour, sans le point de fermeture
fn quantized_vertices(ring: &LineString) -> Vec<(i64, i64)> {
    let open = match ring.0.len() {
        n if n > 1 && ring.is_closed() => &ring.0[..n - 1],
        _ => &ring.0[..],
    };
    open.iter()
        .map(|c| ((c.x * COORD_SCALE).round() as i64, (c.y * COORD_SCALE).round() as i64))
        .collect()
}

/// Hash le contour à partir de son plus petit sommet quantifié
fn hash_ring(hasher: &mut Hasher, ring: &LineString) {
    let mut vertices = quantized_vertices(ring);
    if let Some(start) = vertices
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
    {
        vertices.rotate_left(start);
    }
    for (x, y) in vertices {
        hasher.update(&x.to_le_bytes());
        hasher.update(&y.to_le_bytes());
    }
}

/// Convertit un hash en hexadécimal
pub fn hash_to_hex(hash: &[u8; 32]) -> String {
    hex::encode(hash)
}
