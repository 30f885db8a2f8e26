//! Great-circle distance and the store proximity filter.

use crate::store::Store;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Stores farther than this from the caller are dropped by [`nearby`].
pub const NEARBY_RADIUS_KM: f64 = 5.0;

/// Haversine distance in kilometres between two `(lat, lon)` points given in
/// degrees.
pub fn distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
  let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
  let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
  let dlat = lat2 - lat1;
  let dlon = lon2 - lon1;

  let h = (dlat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Keep only stores within [`NEARBY_RADIUS_KM`] of `origin`. Stores without
/// coordinates never match.
pub fn nearby(stores: Vec<Store>, origin: (f64, f64)) -> Vec<Store> {
  stores
    .into_iter()
    .filter(|s| {
      s.coordinates()
        .is_some_and(|c| distance_km(origin, c) <= NEARBY_RADIUS_KM)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn store_at(lat: Option<f64>, lon: Option<f64>) -> Store {
    Store {
      id:           Uuid::new_v4(),
      owner_id:     Uuid::new_v4(),
      owner_email:  "owner@example.com".into(),
      name:         "Shop".into(),
      description:  String::new(),
      address:      "Av. Bolívar".into(),
      latitude:     lat,
      longitude:    lon,
      image_url:    None,
      rating:       0.0,
      review_count: 0,
      created_at:   Utc::now(),
    }
  }

  #[test]
  fn zero_distance_to_self() {
    assert!(distance_km((10.25, -67.6), (10.25, -67.6)).abs() < 1e-9);
  }

  #[test]
  fn one_degree_of_latitude_is_about_111_km() {
    let d = distance_km((0.0, 0.0), (1.0, 0.0));
    assert!((d - 111.19).abs() < 0.1, "got {d}");
  }

  #[test]
  fn nearby_keeps_close_stores_only() {
    let origin = (10.2469, -67.5958);
    let close = store_at(Some(10.2600), Some(-67.6000)); // ~1.5 km
    let far = store_at(Some(10.4806), Some(-66.9036)); // ~80 km
    let unplaced = store_at(None, None);
    let close_id = close.id;

    let kept = nearby(vec![close, far, unplaced], origin);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, close_id);
  }
}
