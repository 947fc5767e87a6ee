//! Great-circle distance between two points on the Earth's surface.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude: f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self { latitude, longitude }
  }
}

/// Haversine distance in kilometres. NaN inputs propagate.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
  let lat1 = a.latitude.to_radians();
  let lat2 = b.latitude.to_radians();
  let dlat = lat2 - lat1;
  let dlon = (b.longitude - a.longitude).to_radians();

  let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
  let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

  EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
  use super::*;

  const TOKYO: Coordinates = Coordinates {
    latitude: 35.6812,
    longitude: 139.7671,
  };
  const OSAKA: Coordinates = Coordinates {
    latitude: 34.7025,
    longitude: 135.4959,
  };

  #[test]
  fn same_point_is_zero() {
    for p in [TOKYO, OSAKA, Coordinates::new(0.0, 0.0), Coordinates::new(-89.9, 179.9)] {
      assert_eq!(distance_km(p, p), 0.0);
    }
  }

  #[test]
  fn distance_is_symmetric() {
    let ab = distance_km(TOKYO, OSAKA);
    let ba = distance_km(OSAKA, TOKYO);
    assert!((ab - ba).abs() < 1e-9);
  }

  #[test]
  fn tokyo_to_osaka_is_about_400_km() {
    let d = distance_km(TOKYO, OSAKA);
    assert!((395.0..410.0).contains(&d), "got {}", d);
  }

  #[test]
  fn one_degree_of_latitude() {
    let d = distance_km(Coordinates::new(35.0, 139.0), Coordinates::new(36.0, 139.0));
    assert!((d - 111.19).abs() < 0.1, "got {}", d);
  }

  #[test]
  fn nan_propagates() {
    let d = distance_km(Coordinates::new(f64::NAN, 139.0), TOKYO);
    assert!(d.is_nan());
  }
}
