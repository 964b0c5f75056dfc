//! Great-circle distance

use crate::{Coordinate, EARTH_RADIUS_KM};
use std::f64::consts::PI;

/// Haversine distance between two points in km.
///
/// Total over all inputs: no bounds check happens here. The intermediate
/// `a` term is clamped to [0, 1] so floating-point overshoot on nearly
/// identical or antipodal points cannot produce NaN.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude * PI / 180.0;
    let lat2_rad = b.latitude * PI / 180.0;
    let dlat = (b.latitude - a.latitude) * PI / 180.0;
    let dlon = (b.longitude - a.longitude) * PI / 180.0;

    let h = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DAR: Coordinate = Coordinate::new(-6.7924, 39.2083);
    const DODOMA: Coordinate = Coordinate::new(-6.1630, 35.7516);

    #[test]
    fn test_known_distance() {
        // Dar es Salaam to Dodoma: ~390 km
        let d = haversine_km(DAR, DODOMA);
        assert!((d - 390.0).abs() < 15.0, "got {d}");
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_km(DAR, DAR), 0.0);
    }

    #[test]
    fn test_antipodal_points_do_not_nan() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-3);
    }

    #[test]
    fn test_method_matches_function() {
        assert_eq!(DAR.distance_km(&DODOMA), haversine_km(DAR, DODOMA));
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        #[test]
        fn fuzz_reflexive(c in coordinate()) {
            prop_assert!(haversine_km(c, c).abs() < 1e-9);
        }

        #[test]
        fn fuzz_symmetric(a in coordinate(), b in coordinate()) {
            prop_assert_eq!(haversine_km(a, b), haversine_km(b, a));
        }

        #[test]
        fn fuzz_bounded_and_non_negative(a in coordinate(), b in coordinate()) {
            let d = haversine_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
