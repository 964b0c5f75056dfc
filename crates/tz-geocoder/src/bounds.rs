//! Country bounding box checks

use crate::{Coordinate, GeocodeError, Result};
use serde::{Deserialize, Serialize};

/// Rectangular latitude/longitude range (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountryBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

/// Mainland Tanzania plus Zanzibar and Pemba
pub const TANZANIA_BOUNDS: CountryBounds = CountryBounds {
    min_latitude: -11.75,
    max_latitude: -0.95,
    min_longitude: 29.3,
    max_longitude: 40.5,
};

impl CountryBounds {
    /// NaN components never satisfy the range comparisons
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&coord.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&coord.longitude)
    }

    /// Same as [`contains`](Self::contains) but reports why a point fails.
    ///
    /// Non-finite input is `InvalidInput`, a finite point outside the box is
    /// `OutOfBounds`. Whether `OutOfBounds` is advisory is up to the caller.
    pub fn check(&self, coord: &Coordinate) -> Result<()> {
        coord.validate()?;
        if self.contains(coord) {
            Ok(())
        } else {
            Err(GeocodeError::OutOfBounds {
                latitude: coord.latitude,
                longitude: coord.longitude,
            })
        }
    }
}

impl Default for CountryBounds {
    fn default() -> Self {
        TANZANIA_BOUNDS
    }
}

pub fn is_within_country_bounds(coord: &Coordinate) -> bool {
    TANZANIA_BOUNDS.contains(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_points() {
        // Dar es Salaam
        assert!(is_within_country_bounds(&Coordinate::new(-6.7924, 39.2083)));
        // South of the southern limit
        assert!(!is_within_country_bounds(&Coordinate::new(-15.0, 39.0)));
        // Kampala, north of the box
        assert!(!is_within_country_bounds(&Coordinate::new(0.3476, 32.5825)));
    }

    #[test]
    fn test_each_edge_rejects() {
        // north, south, west, east
        for (lat, lon) in [(-0.90, 35.0), (-11.80, 35.0), (-6.0, 29.25), (-6.0, 40.55)] {
            assert!(
                !is_within_country_bounds(&Coordinate::new(lat, lon)),
                "({lat}, {lon})"
            );
        }
    }

    #[test]
    fn test_edges_are_inclusive() {
        assert!(is_within_country_bounds(&Coordinate::new(-11.75, 29.3)));
        assert!(is_within_country_bounds(&Coordinate::new(-0.95, 40.5)));
        assert!(!is_within_country_bounds(&Coordinate::new(-0.94, 35.0)));
        assert!(!is_within_country_bounds(&Coordinate::new(-6.0, 40.51)));
    }

    #[test]
    fn test_nan_is_never_inside() {
        assert!(!is_within_country_bounds(&Coordinate::new(f64::NAN, 35.0)));
        assert!(!is_within_country_bounds(&Coordinate::new(-6.0, f64::NAN)));
    }

    #[test]
    fn test_check_reports_reason() {
        assert_eq!(TANZANIA_BOUNDS.check(&Coordinate::new(-6.0, 35.0)), Ok(()));
        assert_eq!(
            TANZANIA_BOUNDS.check(&Coordinate::new(-15.0, 39.0)),
            Err(GeocodeError::OutOfBounds {
                latitude: -15.0,
                longitude: 39.0
            })
        );
        assert!(matches!(
            TANZANIA_BOUNDS.check(&Coordinate::new(f64::INFINITY, 39.0)),
            Err(GeocodeError::InvalidInput(_))
        ));
    }
}
