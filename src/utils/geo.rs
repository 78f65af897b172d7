//! Geo math for tiling a search area with circles.

use serde::{Deserialize, Serialize};

use crate::config::{EARTH_RADIUS_METERS, HEX_RING_POINTS, HEX_RING_SPACING};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

/// Destination reached from `origin` after `distance_m` meters along the
/// initial `bearing` (radians, clockwise from north) on a spherical Earth.
pub fn destination_point(origin: Coordinate, distance_m: f64, bearing: f64) -> Coordinate {
    let angular = distance_m / EARTH_RADIUS_METERS;
    let lat = origin.latitude.to_radians();

    let new_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let new_lon = origin.longitude.to_radians()
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * new_lat.sin());

    Coordinate::new(new_lat.to_degrees(), new_lon.to_degrees())
}

/// Centers of the six circles surrounding a search circle.
///
/// Given the center and radius (meters) of one circle, returns the centers of
/// its neighbours in a hexagonal packing: bearings 0°, 60°, … 300°, each at
/// `1.732 × radius` from the center. Longitudes are not normalized.
pub fn calc_surrounding_coords(
    latitude: f64,
    longitude: f64,
    radius_m: f64,
) -> [Coordinate; HEX_RING_POINTS] {
    let center = Coordinate::new(latitude, longitude);
    let distance = HEX_RING_SPACING * radius_m;

    std::array::from_fn(|i| {
        let bearing = (i as f64 * 60.0).to_radians();
        destination_point(center, distance, bearing)
    })
}
