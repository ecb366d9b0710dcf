use crate::event::GeoCoordinate;
use crate::shared::entity::{Entity, ID};

const EARTH_RADIUS_KM: f64 = 6371.0;
const MILES_PER_KM: f64 = 0.621371;

/// A named metro area with a circular catchment used to match events to
/// nearby newsletter subscribers. An event inside the radius counts as
/// part of the metro even when its city differs from the metro's anchor
/// city (e.g. an event in Aurora, OH matches the Cleveland metro).
#[derive(Debug, Clone, PartialEq)]
pub struct MetroArea {
    pub id: ID,
    pub name: String,
    pub city: String,
    pub state: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub radius_miles: f64,
}

impl MetroArea {
    pub fn center(&self) -> GeoCoordinate {
        GeoCoordinate {
            latitude: self.center_latitude,
            longitude: self.center_longitude,
        }
    }

    pub fn covers(&self, coordinate: &GeoCoordinate) -> bool {
        let distance_km = distance_km(&self.center(), coordinate);
        distance_km * MILES_PER_KM <= self.radius_miles
    }
}

impl Entity for MetroArea {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// Great-circle distance between two coordinates (haversine).
pub fn distance_km(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let lat_1 = a.latitude.to_radians();
    let lat_2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_1.cos() * lat_2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
