use crate::module::{Coordinate, HazardZone};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometres.
#[must_use]
pub fn haversine_km(origin: Coordinate, target: Coordinate) -> f64 {
    let lat1 = origin.latitude().to_radians();
    let lat2 = target.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (target.longitude() - origin.longitude()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Whether `location` lies inside the zone. The boundary counts as inside.
#[must_use]
pub fn zone_contains(zone: &HazardZone, location: Coordinate) -> bool {
    haversine_km(location, zone.center()) <= zone.radius_km()
}

/// Zones containing `location`, in catalog order.
#[must_use]
pub fn active_zones<'a>(location: Coordinate, zones: &'a [HazardZone]) -> Vec<&'a HazardZone> {
    zones
        .iter()
        .filter(|zone| zone_contains(zone, location))
        .collect()
}
