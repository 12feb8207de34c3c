use std::collections::HashSet;

use indexmap::IndexSet;

use super::geo::haversine_km;
use crate::module::{Coordinate, ResponseUnit, UnitRecommendation};

/// Recommendations returned when the caller does not choose a limit.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;
/// Starting suitability before penalties and bonuses.
pub const BASE_SUITABILITY: f64 = 100.0;
/// Penalty per kilometre of distance.
pub const DISTANCE_PENALTY_PER_KM: f64 = 3.0;
/// Bonus per matching capability tag.
pub const CAPABILITY_BONUS: f64 = 20.0;
/// Speed floor for ETA math, in km/h.
pub const MIN_EFFECTIVE_SPEED_KMH: f64 = 1.0;

/// Unrounded ranking inputs for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitScore<'a> {
    /// Scored unit.
    pub unit: &'a ResponseUnit,
    /// Exact distance to the incident.
    pub distance_km: f64,
    /// Exact travel time.
    pub eta_minutes: f64,
    /// Matching capability tags.
    pub capability_overlap: usize,
    /// Exact suitability, the sort key.
    pub suitability: f64,
}

impl UnitScore<'_> {
    /// Display form with rounded figures.
    #[must_use]
    pub fn to_recommendation(&self) -> UnitRecommendation {
        UnitRecommendation {
            unit_id: self.unit.id().to_string(),
            suitability: round_to(self.suitability, 2),
            distance_km: round_to(self.distance_km, 2),
            eta_minutes: round_to(self.eta_minutes, 1),
        }
    }
}

/// Travel time in minutes with the speed floored at 1 km/h.
#[must_use]
pub fn eta_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    (distance_km / speed_kmh.max(MIN_EFFECTIVE_SPEED_KMH)) * 60.0
}

/// Number of required tags the unit carries, compared case-insensitively.
#[must_use]
pub fn capability_overlap(required: Option<&IndexSet<String>>, unit: &ResponseUnit) -> usize {
    let Some(required) = required else {
        return 0;
    };
    let carried: HashSet<String> = unit
        .capabilities()
        .iter()
        .map(|tag| tag.to_lowercase())
        .collect();
    required.iter().filter(|tag| carried.contains(*tag)).count()
}

/// Scores one unit against an incident location.
#[must_use]
pub fn score_unit<'a>(
    unit: &'a ResponseUnit,
    incident_location: Coordinate,
    required: Option<&IndexSet<String>>,
) -> UnitScore<'a> {
    let distance_km = haversine_km(incident_location, unit.location());
    let eta_minutes = eta_minutes(distance_km, unit.speed_kmh());
    let capability_overlap = capability_overlap(required, unit);
    #[allow(clippy::cast_precision_loss)]
    let bonus = capability_overlap as f64 * CAPABILITY_BONUS;
    let suitability =
        BASE_SUITABILITY - (distance_km * DISTANCE_PENALTY_PER_KM) - eta_minutes + bonus;
    UnitScore {
        unit,
        distance_km,
        eta_minutes,
        capability_overlap,
        suitability,
    }
}

/// Scores available units and orders them best first.
///
/// Unavailable units are skipped entirely. The sort is stable on the exact
/// suitability, so ties keep catalog order; rounding happens afterwards.
#[must_use]
pub fn rank<'a>(
    incident_location: Coordinate,
    units: &'a [ResponseUnit],
    required: Option<&IndexSet<String>>,
    limit: usize,
) -> Vec<UnitScore<'a>> {
    let mut scored: Vec<UnitScore<'a>> = units
        .iter()
        .filter(|unit| unit.available())
        .map(|unit| score_unit(unit, incident_location, required))
        .collect();
    scored.sort_by(|a, b| b.suitability.total_cmp(&a.suitability));
    scored.truncate(limit);
    scored
}

/// Rounds to `decimals` places, exact ties going to the even digit.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, lat: f64, lon: f64, speed: f64, caps: &[&str]) -> ResponseUnit {
        ResponseUnit::new(
            id,
            "test",
            Coordinate::new(lat, lon).unwrap(),
            speed,
            caps.iter().map(|c| (*c).to_string()).collect(),
        )
        .unwrap()
    }

    fn required(tags: &[&str]) -> IndexSet<String> {
        tags.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn zero_speed_is_floored() {
        assert_eq!(eta_minutes(2.0, 0.0), 120.0);
        assert_eq!(eta_minutes(2.0, 0.5), 120.0);
        assert_eq!(eta_minutes(30.0, 60.0), 30.0);
    }

    #[test]
    fn overlap_ignores_case_and_duplicates() {
        let needed = required(&["paramedic", "advanced life support"]);
        let medic = unit("M", 0.0, 0.0, 60.0, &["PARAMEDIC", "Paramedic", "Advanced Life Support"]);
        assert_eq!(capability_overlap(Some(&needed), &medic), 2);
        assert_eq!(capability_overlap(None, &medic), 0);
    }

    #[test]
    fn suitability_formula() {
        let here = Coordinate::new(0.0, 0.0).unwrap();
        let parked = unit("P", 0.0, 0.0, 60.0, &["Hazmat"]);
        let needed = required(&["hazmat", "ladder"]);
        let score = score_unit(&parked, here, Some(&needed));
        assert_eq!(score.distance_km, 0.0);
        assert_eq!(score.capability_overlap, 1);
        assert_eq!(score.suitability, 120.0);
    }

    #[test]
    fn unavailable_units_never_ranked() {
        let here = Coordinate::new(10.0, 10.0).unwrap();
        let units = vec![
            unit("A", 10.0, 10.0, 60.0, &[]).with_availability(false),
            unit("B", 10.5, 10.0, 60.0, &[]),
            unit("C", 10.0, 10.0, 60.0, &[]).with_availability(false),
        ];
        let ranked = rank(here, &units, None, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].unit.id(), "B");
    }

    #[test]
    fn sorted_descending_with_stable_ties_and_limit() {
        let here = Coordinate::new(0.0, 0.0).unwrap();
        let units = vec![
            unit("TIE-1", 0.1, 0.0, 60.0, &[]),
            unit("FAR", 0.5, 0.0, 60.0, &[]),
            unit("TIE-2", 0.1, 0.0, 60.0, &[]),
            unit("NEAR", 0.0, 0.0, 60.0, &[]),
        ];
        let ranked = rank(here, &units, None, 3);
        let ids: Vec<_> = ranked.iter().map(|s| s.unit.id()).collect();
        assert_eq!(ids, vec!["NEAR", "TIE-1", "TIE-2"]);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].suitability >= pair[1].suitability));
        assert!(rank(here, &units, None, 0).is_empty());
    }

    #[test]
    fn rounding_only_touches_output() {
        let here = Coordinate::new(0.0, 0.0).unwrap();
        let far = unit("F", 0.0123, 0.0, 37.0, &[]);
        let score = score_unit(&far, here, None);
        let rec = score.to_recommendation();
        assert_eq!(rec.distance_km, round_to(score.distance_km, 2));
        assert_eq!(rec.eta_minutes, round_to(score.eta_minutes, 1));
        assert_ne!(rec.suitability, score.suitability);
    }

    #[test]
    fn exact_score_orders_units_that_round_alike() {
        let here = Coordinate::new(0.0, 0.0).unwrap();
        // ~99.991 listed before ~99.994; both display as 99.99.
        let units = vec![
            unit("LOWER", 0.000_020, 0.0, 60.0, &[]),
            unit("HIGHER", 0.000_014, 0.0, 60.0, &[]),
        ];
        let ranked = rank(here, &units, None, 2);
        assert!(ranked[0].suitability > ranked[1].suitability);
        let recs: Vec<_> = ranked.iter().map(UnitScore::to_recommendation).collect();
        assert_eq!(recs[0].unit_id, "HIGHER");
        assert_eq!(recs[1].unit_id, "LOWER");
        assert_eq!(recs[0].suitability, 99.99);
        assert_eq!(recs[1].suitability, 99.99);
    }

    #[test]
    fn display_rounding_sends_ties_to_even() {
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(-1.5, 0), -2.0);
    }

    #[test]
    fn capability_tags_are_not_trimmed() {
        let needed = required(&["paramedic"]);
        let padded = unit("M", 0.0, 0.0, 60.0, &[" Paramedic "]);
        assert_eq!(capability_overlap(Some(&needed), &padded), 0);
    }
}
