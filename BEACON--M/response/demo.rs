//! Sample catalog and incident used by the CLI demo and by tests.

use std::fmt::Write as _;

use crate::{
    catalog::Catalog,
    module::{Coordinate, HazardZone, IncidentReport, ResponsePlan, ResponseUnit, ValidationError},
};

fn unit(
    id: &str,
    unit_type: &str,
    (lat, lon): (f64, f64),
    speed_kmh: f64,
    capabilities: &[&str],
) -> Result<ResponseUnit, ValidationError> {
    ResponseUnit::new(
        id,
        unit_type,
        Coordinate::new(lat, lon)?,
        speed_kmh,
        capabilities.iter().map(|c| (*c).to_string()).collect(),
    )
}

/// Four units and two hazard zones around lower Manhattan.
pub fn default_catalog() -> Result<Catalog, ValidationError> {
    let units = vec![
        unit(
            "MED-12",
            "ambulance",
            (40.741, -73.989),
            70.0,
            &["Paramedic", "Ambulance", "Advanced Life Support"],
        )?,
        unit(
            "FIRE-7",
            "fire engine",
            (40.729, -73.997),
            65.0,
            &["Fire Engine", "Hazmat", "Ladder"],
        )?,
        unit(
            "POL-9",
            "patrol",
            (40.749, -73.976),
            85.0,
            &["Law Enforcement", "Crowd Control"],
        )?,
        unit(
            "SAR-3",
            "rescue",
            (40.751, -73.971),
            60.0,
            &["Search and Rescue", "Boat Rescue"],
        )?,
    ];
    let zones = vec![
        HazardZone::new(
            "FLOOD-A",
            Coordinate::new(40.735, -73.995)?,
            3.5,
            "urban flood risk",
            1.0,
        )?,
        HazardZone::new(
            "IND-4",
            Coordinate::new(40.726, -74.003)?,
            2.0,
            "industrial hazard zone",
            1.2,
        )?,
    ];
    Ok(Catalog::new(zones, units))
}

/// Building fire with trapped occupants, inside both demo hazard zones.
pub fn sample_report() -> Result<IncidentReport, ValidationError> {
    Ok(IncidentReport::new(
        "INC-1001",
        "Multiple people trapped after explosion and fire in lower building levels; \
         heavy smoke and severe injuries reported.",
        Coordinate::new(40.733, -73.993)?,
    ))
}

/// Operator-facing text rendering of a plan.
#[must_use]
pub fn render_plan(plan: &ResponsePlan) -> String {
    let mut out = String::new();
    let none_if_empty = |items: &[String]| {
        if items.is_empty() {
            "None".to_string()
        } else {
            items.join(", ")
        }
    };
    let _ = writeln!(out, "=== Emergency Response Plan: {} ===", plan.incident_id);
    let _ = writeln!(out, "Incident type: {}", plan.triage.incident_type);
    let _ = writeln!(out, "Severity: {}/10", plan.triage.severity_score);
    let _ = writeln!(
        out,
        "Urgent signals: {}",
        none_if_empty(&plan.triage.urgent_signals)
    );
    let _ = writeln!(out, "Risk context: {}", none_if_empty(&plan.risk_context));
    let _ = writeln!(out, "\nTop units:");
    if plan.recommendations.is_empty() {
        let _ = writeln!(out, " - none available");
    }
    for rec in &plan.recommendations {
        let _ = writeln!(
            out,
            " - {}: suitability={:.2}, ETA={:.1} min, distance={:.2} km",
            rec.unit_id, rec.suitability, rec.eta_minutes, rec.distance_km
        );
    }
    let _ = writeln!(out, "\nActions:");
    for action in &plan.actions {
        let _ = writeln!(out, " - {action}");
    }
    out
}
