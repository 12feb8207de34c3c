use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction-time failures for the domain value types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Latitude or longitude is NaN or infinite.
    #[error("coordinate is not finite: ({latitude}, {longitude})")]
    NonFiniteCoordinate {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },
    /// Latitude outside [-90, 90].
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside [-180, 180].
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    /// Hazard zone radius below zero.
    #[error("zone {zone_id} has negative radius {radius_km} km")]
    NegativeRadius {
        /// Offending zone.
        zone_id: String,
        /// Rejected radius.
        radius_km: f64,
    },
    /// Unit speed below zero.
    #[error("unit {unit_id} has negative speed {speed_kmh} km/h")]
    NegativeSpeed {
        /// Offending unit.
        unit_id: String,
        /// Rejected speed.
        speed_kmh: f64,
    },
    /// A numeric field is NaN or infinite.
    #[error("{field} is not finite")]
    NonFiniteValue {
        /// Field name.
        field: &'static str,
    },
    /// The caller narrative is empty after trimming.
    #[error("incident narrative is required")]
    MissingNarrative,
    /// Category label not in the fixed set.
    #[error("unknown incident type: {0}")]
    UnknownIncidentType(String),
}

/// Fixed incident categories. Declaration order is the tie-break order for classification.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum IncidentType {
    /// Medical emergency; also the fallback when nothing matches.
    #[default]
    Medical,
    /// Fire, smoke, explosion.
    Fire,
    /// Violence or crime.
    Police,
    /// Trapped, stranded or missing people.
    Rescue,
    /// Utilities, chemical releases, structures.
    Infrastructure,
}

impl IncidentType {
    /// Every category in tie-break order.
    pub const ALL: [Self; 5] = [
        Self::Medical,
        Self::Fire,
        Self::Police,
        Self::Rescue,
        Self::Infrastructure,
    ];

    /// Lowercase label used in wire output and configuration keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Fire => "fire",
            Self::Police => "police",
            Self::Rescue => "rescue",
            Self::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IncidentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == wanted)
            .ok_or_else(|| ValidationError::UnknownIncidentType(s.to_string()))
    }
}

/// A validated point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ValidationError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Validates and builds a coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate {
                latitude,
                longitude,
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One caller's report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentReport {
    id: String,
    narrative: String,
    location: Coordinate,
    reported_at: DateTime<Utc>,
}

impl IncidentReport {
    /// Creates a report stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, narrative: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            narrative: narrative.into(),
            location,
            reported_at: Utc::now(),
        }
    }

    /// Overrides the report timestamp.
    #[must_use]
    pub const fn with_reported_at(mut self, reported_at: DateTime<Utc>) -> Self {
        self.reported_at = reported_at;
        self
    }

    /// Incident identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw caller narrative.
    #[must_use]
    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    /// Where the incident happened.
    #[must_use]
    pub const fn location(&self) -> Coordinate {
        self.location
    }

    /// When the report was received.
    #[must_use]
    pub const fn reported_at(&self) -> DateTime<Utc> {
        self.reported_at
    }
}

/// Circular geofenced risk area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardZone {
    id: String,
    center: Coordinate,
    radius_km: f64,
    risk_type: String,
    severity_modifier: f64,
}

impl HazardZone {
    /// Validates and builds a zone. The modifier may carry any sign but must be finite.
    pub fn new(
        id: impl Into<String>,
        center: Coordinate,
        radius_km: f64,
        risk_type: impl Into<String>,
        severity_modifier: f64,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if !radius_km.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "radius_km" });
        }
        if radius_km < 0.0 {
            return Err(ValidationError::NegativeRadius {
                zone_id: id,
                radius_km,
            });
        }
        if !severity_modifier.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "severity_modifier",
            });
        }
        Ok(Self {
            id,
            center,
            radius_km,
            risk_type: risk_type.into(),
            severity_modifier,
        })
    }

    /// Zone identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Zone center.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Radius in kilometres.
    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Risk label, e.g. `urban flood risk`.
    #[must_use]
    pub fn risk_type(&self) -> &str {
        &self.risk_type
    }

    /// Severity bonus applied to incidents inside the zone.
    #[must_use]
    pub const fn severity_modifier(&self) -> f64 {
        self.severity_modifier
    }
}

/// A dispatchable asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseUnit {
    id: String,
    unit_type: String,
    location: Coordinate,
    speed_kmh: f64,
    capabilities: Vec<String>,
    available: bool,
}

impl ResponseUnit {
    /// Validates and builds an available unit. A speed of zero is accepted.
    pub fn new(
        id: impl Into<String>,
        unit_type: impl Into<String>,
        location: Coordinate,
        speed_kmh: f64,
        capabilities: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if !speed_kmh.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "speed_kmh" });
        }
        if speed_kmh < 0.0 {
            return Err(ValidationError::NegativeSpeed {
                unit_id: id,
                speed_kmh,
            });
        }
        Ok(Self {
            id,
            unit_type: unit_type.into(),
            location,
            speed_kmh,
            capabilities,
            available: true,
        })
    }

    /// Sets the availability flag.
    #[must_use]
    pub const fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Unit identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Asset kind, e.g. `ambulance`.
    #[must_use]
    pub fn unit_type(&self) -> &str {
        &self.unit_type
    }

    /// Current position.
    #[must_use]
    pub const fn location(&self) -> Coordinate {
        self.location
    }

    /// Travel speed in km/h.
    #[must_use]
    pub const fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Free-text capability tags as supplied.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Whether the unit can be dispatched.
    #[must_use]
    pub const fn available(&self) -> bool {
        self.available
    }
}

/// Classification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Inferred category.
    pub incident_type: IncidentType,
    /// Severity in 1..=10.
    pub severity_score: u8,
    /// Critical and high tier signals found, deduplicated and sorted.
    pub urgent_signals: Vec<String>,
}

/// One ranked candidate unit. Numeric fields are rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecommendation {
    /// Unit identifier.
    pub unit_id: String,
    /// Composite ranking score (2 decimals); may be negative.
    pub suitability: f64,
    /// Great-circle distance to the incident (2 decimals).
    pub distance_km: f64,
    /// Estimated travel time (1 decimal).
    pub eta_minutes: f64,
}

/// Final planning output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePlan {
    /// Incident the plan was built for.
    pub incident_id: String,
    /// Classification and severity.
    pub triage: TriageResult,
    /// `"{risk_type} ({zone_id})"` per active zone, in catalog order.
    pub risk_context: Vec<String>,
    /// Best units first.
    pub recommendations: Vec<UnitRecommendation>,
    /// Ordered operator actions.
    pub actions: Vec<String>,
}

impl ResponsePlan {
    /// Top-ranked unit, if any unit was available.
    #[must_use]
    pub fn primary_unit(&self) -> Option<&UnitRecommendation> {
        self.recommendations.first()
    }
}
