use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::module::{Coordinate, IncidentReport, ValidationError};

/// Inbound planning request as a host layer would receive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Free-text caller narrative.
    pub incident_text: String,
    /// Incident latitude.
    pub latitude: f64,
    /// Incident longitude.
    pub longitude: f64,
    /// Caller-supplied id; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
}

impl PlanRequest {
    /// Validates the request and turns it into a report.
    pub fn into_report(self) -> Result<IncidentReport, ValidationError> {
        let narrative = self.incident_text.trim();
        if narrative.is_empty() {
            return Err(ValidationError::MissingNarrative);
        }
        let location = Coordinate::new(self.latitude, self.longitude)?;
        let id = self
            .incident_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_incident_id);
        Ok(IncidentReport::new(id, narrative, location))
    }
}

/// Fresh `INC-<uuid>` identifier.
#[must_use]
pub fn generate_incident_id() -> String {
    format!("INC-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_payload() {
        let request: PlanRequest = serde_json::from_str(
            r#"{"incident_text":"  Explosion and smoke.  ","latitude":40.733,"longitude":-73.993}"#,
        )
        .unwrap();
        let report = request.into_report().unwrap();
        assert_eq!(report.narrative(), "Explosion and smoke.");
        assert!(report.id().starts_with("INC-"));
        assert_eq!(report.location().latitude(), 40.733);
    }

    #[test]
    fn keeps_supplied_id() {
        let request = PlanRequest {
            incident_text: "smoke".into(),
            latitude: 1.0,
            longitude: 1.0,
            incident_id: Some("UI-REQUEST".into()),
        };
        assert_eq!(request.into_report().unwrap().id(), "UI-REQUEST");
    }

    #[test]
    fn rejects_blank_text_and_bad_coordinates() {
        let blank = PlanRequest {
            incident_text: "   ".into(),
            latitude: 1.0,
            longitude: 1.0,
            incident_id: None,
        };
        assert_eq!(blank.into_report(), Err(ValidationError::MissingNarrative));

        let off_map = PlanRequest {
            incident_text: "fire".into(),
            latitude: 1.0,
            longitude: 200.0,
            incident_id: None,
        };
        assert_eq!(
            off_map.into_report(),
            Err(ValidationError::LongitudeOutOfRange(200.0))
        );
    }
}
