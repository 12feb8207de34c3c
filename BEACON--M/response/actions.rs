use serde::{Deserialize, Serialize};

use crate::module::{TriageResult, UnitRecommendation};

/// Severity at or above which the response escalates to multiple agencies.
pub const ESCALATION_THRESHOLD: u8 = 8;
/// Severity at or above which secondary support is staged.
pub const STAGING_THRESHOLD: u8 = 5;

const NOTIFY_LINE: &str = "Notify nearest command center and initiate digital incident log.";
const ESCALATE_LINE: &str = "Escalate to multi-agency response and request regional backup.";
const PUBLIC_ALERT_LINE: &str = "Trigger public alert workflow if life safety risk may spread.";
const STAGE_LINE: &str = "Stage secondary support units and monitor telemetry every 3 minutes.";
const LOCAL_LINE: &str = "Handle with local unit response and maintain periodic updates.";

/// Response posture selected from the severity score. Exactly one applies per plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTier {
    /// Multi-agency escalation plus public alerting.
    Escalate,
    /// Secondary units staged, tight polling.
    Stage,
    /// Local handling.
    Local,
}

impl ResponseTier {
    /// Picks the tier for a severity score.
    #[must_use]
    pub const fn for_severity(severity: u8) -> Self {
        if severity >= ESCALATION_THRESHOLD {
            Self::Escalate
        } else if severity >= STAGING_THRESHOLD {
            Self::Stage
        } else {
            Self::Local
        }
    }

    fn lines(self) -> &'static [&'static str] {
        match self {
            Self::Escalate => &[ESCALATE_LINE, PUBLIC_ALERT_LINE],
            Self::Stage => &[STAGE_LINE],
            Self::Local => &[LOCAL_LINE],
        }
    }
}

/// Builds the ordered operator action list.
///
/// Classification and notification always lead; the dispatch line appears only
/// when a unit was recommended; the severity tier lines close the list.
#[must_use]
pub fn synthesize_actions(
    triage: &TriageResult,
    recommendations: &[UnitRecommendation],
) -> Vec<String> {
    let mut actions = vec![
        format!(
            "Classify incident as {} with severity {}/10.",
            triage.incident_type, triage.severity_score
        ),
        NOTIFY_LINE.to_string(),
    ];
    if let Some(top) = recommendations.first() {
        actions.push(format!(
            "Dispatch primary unit {} (ETA {:?} min, distance {:?} km).",
            top.unit_id, top.eta_minutes, top.distance_km
        ));
    }
    actions.extend(
        ResponseTier::for_severity(triage.severity_score)
            .lines()
            .iter()
            .map(|line| (*line).to_string()),
    );
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::IncidentType;

    fn triage(severity: u8) -> TriageResult {
        TriageResult {
            incident_type: IncidentType::Fire,
            severity_score: severity,
            urgent_signals: vec![],
        }
    }

    fn rec() -> UnitRecommendation {
        UnitRecommendation {
            unit_id: "FIRE-7".into(),
            suitability: 130.5,
            distance_km: 0.5,
            eta_minutes: 0.5,
        }
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(ResponseTier::for_severity(10), ResponseTier::Escalate);
        assert_eq!(ResponseTier::for_severity(8), ResponseTier::Escalate);
        assert_eq!(ResponseTier::for_severity(7), ResponseTier::Stage);
        assert_eq!(ResponseTier::for_severity(5), ResponseTier::Stage);
        assert_eq!(ResponseTier::for_severity(4), ResponseTier::Local);
        assert_eq!(ResponseTier::for_severity(1), ResponseTier::Local);
    }

    #[test]
    fn escalation_with_dispatch() {
        let actions = synthesize_actions(&triage(9), &[rec()]);
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], "Classify incident as fire with severity 9/10.");
        assert_eq!(
            actions[2],
            "Dispatch primary unit FIRE-7 (ETA 0.5 min, distance 0.5 km)."
        );
        assert!(actions[3].starts_with("Escalate to multi-agency response"));
        assert!(actions[4].starts_with("Trigger public alert workflow"));
    }

    #[test]
    fn no_units_omits_dispatch() {
        let actions = synthesize_actions(&triage(3), &[]);
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(|a| !a.starts_with("Dispatch")));
        assert_eq!(actions[2], LOCAL_LINE);
        assert_eq!(synthesize_actions(&triage(6), &[])[2], STAGE_LINE);
    }

    #[test]
    fn dispatch_prints_rounded_figures_unpadded() {
        let unit = UnitRecommendation {
            unit_id: "MED-12".into(),
            suitability: 97.41,
            distance_km: 2.0,
            eta_minutes: 1.7,
        };
        let actions = synthesize_actions(&triage(6), &[unit]);
        assert_eq!(
            actions[2],
            "Dispatch primary unit MED-12 (ETA 1.7 min, distance 2.0 km)."
        );
    }
}
