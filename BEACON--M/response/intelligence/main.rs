//! Stateless incident intelligence: tokenization, classification, severity,
//! hazard geofencing and unit ranking.
//!
//! Every operation is a pure function of its inputs and the keyword tables the
//! engine was built with.

/// Great-circle distance and zone containment.
pub mod geo;
/// Classification, severity and capability tables.
pub mod keywords;
/// Unit scoring and ordering.
pub mod ranking;
/// Narrative tokenization.
pub mod text;

use std::collections::BTreeSet;

use indexmap::IndexMap;

pub use geo::haversine_km;
pub use keywords::{KeywordTables, SeverityTier};
pub use ranking::DEFAULT_RECOMMENDATION_LIMIT;
pub use text::{tokenize, TokenStream};

use crate::module::{
    Coordinate, HazardZone, IncidentReport, IncidentType, ResponseUnit, TriageResult,
    UnitRecommendation,
};

/// Severity before any signal or zone contributes.
pub const BASE_SEVERITY: i64 = 3;
/// Lowest reportable severity.
pub const MIN_SEVERITY: u8 = 1;
/// Highest reportable severity.
pub const MAX_SEVERITY: u8 = 10;
/// Points for a phrase keyword during classification.
const PHRASE_POINTS: u32 = 2;
/// Points for a single-word keyword during classification.
const WORD_POINTS: u32 = 1;

/// Severity outcome before it is folded into a [`TriageResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityAssessment {
    /// Clamped score.
    pub score: u8,
    /// Sorted, deduplicated urgent signals.
    pub urgent_signals: Vec<String>,
}

/// Keyword-driven incident intelligence engine.
#[derive(Debug, Clone, Default)]
pub struct LocationIntelligenceEngine {
    tables: KeywordTables,
}

impl LocationIntelligenceEngine {
    /// Creates an engine over the given tables.
    #[must_use]
    pub const fn new(tables: KeywordTables) -> Self {
        Self { tables }
    }

    /// Tables in use.
    #[must_use]
    pub const fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    /// Keyword points per category, in tie-break order.
    ///
    /// A phrase found in the joined narrative scores 2, a word found among the tokens scores 1.
    #[must_use]
    pub fn category_scores(&self, tokens: &TokenStream) -> IndexMap<IncidentType, u32> {
        IncidentType::ALL
            .into_iter()
            .map(|kind| {
                let points = self
                    .tables
                    .incident_keywords(kind)
                    .map(|keyword| {
                        if text::is_phrase(keyword) {
                            if tokens.contains_phrase(keyword) {
                                PHRASE_POINTS
                            } else {
                                0
                            }
                        } else if tokens.contains_word(keyword) {
                            WORD_POINTS
                        } else {
                            0
                        }
                    })
                    .sum();
                (kind, points)
            })
            .collect()
    }

    /// Highest-scoring category; ties go to the earlier category, no match means medical.
    #[must_use]
    pub fn infer_incident_type(&self, tokens: &TokenStream) -> IncidentType {
        let mut best = IncidentType::default();
        let mut best_points = 0;
        for (kind, points) in self.category_scores(tokens) {
            if points > best_points {
                best = kind;
                best_points = points;
            }
        }
        best
    }

    /// Additive severity score adjusted by the zone modifier, rounded half-to-even and clamped.
    #[must_use]
    pub fn score_severity(&self, tokens: &TokenStream, risk_modifier: f64) -> SeverityAssessment {
        let mut score = BASE_SEVERITY;
        let mut urgent = BTreeSet::new();
        for tier in SeverityTier::ALL {
            for signal in self.tables.severity_signals(tier) {
                let hit = if tier.matches_phrases() {
                    tokens.matches_term(signal)
                } else {
                    tokens.contains_word(signal)
                };
                if !hit {
                    continue;
                }
                score += tier.weight();
                if tier.is_urgent() {
                    urgent.insert(signal.to_string());
                }
            }
        }
        SeverityAssessment {
            score: clamp_severity(score, risk_modifier),
            urgent_signals: urgent.into_iter().collect(),
        }
    }

    /// Classifies the report narrative and scores its severity.
    #[must_use]
    pub fn triage(&self, report: &IncidentReport, risk_modifier: f64) -> TriageResult {
        let tokens = TokenStream::from_text(report.narrative());
        let incident_type = self.infer_incident_type(&tokens);
        let severity = self.score_severity(&tokens, risk_modifier);
        TriageResult {
            incident_type,
            severity_score: severity.score,
            urgent_signals: severity.urgent_signals,
        }
    }

    /// Zones whose radius covers `location`, in catalog order.
    #[must_use]
    pub fn active_hazard_zones<'a>(
        &self,
        location: Coordinate,
        zones: &'a [HazardZone],
    ) -> Vec<&'a HazardZone> {
        geo::active_zones(location, zones)
    }

    /// Available units ordered by suitability for the incident, at most `limit`.
    #[must_use]
    pub fn rank_units(
        &self,
        incident_type: IncidentType,
        incident_location: Coordinate,
        units: &[ResponseUnit],
        limit: usize,
    ) -> Vec<UnitRecommendation> {
        let required = self.tables.required_capabilities(incident_type);
        ranking::rank(incident_location, units, required, limit)
            .iter()
            .map(ranking::UnitScore::to_recommendation)
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn clamp_severity(raw: i64, risk_modifier: f64) -> u8 {
    let adjusted = (raw as f64 + risk_modifier).round_ties_even();
    let bounded = adjusted.clamp(f64::from(MIN_SEVERITY), f64::from(MAX_SEVERITY));
    (bounded as u8).clamp(MIN_SEVERITY, MAX_SEVERITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LocationIntelligenceEngine {
        LocationIntelligenceEngine::default()
    }

    fn stream(text: &str) -> TokenStream {
        TokenStream::from_text(text)
    }

    #[test]
    fn no_keywords_defaults_to_medical() {
        let e = engine();
        assert_eq!(e.infer_incident_type(&stream("")), IncidentType::Medical);
        assert_eq!(
            e.infer_incident_type(&stream("the cat is on the roof")),
            IncidentType::Medical
        );
    }

    #[test]
    fn phrases_outweigh_single_words() {
        let e = engine();
        // "gas leak" (2) beats "fire" (1).
        assert_eq!(
            e.infer_incident_type(&stream("Gas leak, maybe fire")),
            IncidentType::Infrastructure
        );
        let scores = e.category_scores(&stream("Gas leak, maybe fire"));
        assert_eq!(scores[&IncidentType::Infrastructure], 2);
        assert_eq!(scores[&IncidentType::Fire], 1);
    }

    #[test]
    fn ties_resolve_in_category_order() {
        let e = engine();
        // bleeding (medical) vs fire (fire): one point each.
        assert_eq!(
            e.infer_incident_type(&stream("bleeding near fire")),
            IncidentType::Medical
        );
        // weapon (police) vs trapped (rescue).
        assert_eq!(
            e.infer_incident_type(&stream("trapped with a weapon")),
            IncidentType::Police
        );
    }

    #[test]
    fn severity_tiers_add_up() {
        let e = engine();
        // explosion +4, not breathing +4, trapped +2, smoke +1 => 14 -> 10.
        let text = stream("Explosion with heavy smoke and trapped victims not breathing.");
        let assessment = e.score_severity(&text, 0.0);
        assert_eq!(assessment.score, 10);
        assert_eq!(
            assessment.urgent_signals,
            vec!["explosion", "not breathing", "trapped"]
        );

        // injury +1 => 4, moderate tier is not urgent.
        let minor = e.score_severity(&stream("minor injury"), 0.0);
        assert_eq!(minor.score, 4);
        assert!(minor.urgent_signals.is_empty());
    }

    #[test]
    fn high_tier_ignores_phrases() {
        let tables = KeywordTables::builtin()
            .with_severity_signals(SeverityTier::High, ["roof collapse"]);
        let e = LocationIntelligenceEngine::new(tables);
        let assessment = e.score_severity(&stream("roof collapse reported"), 0.0);
        assert_eq!(assessment.score, 3);
    }

    #[test]
    fn modifier_rounds_half_to_even_and_clamps() {
        let e = engine();
        let empty = stream("");
        assert_eq!(e.score_severity(&empty, 0.0).score, 3);
        assert_eq!(e.score_severity(&empty, 1.5).score, 4);
        assert_eq!(e.score_severity(&empty, 2.5).score, 6);
        assert_eq!(e.score_severity(&empty, 2.2).score, 5);
        assert_eq!(e.score_severity(&empty, -50.0).score, 1);
        assert_eq!(e.score_severity(&empty, 1e9).score, 10);
    }

    #[test]
    fn severity_always_in_bounds() {
        let e = engine();
        let long = "explosion unconscious not breathing mass casualty ".repeat(200);
        for modifier in [-1e6, -3.0, 0.0, 0.49, 7.5, 1e6] {
            for text in ["", "smoke", long.as_str()] {
                let score = e.score_severity(&stream(text), modifier).score;
                assert!((MIN_SEVERITY..=MAX_SEVERITY).contains(&score));
            }
        }
    }

    #[test]
    fn urgent_signals_deduplicated() {
        let e = engine();
        let assessment = e.score_severity(&stream("weapon weapon WEAPON"), 0.0);
        assert_eq!(assessment.urgent_signals, vec!["weapon"]);
        assert_eq!(assessment.score, 5);
    }

    #[test]
    fn rank_units_uses_category_capabilities() {
        let e = engine();
        let here = Coordinate::new(34.0522, -118.2437).unwrap();
        let units = vec![
            ResponseUnit::new(
                "ENGINE",
                "fire engine",
                Coordinate::new(34.0522, -118.2337).unwrap(),
                60.0,
                vec!["Fire Engine".into(), "Ladder".into()],
            )
            .unwrap(),
            ResponseUnit::new(
                "PATROL",
                "patrol",
                Coordinate::new(34.0522, -118.2407).unwrap(),
                60.0,
                vec!["Law Enforcement".into()],
            )
            .unwrap(),
        ];
        let fire = e.rank_units(IncidentType::Fire, here, &units, 3);
        assert_eq!(fire[0].unit_id, "ENGINE");
        let police = e.rank_units(IncidentType::Police, here, &units, 3);
        assert_eq!(police[0].unit_id, "PATROL");
        assert_eq!(e.rank_units(IncidentType::Police, here, &units, 1).len(), 1);
    }
}
