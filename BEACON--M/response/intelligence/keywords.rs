use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::module::IncidentType;

const MEDICAL_KEYWORDS: &[&str] = &[
    "unconscious",
    "bleeding",
    "heart",
    "stroke",
    "injury",
    "collapse",
];
const FIRE_KEYWORDS: &[&str] = &["fire", "smoke", "burning", "explosion", "flames"];
const POLICE_KEYWORDS: &[&str] = &["assault", "weapon", "robbery", "shooter", "violence"];
const RESCUE_KEYWORDS: &[&str] = &["trapped", "flood", "landslide", "missing", "stranded"];
const INFRASTRUCTURE_KEYWORDS: &[&str] =
    &["gas leak", "chemical", "power outage", "bridge", "spill"];

const CRITICAL_SIGNALS: &[&str] = &[
    "unconscious",
    "explosion",
    "active shooter",
    "mass casualty",
    "not breathing",
];
const HIGH_SIGNALS: &[&str] = &["severe", "trapped", "weapon", "spreading", "major"];
const MODERATE_SIGNALS: &[&str] = &["injury", "smoke", "bleeding", "flooding", "panic"];

const MEDICAL_CAPABILITIES: &[&str] = &["paramedic", "ambulance", "advanced life support"];
const FIRE_CAPABILITIES: &[&str] = &["fire engine", "hazmat", "ladder"];
const POLICE_CAPABILITIES: &[&str] = &["law enforcement", "tactical", "crowd control"];
const RESCUE_CAPABILITIES: &[&str] = &["search and rescue", "boat rescue", "high-angle rescue"];
const INFRASTRUCTURE_CAPABILITIES: &[&str] = &["utility response", "hazmat", "engineering"];

/// Severity signal tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    /// Life-threatening signals.
    Critical,
    /// Serious signals.
    High,
    /// Contributing signals, never reported as urgent.
    Moderate,
}

impl SeverityTier {
    /// Scan order.
    pub const ALL: [Self; 3] = [Self::Critical, Self::High, Self::Moderate];

    /// Points added per matching signal.
    #[must_use]
    pub const fn weight(self) -> i64 {
        match self {
            Self::Critical => 4,
            Self::High => 2,
            Self::Moderate => 1,
        }
    }

    /// Whether matches are reported in the urgent-signal list.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }

    /// Only critical signals are also matched as multi-word phrases.
    #[must_use]
    pub const fn matches_phrases(self) -> bool {
        matches!(self, Self::Critical)
    }

    /// Lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Moderate => "moderate",
        }
    }
}

/// Immutable lookup tables driving classification, severity and capability matching.
///
/// Terms are stored trimmed and lowercased; duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTables {
    incident: IndexMap<IncidentType, IndexSet<String>>,
    severity: IndexMap<SeverityTier, IndexSet<String>>,
    capabilities: IndexMap<IncidentType, IndexSet<String>>,
}

fn normalize_terms<I, S>(terms: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|term| term.as_ref().trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

impl KeywordTables {
    /// Tables with no terms at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            incident: IndexMap::new(),
            severity: IndexMap::new(),
            capabilities: IndexMap::new(),
        }
    }

    /// Built-in dispatch tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .with_incident_keywords(IncidentType::Medical, MEDICAL_KEYWORDS)
            .with_incident_keywords(IncidentType::Fire, FIRE_KEYWORDS)
            .with_incident_keywords(IncidentType::Police, POLICE_KEYWORDS)
            .with_incident_keywords(IncidentType::Rescue, RESCUE_KEYWORDS)
            .with_incident_keywords(IncidentType::Infrastructure, INFRASTRUCTURE_KEYWORDS)
            .with_severity_signals(SeverityTier::Critical, CRITICAL_SIGNALS)
            .with_severity_signals(SeverityTier::High, HIGH_SIGNALS)
            .with_severity_signals(SeverityTier::Moderate, MODERATE_SIGNALS)
            .with_capabilities(IncidentType::Medical, MEDICAL_CAPABILITIES)
            .with_capabilities(IncidentType::Fire, FIRE_CAPABILITIES)
            .with_capabilities(IncidentType::Police, POLICE_CAPABILITIES)
            .with_capabilities(IncidentType::Rescue, RESCUE_CAPABILITIES)
            .with_capabilities(IncidentType::Infrastructure, INFRASTRUCTURE_CAPABILITIES)
    }

    /// Replaces the classification keywords of one category.
    #[must_use]
    pub fn with_incident_keywords<I, S>(mut self, kind: IncidentType, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.incident.insert(kind, normalize_terms(terms));
        self
    }

    /// Replaces the signals of one severity tier.
    #[must_use]
    pub fn with_severity_signals<I, S>(mut self, tier: SeverityTier, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.severity.insert(tier, normalize_terms(terms));
        self
    }

    /// Replaces the capability tags required for one category.
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, kind: IncidentType, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capabilities.insert(kind, normalize_terms(terms));
        self
    }

    /// Classification keywords for a category (empty when unmapped).
    pub fn incident_keywords(&self, kind: IncidentType) -> impl Iterator<Item = &str> + '_ {
        self.incident
            .get(&kind)
            .into_iter()
            .flat_map(|terms| terms.iter().map(String::as_str))
    }

    /// Signals of a severity tier (empty when unmapped).
    pub fn severity_signals(&self, tier: SeverityTier) -> impl Iterator<Item = &str> + '_ {
        self.severity
            .get(&tier)
            .into_iter()
            .flat_map(|terms| terms.iter().map(String::as_str))
    }

    /// Lowercased capability tags required for a category; `None` when unmapped.
    #[must_use]
    pub fn required_capabilities(&self, kind: IncidentType) -> Option<&IndexSet<String>> {
        self.capabilities.get(&kind)
    }
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_cover_every_category() {
        let tables = KeywordTables::builtin();
        for kind in IncidentType::ALL {
            assert!(tables.incident_keywords(kind).count() >= 5);
            assert_eq!(tables.required_capabilities(kind).map(IndexSet::len), Some(3));
        }
        assert!(tables
            .severity_signals(SeverityTier::Critical)
            .any(|s| s == "not breathing"));
    }

    #[test]
    fn terms_are_normalized_and_deduplicated() {
        let tables = KeywordTables::empty().with_capabilities(
            IncidentType::Fire,
            ["  Hazmat ", "HAZMAT", "", "Ladder"],
        );
        let caps = tables.required_capabilities(IncidentType::Fire).unwrap();
        assert_eq!(caps.iter().collect::<Vec<_>>(), vec!["hazmat", "ladder"]);
        assert!(tables.required_capabilities(IncidentType::Police).is_none());
        assert_eq!(tables.incident_keywords(IncidentType::Police).count(), 0);
    }

    #[test]
    fn tier_weights_and_urgency() {
        assert_eq!(SeverityTier::Critical.weight(), 4);
        assert_eq!(SeverityTier::High.weight(), 2);
        assert_eq!(SeverityTier::Moderate.weight(), 1);
        assert!(!SeverityTier::Moderate.is_urgent());
        assert!(SeverityTier::Critical.matches_phrases());
        assert!(!SeverityTier::High.matches_phrases());
    }
}
