use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    catalog::Catalog,
    intelligence::{KeywordTables, SeverityTier, DEFAULT_RECOMMENDATION_LIMIT},
    module::{Coordinate, HazardZone, IncidentType, ResponseUnit},
};

/// Parsed and validated planning configuration.
#[derive(Debug, Clone)]
pub struct ResponseConfig {
    /// Schema version (currently informational).
    pub version: u32,
    /// Planning knobs.
    pub planning: PlanningSettings,
    /// Zones and units.
    pub catalog: Catalog,
    /// Keyword tables with any overrides applied on top of the built-in ones.
    pub tables: KeywordTables,
    source: Option<PathBuf>,
}

impl ResponseConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading response config {}", path.display()))?;
        let mut config =
            Self::from_toml_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut document: ResponseConfigSerde = toml::from_str(raw)?;
        if document.planning.recommendation_limit == 0 {
            document.planning.recommendation_limit = default_recommendation_limit();
        }
        let catalog = build_catalog(document.zones, document.units)?;
        let tables = match document.keywords {
            Some(overrides) => overrides.apply(KeywordTables::builtin())?,
            None => KeywordTables::builtin(),
        };
        Ok(Self {
            version: document.version,
            planning: document.planning,
            catalog,
            tables,
            source: None,
        })
    }

    /// File the configuration was read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResponseConfigSerde {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    planning: PlanningSettings,
    #[serde(default)]
    zones: Vec<ZoneEntry>,
    #[serde(default)]
    units: Vec<UnitEntry>,
    #[serde(default)]
    keywords: Option<KeywordOverrides>,
}

/// Settings applied to every planning call.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanningSettings {
    /// Maximum recommendations per plan; 0 falls back to the default.
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            recommendation_limit: default_recommendation_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ZoneEntry {
    id: String,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    risk_type: String,
    #[serde(default)]
    severity_modifier: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    id: String,
    unit_type: String,
    latitude: f64,
    longitude: f64,
    speed_kmh: f64,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default = "default_true")]
    available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeywordOverrides {
    #[serde(default)]
    incident: IndexMap<String, Vec<String>>,
    #[serde(default)]
    severity: IndexMap<String, Vec<String>>,
    #[serde(default)]
    capabilities: IndexMap<String, Vec<String>>,
}

impl KeywordOverrides {
    fn apply(self, mut tables: KeywordTables) -> Result<KeywordTables> {
        for (key, terms) in self.incident {
            let kind: IncidentType = key
                .parse()
                .with_context(|| format!("keywords.incident.{key}"))?;
            tables = tables.with_incident_keywords(kind, terms);
        }
        for (key, terms) in self.severity {
            let Some(tier) = SeverityTier::ALL
                .into_iter()
                .find(|tier| tier.label() == key.trim().to_lowercase())
            else {
                bail!("keywords.severity.{key}: unknown severity tier");
            };
            tables = tables.with_severity_signals(tier, terms);
        }
        for (key, terms) in self.capabilities {
            let kind: IncidentType = key
                .parse()
                .with_context(|| format!("keywords.capabilities.{key}"))?;
            tables = tables.with_capabilities(kind, terms);
        }
        Ok(tables)
    }
}

fn build_catalog(zones: Vec<ZoneEntry>, units: Vec<UnitEntry>) -> Result<Catalog> {
    let mut seen = HashSet::new();
    let mut built_zones = Vec::with_capacity(zones.len());
    for entry in zones {
        if !seen.insert(entry.id.clone()) {
            bail!("duplicate zone id {}", entry.id);
        }
        let center = Coordinate::new(entry.latitude, entry.longitude)
            .with_context(|| format!("zone {}", entry.id))?;
        let zone = HazardZone::new(
            entry.id.clone(),
            center,
            entry.radius_km,
            entry.risk_type,
            entry.severity_modifier,
        )
        .with_context(|| format!("zone {}", entry.id))?;
        built_zones.push(zone);
    }

    seen.clear();
    let mut built_units = Vec::with_capacity(units.len());
    for entry in units {
        if !seen.insert(entry.id.clone()) {
            bail!("duplicate unit id {}", entry.id);
        }
        let location = Coordinate::new(entry.latitude, entry.longitude)
            .with_context(|| format!("unit {}", entry.id))?;
        let unit = ResponseUnit::new(
            entry.id.clone(),
            entry.unit_type,
            location,
            entry.speed_kmh,
            entry.capabilities,
        )
        .with_context(|| format!("unit {}", entry.id))?
        .with_availability(entry.available);
        built_units.push(unit);
    }
    Ok(Catalog::new(built_zones, built_units))
}

const fn default_recommendation_limit() -> usize {
    DEFAULT_RECOMMENDATION_LIMIT
}

const fn default_true() -> bool {
    true
}
