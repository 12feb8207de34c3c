use std::sync::Arc;

use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    actions::{synthesize_actions, ResponseTier},
    catalog::{Catalog, CatalogStore},
    config::ResponseConfig,
    intelligence::{LocationIntelligenceEngine, DEFAULT_RECOMMENDATION_LIMIT},
    module::{HazardZone, IncidentReport, ResponsePlan, ResponseUnit},
    telemetry::ResponseTelemetry,
};

/// Composes triage, geofencing and ranking into one plan over a fixed catalog snapshot.
///
/// `build_plan` takes `&self` and mutates nothing, so one instance can serve
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct ResponseOrchestrator {
    engine: LocationIntelligenceEngine,
    catalog: Arc<Catalog>,
    recommendation_limit: usize,
    telemetry: Option<ResponseTelemetry>,
}

impl ResponseOrchestrator {
    /// Creates an orchestrator over the given zones and units with built-in tables.
    #[must_use]
    pub fn new(
        zones: impl IntoIterator<Item = HazardZone>,
        units: impl IntoIterator<Item = ResponseUnit>,
    ) -> Self {
        Self::from_catalog(Arc::new(Catalog::new(zones, units)))
    }

    /// Creates an orchestrator over a shared catalog snapshot.
    #[must_use]
    pub fn from_catalog(catalog: Arc<Catalog>) -> Self {
        Self {
            engine: LocationIntelligenceEngine::default(),
            catalog,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            telemetry: None,
        }
    }

    /// Builds an orchestrator from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &ResponseConfig) -> Self {
        Self::from_catalog(Arc::new(config.catalog.clone()))
            .with_engine(LocationIntelligenceEngine::new(config.tables.clone()))
            .with_recommendation_limit(config.planning.recommendation_limit)
    }

    /// Swaps the intelligence engine (e.g. for custom keyword tables).
    #[must_use]
    pub fn with_engine(mut self, engine: LocationIntelligenceEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Caps the number of recommendations per plan.
    #[must_use]
    pub const fn with_recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = limit;
        self
    }

    /// Injects telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: ResponseTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Catalog snapshot this instance plans against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Builds the response plan for one report.
    #[must_use]
    pub fn build_plan(&self, report: &IncidentReport) -> ResponsePlan {
        assemble_plan(
            &self.engine,
            &self.catalog,
            self.recommendation_limit,
            self.telemetry.as_ref(),
            report,
        )
    }
}

/// Long-lived planning service whose catalog can change between calls.
///
/// Each call plans against one catalog snapshot; updates are copy-on-write.
#[derive(Debug)]
pub struct ResponseRuntime {
    engine: LocationIntelligenceEngine,
    store: CatalogStore,
    recommendation_limit: usize,
    telemetry: Option<ResponseTelemetry>,
}

impl ResponseRuntime {
    /// Creates a runtime with built-in tables.
    #[must_use]
    pub fn new(catalog: Catalog, telemetry: Option<ResponseTelemetry>) -> Self {
        Self {
            engine: LocationIntelligenceEngine::default(),
            store: CatalogStore::new(catalog),
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            telemetry,
        }
    }

    /// Creates a runtime from a loaded configuration.
    #[must_use]
    pub fn from_config(config: ResponseConfig, telemetry: Option<ResponseTelemetry>) -> Self {
        Self {
            engine: LocationIntelligenceEngine::new(config.tables),
            store: CatalogStore::new(config.catalog),
            recommendation_limit: config.planning.recommendation_limit,
            telemetry,
        }
    }

    /// Current catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        self.store.snapshot()
    }

    /// Current catalog version.
    #[must_use]
    pub fn catalog_version(&self) -> u64 {
        self.store.version()
    }

    /// Replaces the whole catalog and announces the new version.
    pub fn replace_catalog(&self, catalog: Catalog) -> u64 {
        let version = self.store.replace(catalog);
        self.announce_swap(version, "replace", None);
        version
    }

    /// Adds or updates a unit; returns the new version when the catalog changed.
    pub fn upsert_unit(&self, unit: ResponseUnit) -> Option<u64> {
        let id = unit.id().to_string();
        let version = self.store.upsert_unit(unit)?;
        self.announce_swap(version, "upsert_unit", Some(&id));
        Some(version)
    }

    /// Removes a unit; returns the new version when one was removed.
    pub fn remove_unit(&self, unit_id: &str) -> Option<u64> {
        let version = self.store.remove_unit(unit_id)?;
        self.announce_swap(version, "remove_unit", Some(unit_id));
        Some(version)
    }

    /// Adds or updates a hazard zone; returns the new version when the catalog changed.
    pub fn upsert_zone(&self, zone: HazardZone) -> Option<u64> {
        let id = zone.id().to_string();
        let version = self.store.upsert_zone(zone)?;
        self.announce_swap(version, "upsert_zone", Some(&id));
        Some(version)
    }

    /// Removes a hazard zone; returns the new version when one was removed.
    pub fn remove_zone(&self, zone_id: &str) -> Option<u64> {
        let version = self.store.remove_zone(zone_id)?;
        self.announce_swap(version, "remove_zone", Some(zone_id));
        Some(version)
    }

    fn announce_swap(&self, version: u64, change: &str, subject: Option<&str>) {
        let Some(tel) = &self.telemetry else {
            return;
        };
        let catalog = self.store.snapshot();
        let payload = json!({
            "version": version,
            "change": change,
            "subject": subject,
            "zones": catalog.zones.len(),
            "units": catalog.units.len(),
        });
        let _ = tel.log(LogLevel::Info, "response.catalog.swapped", None, &payload);
        let _ = tel.event("response.catalog.swapped", None, payload);
    }

    /// Orchestrator pinned to the current catalog version.
    #[must_use]
    pub fn orchestrator(&self) -> ResponseOrchestrator {
        let mut orchestrator = ResponseOrchestrator::from_catalog(self.store.snapshot())
            .with_engine(self.engine.clone())
            .with_recommendation_limit(self.recommendation_limit);
        orchestrator.telemetry = self.telemetry.clone();
        orchestrator
    }

    /// Builds a plan against the catalog version current at call time.
    #[must_use]
    pub fn build_plan(&self, report: &IncidentReport) -> ResponsePlan {
        let catalog = self.store.snapshot();
        assemble_plan(
            &self.engine,
            &catalog,
            self.recommendation_limit,
            self.telemetry.as_ref(),
            report,
        )
    }
}

fn assemble_plan(
    engine: &LocationIntelligenceEngine,
    catalog: &Catalog,
    limit: usize,
    telemetry: Option<&ResponseTelemetry>,
    report: &IncidentReport,
) -> ResponsePlan {
    log(
        telemetry,
        LogLevel::Debug,
        "response.plan.begin",
        report.id(),
        &json!({ "zones": catalog.zones.len(), "units": catalog.units.len() }),
    );

    let active = engine.active_hazard_zones(report.location(), &catalog.zones);
    let risk_modifier: f64 = active.iter().map(|zone| zone.severity_modifier()).sum();
    let triage = engine.triage(report, risk_modifier);
    let recommendations = engine.rank_units(
        triage.incident_type,
        report.location(),
        &catalog.units,
        limit,
    );
    let risk_context = active
        .iter()
        .map(|zone| format!("{} ({})", zone.risk_type(), zone.id()))
        .collect();
    let actions = synthesize_actions(&triage, &recommendations);

    let plan = ResponsePlan {
        incident_id: report.id().to_string(),
        triage,
        risk_context,
        recommendations,
        actions,
    };
    report_plan(telemetry, &plan, risk_modifier);
    plan
}

fn report_plan(telemetry: Option<&ResponseTelemetry>, plan: &ResponsePlan, risk_modifier: f64) {
    let Some(tel) = telemetry else {
        return;
    };
    let incident = Some(plan.incident_id.as_str());
    if plan.recommendations.is_empty() {
        let _ = tel.log(
            LogLevel::Warn,
            "response.plan.no_units",
            incident,
            &json!({ "incident_type": plan.triage.incident_type }),
        );
    }
    let summary = json!({
        "incident_type": plan.triage.incident_type,
        "severity": plan.triage.severity_score,
        "risk_modifier": risk_modifier,
        "active_zones": plan.risk_context.len(),
        "recommendations": plan.recommendations.len(),
        "primary_unit": plan.primary_unit().map(|rec| rec.unit_id.clone()),
    });
    let _ = tel.log(LogLevel::Info, "response.plan.built", incident, &summary);
    let _ = tel.event("response.plan.built", incident, summary);
    if ResponseTier::for_severity(plan.triage.severity_score) == ResponseTier::Escalate {
        let _ = tel.event(
            "response.plan.escalated",
            incident,
            json!({
                "severity": plan.triage.severity_score,
                "urgent_signals": plan.triage.urgent_signals,
            }),
        );
    }
}

fn log(
    telemetry: Option<&ResponseTelemetry>,
    level: LogLevel,
    message: &str,
    incident_id: &str,
    metadata: &serde_json::Value,
) {
    if let Some(tel) = telemetry {
        let _ = tel.log(level, message, Some(incident_id), metadata);
    }
}
