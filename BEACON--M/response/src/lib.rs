#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Emergency response planning core: triage of caller narratives, hazard-zone
//! geofencing, response unit ranking and action synthesis.

/// Action list synthesis.
#[path = "../actions.rs"]
pub mod actions;
/// Zone/unit catalogs and the snapshot store.
#[path = "../catalog.rs"]
pub mod catalog;
/// TOML configuration.
#[path = "../config.rs"]
pub mod config;
#[path = "../demo.rs"]
pub mod demo;
/// Stateless intelligence engine.
#[path = "../intelligence/main.rs"]
pub mod intelligence;
/// Domain value types.
#[path = "../module.rs"]
pub mod module;
/// Orchestrator and runtime entry points.
#[path = "../main.rs"]
pub mod orchestration_entry;
/// Inbound request validation.
#[path = "../request.rs"]
pub mod request;
/// Telemetry builder/hook for planning components.
#[path = "../telemetry.rs"]
pub mod telemetry;

pub use actions::{synthesize_actions, ResponseTier};
pub use catalog::{Catalog, CatalogStore};
pub use config::{PlanningSettings, ResponseConfig};
pub use intelligence::{
    haversine_km, tokenize, KeywordTables, LocationIntelligenceEngine, SeverityTier, TokenStream,
    DEFAULT_RECOMMENDATION_LIMIT,
};
pub use module::{
    Coordinate, HazardZone, IncidentReport, IncidentType, ResponsePlan, ResponseUnit,
    TriageResult, UnitRecommendation, ValidationError,
};
pub use orchestration_entry::{ResponseOrchestrator, ResponseRuntime};
pub use request::PlanRequest;
pub use telemetry::{ResponseTelemetry, ResponseTelemetryBuilder};
