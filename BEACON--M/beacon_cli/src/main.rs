use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use beacon_response::{
    demo, PlanRequest, ResponseConfig, ResponseOrchestrator, ResponsePlan, ResponseTelemetry,
};
use clap::{Args, Parser, Subcommand};
use shared_event_bus::FileEventPublisher;
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "beacon", version, about = "Emergency response planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Builds a plan from a narrative and a coordinate.
    Plan(PlanArgs),
    /// Builds a plan from a JSON request document (`-` reads stdin).
    Request {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Runs the bundled sample incident against the demo catalog.
    Demo,
    /// Validates a configuration file and summarizes its catalog.
    Check {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Caller narrative.
    #[arg(long)]
    text: String,
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
    /// Incident id; generated when omitted.
    #[arg(long)]
    id: Option<String>,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Catalog/keyword configuration; the demo catalog is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured recommendation limit.
    #[arg(long)]
    limit: Option<usize>,
    /// JSON-lines log file.
    #[arg(long)]
    log_path: Option<PathBuf>,
    /// JSON-lines event file.
    #[arg(long)]
    event_log: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = run(cli)?;
    println!("{output}");
    Ok(())
}

fn run(cli: Cli) -> Result<String> {
    match cli.command {
        Commands::Plan(args) => {
            let request = PlanRequest {
                incident_text: args.text,
                latitude: args.lat,
                longitude: args.lon,
                incident_id: args.id,
            };
            plan_request(request, &args.common)
        }
        Commands::Request { input, common } => {
            let raw = read_input(&input)?;
            let request: PlanRequest = serde_json::from_str(&raw)
                .with_context(|| format!("decoding plan request {}", input.display()))?;
            plan_request(request, &common)
        }
        Commands::Demo => {
            let catalog = demo::default_catalog()?;
            let orchestrator = ResponseOrchestrator::new(catalog.zones, catalog.units);
            let plan = orchestrator.build_plan(&demo::sample_report()?);
            Ok(demo::render_plan(&plan))
        }
        Commands::Check { config } => check_config(&config),
    }
}

fn plan_request(request: PlanRequest, common: &CommonArgs) -> Result<String> {
    let report = request.into_report().context("invalid plan request")?;
    let orchestrator = build_orchestrator(common)?;
    let plan = orchestrator.build_plan(&report);
    render_json(&plan, common.pretty)
}

fn build_orchestrator(common: &CommonArgs) -> Result<ResponseOrchestrator> {
    let mut orchestrator = match &common.config {
        Some(path) => ResponseOrchestrator::from_config(&ResponseConfig::load(path)?),
        None => {
            let catalog = demo::default_catalog()?;
            ResponseOrchestrator::new(catalog.zones, catalog.units)
        }
    };
    if let Some(limit) = common.limit {
        orchestrator = orchestrator.with_recommendation_limit(limit);
    }
    if let Some(telemetry) = build_telemetry(common)? {
        orchestrator = orchestrator.with_telemetry(telemetry);
    }
    Ok(orchestrator)
}

fn build_telemetry(common: &CommonArgs) -> Result<Option<ResponseTelemetry>> {
    if common.log_path.is_none() && common.event_log.is_none() {
        return Ok(None);
    }
    let mut builder = ResponseTelemetry::builder("beacon").min_level(LogLevel::Info);
    if let Some(path) = &common.log_path {
        builder = builder.log_path(path);
    }
    if let Some(path) = &common.event_log {
        builder = builder.event_publisher(Arc::new(FileEventPublisher::new(path)?));
    }
    builder.build().map(Some)
}

fn render_json(plan: &ResponsePlan, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(plan)?
    } else {
        serde_json::to_string(plan)?
    };
    Ok(rendered)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("reading plan request from stdin")?;
        return Ok(raw);
    }
    fs::read_to_string(path).with_context(|| format!("reading plan request {}", path.display()))
}

fn check_config(path: &Path) -> Result<String> {
    let config = ResponseConfig::load(path)?;
    Ok(format!(
        "{}: version {}, {} zones, {} units ({} available), recommendation limit {}",
        path.display(),
        config.version,
        config.catalog.zones.len(),
        config.catalog.units.len(),
        config.catalog.available_units(),
        config.planning.recommendation_limit
    ))
}
