//! Decay row exporter.
//!
//! Usage:
//!     decay_rows --events <path> [--output <path>] [--config <path>]
//!     decay_rows --simulate <n> [--seed <seed>] [--template xi]
//!
//! Output:
//!     One JSON object per row (event, decay instance, role, position,
//!     detector, track), newline separated. The batch summary goes to stderr.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use decay_hit_matcher::common::{simulate_events, SimulationConfig};
use decay_hit_matcher::decay::{
    DecayPipeline, DecayTemplate, EventBatch, JsonLinesSink, PipelineConfig, PipelineError,
};
use decay_hit_matcher::reporter::LoggingReporter;

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TemplateArg {
    /// Omega → Lambda K, Lambda → p pi
    Omega,
    /// Xi → Lambda pi, Lambda → p pi
    Xi,
}

impl From<TemplateArg> for DecayTemplate {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Omega => DecayTemplate::omega(),
            TemplateArg::Xi => DecayTemplate::xi(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "decay_rows")]
#[command(about = "Match decay chains in truth records and export their detector hits")]
#[command(group(ArgGroup::new("input").required(true).args(["events", "simulate"])))]
struct Args {
    /// Event batch JSON file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Generate this many synthetic events instead of reading a file
    #[arg(long)]
    simulate: Option<usize>,

    /// Generator parameters (JSON), used with --simulate
    #[arg(long, requires = "simulate")]
    simulation_config: Option<PathBuf>,

    /// Random seed for --simulate
    #[arg(long)]
    seed: Option<u64>,

    /// Pipeline configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decay template, overrides the configuration file
    #[arg(long, value_enum)]
    template: Option<TemplateArg>,

    /// Process only the first N events
    #[arg(long)]
    limit: Option<usize>,

    /// Process events in parallel
    #[arg(long)]
    parallel: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Setup
// =============================================================================

fn pipeline_config(args: &Args) -> Result<PipelineConfig, PipelineError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(template) = args.template {
        config.template = template.into();
    }
    if args.limit.is_some() {
        config.event_limit = args.limit;
    }
    config.parallel |= args.parallel;
    Ok(config)
}

fn load_events(args: &Args, template: DecayTemplate) -> Result<EventBatch, PipelineError> {
    if let Some(path) = &args.events {
        log::info!("Loading events from {}", path.display());
        return EventBatch::load(path);
    }

    let mut simulation = match &args.simulation_config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| PipelineError::io(format!("reading {}", path.display()), e))?;
            serde_json::from_str::<SimulationConfig>(&text)
                .map_err(|e| PipelineError::parse("simulation config", e))?
        }
        None => SimulationConfig {
            template,
            ..Default::default()
        },
    };
    if let Some(n) = args.simulate {
        simulation.num_events = n;
    }
    log::info!(
        "Simulating {} events (seed {:?})",
        simulation.num_events,
        args.seed
    );
    simulate_events(&simulation, args.seed)
}

fn open_output(args: &Args) -> Result<Box<dyn Write>, PipelineError> {
    match &args.output {
        Some(path) => {
            let file = fs::File::create(path)
                .map_err(|e| PipelineError::io(format!("creating {}", path.display()), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = pipeline_config(&args)?;
    let batch = load_events(&args, config.template)?;
    let pipeline = DecayPipeline::new(config)?;

    let mut sink = JsonLinesSink::new(open_output(&args)?);
    let reporter = if args.verbose > 1 {
        LoggingReporter::verbose()
    } else {
        LoggingReporter::new()
    };
    let summary = pipeline.run_with_reporter(&batch, &mut sink, reporter)?;

    log::debug!("Wrote {} rows", sink.rows_written());
    eprintln!("{}", summary.to_json_pretty());
    Ok(())
}
