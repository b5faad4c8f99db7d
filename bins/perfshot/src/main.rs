use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use perfshot_pipeline::{pipeline, RunConfig};
use perfshot_process::CommandSpec;

/// Load-generation and profiling harness.
///
/// Launches the server under test, fires HTTP shots at it while a
/// sampling profiler records its call stacks, then renders the trace
/// into a flame graph.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Command that launches the server under test (program followed by its arguments)
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    server_command: Vec<String>,

    /// Number of shots to fire
    #[arg(long, default_value_t = 100)]
    shots: u32,

    /// Cooldown between shots, in milliseconds
    #[arg(long, default_value_t = 100)]
    cooldown_ms: u64,

    /// Seed for the shot sequence; the same seed gives the same URL order
    #[arg(long, default_value_t = 123_456_789)]
    seed: u64,

    /// Upper bound of the raw random draw, reduced modulo the pool size
    #[arg(long, default_value_t = 1000)]
    random_limit: u32,

    /// Target URL; repeat to extend the pool (defaults to the built-in pool)
    #[arg(long = "ammo")]
    ammunition: Vec<String>,

    /// Directory receiving the trace and graph artifacts
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// HTTP client executable used to fire shots
    #[arg(long, default_value = "curl")]
    http_client: String,

    /// Sampling profiler executable
    #[arg(long, default_value = "perf")]
    profiler: String,

    /// Directory containing stackcollapse-perf.pl and flamegraph.pl
    #[arg(long)]
    flamegraph_dir: Option<PathBuf>,

    /// Bound on the profiler wait and each post-processing stage, in seconds
    #[arg(long, default_value_t = 10)]
    stage_timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug)?;

    let server = CommandSpec::from_vec(args.server_command)
        .ok_or_else(|| anyhow::anyhow!("server command must not be empty"))?;

    let mut config = RunConfig::new(server);
    config.shot_count = args.shots;
    config.cooldown = Duration::from_millis(args.cooldown_ms);
    config.seed = args.seed;
    config.random_limit = args.random_limit;
    config.output_dir = args.output_dir;
    config.http_client = args.http_client;
    config.profiler = args.profiler;
    config.stage_timeout = Duration::from_secs(args.stage_timeout_secs);
    if !args.ammunition.is_empty() {
        config.ammunition = args.ammunition;
    }
    if let Some(dir) = args.flamegraph_dir {
        config.flamegraph_dir = dir;
    }

    info!("Starting profiling run: {}", config.server);

    match pipeline::run(&config).await {
        Ok(report) => {
            info!(
                "Run complete: {} shots, artifacts in {}",
                report.shots_fired,
                config.output_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(anyhow::anyhow!("Run failed: {}", e))
        }
    }
}

fn initialize_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();

    Ok(())
}
