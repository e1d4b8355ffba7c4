use clap::{Args, Parser, Subcommand};
use log::info;
use nakib_nav::headless::save_test_cases;
use nakib_nav::{load_test_cases, run_batch, BarrierSweep, LogSink, Point, SimulationConfig, Suite, TestCase};
use std::error::Error;
use std::path::PathBuf;

/// Headless batch runner for the nakib route planner.
#[derive(Parser)]
#[command(name = "nakib-batch")]
#[command(about = "Run obstacle-avoidance test batches and report safety statistics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a built-in suite or a YAML batch file
    Run(RunArgs),
    /// Write a suite or a barrier sweep to a YAML batch file
    Generate(GenerateArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct CaseSource {
    /// Built-in suite to run
    #[arg(long, value_enum)]
    suite: Option<Suite>,

    /// YAML file holding a list of test cases
    #[arg(long)]
    batch: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: CaseSource,

    /// Simulation settings (YAML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving results.yaml, summary.yaml and frames.yaml
    #[arg(long, default_value = "test_results")]
    output: PathBuf,

    /// Override the per-test frame cap
    #[arg(long)]
    frame_limit: Option<usize>,

    /// Skip writing per-frame records
    #[arg(long)]
    summary_only: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Built-in suite to export; a barrier sweep is generated when omitted
    #[arg(long, value_enum)]
    suite: Option<Suite>,

    /// Output batch file
    #[arg(long, default_value = "test_configs/custom_tests.yaml")]
    output: PathBuf,

    /// Sweep start point as "x,y"
    #[arg(long, value_parser = parse_point, default_value = "0,0")]
    start: Point,

    /// Sweep goal point as "x,y"
    #[arg(long, value_parser = parse_point, default_value = "20,20")]
    goal: Point,

    /// Sweep obstacle as "x,y"; repeat for several obstacles
    #[arg(long = "obstacle", value_parser = parse_point)]
    obstacles: Vec<Point>,

    #[arg(long, default_value_t = 0.02)]
    speed: f64,

    #[arg(long, default_value_t = 0.5)]
    min_barrier: f64,

    #[arg(long, default_value_t = 3.0)]
    max_barrier: f64,

    #[arg(long, default_value_t = 0.5)]
    step: f64,
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{value}\""))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("invalid x in \"{value}\": {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("invalid y in \"{value}\": {e}"))?;
    Ok(Point::new(x, y))
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_yaml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(frame_limit) = args.frame_limit {
        config.frame_limit = frame_limit;
    }

    let cases: Vec<TestCase> = match (args.source.suite, &args.source.batch) {
        (Some(suite), _) => suite.cases(),
        (None, Some(path)) => load_test_cases(path)?,
        (None, None) => return Err("either --suite or --batch is required".into()),
    };

    let collector = run_batch(&cases, &config, &mut LogSink)?;
    collector.summary().log();

    collector.save_results(args.output.join("results.yaml"))?;
    collector.save_summary(args.output.join("summary.yaml"))?;
    if !args.summary_only {
        collector.save_frames(args.output.join("frames.yaml"))?;
    }
    info!("Results saved in {}", args.output.display());
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let cases = match args.suite {
        Some(suite) => suite.cases(),
        None => {
            let defaults = BarrierSweep::default();
            let sweep = BarrierSweep {
                start: args.start,
                goal: args.goal,
                obstacles: if args.obstacles.is_empty() {
                    defaults.obstacles
                } else {
                    args.obstacles
                },
                speed: args.speed,
                min_barrier: args.min_barrier,
                max_barrier: args.max_barrier,
                step: args.step,
            };
            sweep.cases()?
        }
    };

    for case in &cases {
        case.validate()?;
    }
    save_test_cases(&args.output, &cases)?;
    info!("Wrote {} test case(s) to {}", cases.len(), args.output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Generate(args) => generate(args),
    }
}
