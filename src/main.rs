//! # Slitheria Map Generator Entry Point
//!
//! Generates maps from the command line, printing them or saving them as
//! numbered map files, and checks saved maps for solvability.

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use slitheria::persistence;
use slitheria::{
    generate, random_dimensions, seeded_rng, GenerationConfig, MapValidator,
    ReachabilityValidator, SlitheriaError, SlitheriaResult, TerrainStrategy,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command line arguments for the Slitheria map generator.
#[derive(Parser, Debug)]
#[command(name = "slitheria")]
#[command(about = "Procedural, provably solvable maps for the Slitheria puzzle-platformer")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one or more maps
    Generate(GenerateArgs),

    /// Validate a saved map file
    Check {
        /// Map file in the text format
        file: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Map width in tiles
    #[arg(long, default_value_t = slitheria::config::DEFAULT_MAP_WIDTH)]
    width: i32,

    /// Map height in tiles
    #[arg(long, default_value_t = slitheria::config::DEFAULT_MAP_HEIGHT)]
    height: i32,

    /// Pick each map's size at random in the large-map range (overrides --width/--height)
    #[arg(long)]
    random_size: bool,

    /// Random seed; further maps use seed + 1, seed + 2, ...
    #[arg(short, long)]
    seed: Option<u64>,

    /// Terrain strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::CellCollapse)]
    strategy: StrategyArg,

    /// Number of maps to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,

    /// Save maps as numbered files in this directory instead of printing them
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format when printing
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// JSON generation config; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    CellCollapse,
    ChamberLayout,
    MazeWithRooms,
}

impl From<StrategyArg> for TerrainStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::CellCollapse => TerrainStrategy::CellCollapse,
            StrategyArg::ChamberLayout => TerrainStrategy::ChamberLayout,
            StrategyArg::MazeWithRooms => TerrainStrategy::MazeWithRooms,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Slitheria map generator v{}", slitheria::VERSION);

    let result = match &args.command {
        Command::Generate(generate_args) => run_generate(generate_args),
        Command::Check { file } => run_check(file),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes env_logger at the requested level unless RUST_LOG is set.
fn initialize_logging(log_level: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(log_level),
    };
    builder.format_target(false).init();
}

fn load_config(path: Option<&Path>) -> SlitheriaResult<GenerationConfig> {
    let Some(path) = path else {
        return Ok(GenerationConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config: GenerationConfig = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

fn run_generate(args: &GenerateArgs) -> SlitheriaResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let strategy = TerrainStrategy::from(args.strategy);
    let base_seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let mut size_rng = seeded_rng(base_seed);

    for index in 0..args.count {
        let seed = base_seed.wrapping_add(index as u64);
        let (width, height) = if args.random_size {
            random_dimensions(&mut size_rng)
        } else {
            (args.width, args.height)
        };

        let document = generate(width, height, Some(seed), strategy, &config)?;
        info!(
            "Generated map with dimensions: {}x{} ({})",
            document.width(),
            document.height(),
            document.description
        );

        match (&args.output_dir, args.format) {
            (Some(dir), _) => {
                let path = persistence::save_numbered(dir, &document)?;
                println!("{}", path.display());
            }
            (None, OutputFormat::Text) => print!("{}", document),
            (None, OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&document)?),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_check(file: &Path) -> SlitheriaResult<ExitCode> {
    let document = match persistence::load(file) {
        Ok(document) => document,
        Err(SlitheriaError::Validation(failure)) => {
            println!("{}: invalid ({})", file.display(), failure);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e),
    };

    match ReachabilityValidator.validate(&document.grid) {
        Ok(()) => {
            println!(
                "{}: solvable ({}x{}, {} portal pairs)",
                file.display(),
                document.width(),
                document.height(),
                document.portals.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            println!("{}: invalid ({})", file.display(), failure);
            Ok(ExitCode::FAILURE)
        }
    }
}
