#![doc = include_str!("../README.md")]

mod app;

use app::commands::{run_decode, run_generate};
use app::config::{CliArgs, Command, GenerateConfig};
use app::telemetry::init_telemetry;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    init_telemetry()?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());

    match args.command {
        Command::Generate(args) => {
            let config = GenerateConfig::try_from(args)?;
            if cfg!(debug_assertions) {
                tracing::debug!("Starting with full config: {:#?}", config);
            }
            run_generate(&config, &mut out).map(|_| ())
        }
        Command::Decode(args) => run_decode(&args, &mut out),
    }
}
