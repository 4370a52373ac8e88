use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use core::time::Duration;
use snowgen::{
    ClockPolicy, MAX_TIMESTAMP, MAX_WORKER_ID, SnowflakeId, SystemClock, TWITTER_EPOCH, TimeSource,
};

/// Command-line arguments for the `snowgen` binary.
///
/// Every option can also be supplied through the environment variable named in
/// its help text; a `.env` file in the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowgen",
    version,
    about = "Generate and inspect 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate IDs from a single worker and print one per line.
    Generate(GenerateArgs),
    /// Split IDs back into their timestamp, worker ID and sequence.
    Decode(DecodeArgs),
}

/// How generated IDs are printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain decimal integer.
    #[default]
    Decimal,
    /// Zero-padded to 20 digits, so the text sorts like the IDs.
    Padded,
    /// Multi-line field layout.
    Debug,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Worker ID assigned to this process, between 0 and 1023.
    ///
    /// Every concurrently running generator must use a different worker ID;
    /// nothing checks this for you.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, short = 'w', env = "WORKER_ID", allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Number of IDs to generate.
    ///
    /// Environment variable: `COUNT`
    #[arg(long, short = 'n', env = "COUNT", default_value_t = 1)]
    pub count: usize,

    /// Output format.
    ///
    /// Environment variable: `ID_FORMAT`
    #[arg(long, value_enum, env = "ID_FORMAT", default_value_t = OutputFormat::Decimal)]
    pub format: OutputFormat,

    /// Tolerate the clock moving backwards by up to this many milliseconds by
    /// waiting for it to catch up. Without it, any regression is an error.
    ///
    /// Environment variable: `CLOCK_WAIT_MS`
    #[arg(long, env = "CLOCK_WAIT_MS")]
    pub clock_wait_ms: Option<u64>,

    /// Reference epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = TWITTER_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// IDs to decode, in decimal.
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<SnowflakeId>,

    /// Reference epoch the IDs were generated against, in milliseconds since
    /// 1970-01-01 UTC.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = TWITTER_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,
}

/// Validated settings for `snowgen generate`.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub worker_id: i64,
    pub count: usize,
    pub format: OutputFormat,
    pub clock_policy: ClockPolicy,
    pub clock: SystemClock,
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = anyhow::Error;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        if !(0..=MAX_WORKER_ID as i64).contains(&args.worker_id) {
            bail!(
                "WORKER_ID ({}) is outside the Snowflake worker ID space (0..={})",
                args.worker_id,
                MAX_WORKER_ID
            );
        }

        if args.count == 0 {
            bail!("COUNT must be greater than 0");
        }

        let clock = SystemClock::with_epoch(Duration::from_millis(args.epoch_ms));
        check_epoch(args.epoch_ms, clock.current_millis())?;

        let clock_policy = args
            .clock_wait_ms
            .map_or(ClockPolicy::FailFast, ClockPolicy::WaitUpTo);

        Ok(Self {
            worker_id: args.worker_id,
            count: args.count,
            format: args.format,
            clock_policy,
            clock,
        })
    }
}

/// Checks that `reading`, the clock's current value against `epoch_ms`, fits
/// the timestamp field.
fn check_epoch(epoch_ms: u64, reading: u64) -> anyhow::Result<()> {
    // A clock pinned at zero would never reach the next millisecond once the
    // sequence space is spent.
    if reading == 0 {
        bail!("EPOCH_MS ({epoch_ms}) must be in the past");
    }
    if reading > MAX_TIMESTAMP {
        bail!(
            "EPOCH_MS ({epoch_ms}) is too far in the past: {reading}ms since then \
             exceeds the {MAX_TIMESTAMP}ms timestamp range"
        );
    }
    Ok(())
}
