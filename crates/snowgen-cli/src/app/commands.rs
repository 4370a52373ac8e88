use std::io::Write;

use core::time::Duration;
use snowgen::{SnowflakeId, SnowflakeWorker};

use crate::app::config::{DecodeArgs, GenerateConfig, OutputFormat};

/// Builds one worker from `config` and writes `config.count` IDs to `out`,
/// returning the last one.
///
/// Stops at the first error; IDs already written stay valid.
pub fn run_generate(
    config: &GenerateConfig,
    out: &mut impl Write,
) -> anyhow::Result<Option<SnowflakeId>> {
    let worker = SnowflakeWorker::builder(config.worker_id)
        .clock(config.clock)
        .clock_policy(config.clock_policy)
        .build()?;

    tracing::info!(
        worker_id = worker.worker_id(),
        count = config.count,
        policy = ?worker.clock_policy(),
        "generating ids"
    );

    let mut last = None;
    for _ in 0..config.count {
        let id = worker.next_id().inspect_err(|e| {
            tracing::error!(error = %e, "id generation failed");
        })?;
        write_id(out, id, config.format)?;
        last = Some(id);
    }
    out.flush()?;

    tracing::debug!(
        last_timestamp = last.map(|id| id.timestamp()),
        "generation finished"
    );
    Ok(last)
}

fn write_id(out: &mut impl Write, id: SnowflakeId, format: OutputFormat) -> std::io::Result<()> {
    match format {
        OutputFormat::Decimal => writeln!(out, "{id}"),
        OutputFormat::Padded => writeln!(out, "{}", id.to_padded_string()),
        OutputFormat::Debug => writeln!(out, "{id:?}"),
    }
}

/// Writes one line per ID with its decoded fields.
pub fn run_decode(args: &DecodeArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let epoch = Duration::from_millis(args.epoch_ms);
    for id in &args.ids {
        writeln!(
            out,
            "id={id} timestamp={} unix_ms={} worker_id={} sequence={}",
            id.timestamp(),
            id.to_unix_millis(epoch),
            id.worker_id(),
            id.sequence(),
        )?;
    }
    out.flush()?;
    Ok(())
}
