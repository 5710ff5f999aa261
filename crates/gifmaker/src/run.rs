use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use framegif::{Converter, DurationPolicy, GifOutput, LoopCount};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[derive(Debug, Serialize)]
struct ConversionReport<'a> {
    input: &'a Path,
    output: &'a Path,
    frames: usize,
    frame_delay_ms: u64,
    loop_count: u16,
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    if cli.output.is_some() && cli.inputs.len() != 1 {
        bail!(
            "--output needs exactly one input directory (got {})",
            cli.inputs.len()
        );
    }

    let converter =
        Converter::new(cli.duration).with_loop_count(LoopCount::from_count(cli.loop_count));
    log_policy(&cli.duration);

    let mut failed: Vec<&PathBuf> = Vec::new();
    for input in &cli.inputs {
        match converter.convert(input, cli.output.as_deref()) {
            Ok(output) => print_report(input, &output, cli.json)?,
            Err(err) => {
                // ConvertError messages already carry their cause.
                eprintln!("error: failed to convert {}: {err}", input.display());
                failed.push(input);
                if cli.fail_fast {
                    break;
                }
            }
        }
    }

    if failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(
            failed = failed.len(),
            total = cli.inputs.len(),
            "some directories could not be converted"
        );
        Ok(ExitCode::FAILURE)
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_policy(policy: &DurationPolicy) {
    match policy {
        DurationPolicy::Fixed(duration) => {
            tracing::debug!(ms = duration.as_millis() as u64, "fixed frame duration");
        }
        DurationPolicy::Adaptive(curve) => {
            tracing::debug!(
                ceiling_ms = curve.ceiling_ms,
                floor_ms = curve.floor_ms,
                rate = curve.rate,
                "adaptive frame duration"
            );
        }
    }
}

fn print_report(input: &Path, output: &GifOutput, json: bool) -> Result<()> {
    if json {
        let report = ConversionReport {
            input,
            output: &output.path,
            frames: output.frame_count,
            frame_delay_ms: output.frame_delay.as_millis() as u64,
            loop_count: output.loop_count.count(),
        };
        let line = serde_json::to_string(&report).context("failed to serialize report")?;
        println!("{line}");
    } else {
        println!("{}", output.path.display());
    }
    Ok(())
}
