use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use framegif::{AdaptiveCurve, DurationPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "gifmaker",
    author,
    version,
    about = "Assemble directories of PNG frames into animated GIFs"
)]
pub struct Cli {
    /// Frame directories; each one becomes `<DIR>.gif` next to it.
    #[arg(value_name = "DIR", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write the GIF here instead (only with a single DIR).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Per-frame duration: milliseconds (`100`), a duration (`80ms`), or
    /// `adaptive[:RATE]` to shorten frames as the frame count grows.
    #[arg(
        short,
        long,
        value_name = "MS|DURATION|adaptive",
        value_parser = parse_duration_policy,
        default_value = "100"
    )]
    pub duration: DurationPolicy,

    /// Number of times the animation plays; 0 loops forever.
    #[arg(long = "loop", value_name = "COUNT", default_value_t = 0)]
    pub loop_count: u16,

    /// Stop at the first directory that fails instead of continuing.
    #[arg(long)]
    pub fail_fast: bool,

    /// Print one JSON object per converted directory instead of the bare path.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_duration_policy(value: &str) -> Result<DurationPolicy, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    let (mode, rest) = match normalized.split_once(':') {
        Some((mode, rest)) => (mode.trim(), Some(rest.trim())),
        None => (normalized.as_str(), None),
    };

    if matches!(mode, "adaptive" | "auto") {
        let Some(rest) = rest else {
            return Ok(DurationPolicy::adaptive());
        };
        let rate: f64 = rest
            .parse()
            .map_err(|_| format!("invalid adaptive rate '{rest}'"))?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err("adaptive rate must be a positive number".into());
        }
        return Ok(DurationPolicy::Adaptive(AdaptiveCurve::with_rate(rate)));
    }

    if let Ok(millis) = normalized.parse::<u64>() {
        return Ok(DurationPolicy::Fixed(Duration::from_millis(millis)));
    }

    humantime::parse_duration(trimmed)
        .map(DurationPolicy::Fixed)
        .map_err(|err| {
            format!("invalid duration '{trimmed}': {err}; use milliseconds, e.g. 100, or adaptive")
        })
}
