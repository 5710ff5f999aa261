//! GIF encoding and output.
//!
//! The container is built in memory and lands at its destination through a
//! temporary sibling file plus rename, so a failed run never leaves a
//! truncated GIF behind.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame as AnimationFrame};
use tracing::{debug, info};

use crate::frames::FrameSet;
use crate::ConvertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Infinite,
    Finite(u16),
}

impl LoopCount {
    /// `0` means loop forever, anything else is an exact repeat count.
    pub fn from_count(count: u16) -> Self {
        match count {
            0 => Self::Infinite,
            n => Self::Finite(n),
        }
    }

    pub fn count(self) -> u16 {
        match self {
            Self::Infinite => 0,
            Self::Finite(n) => n,
        }
    }

    fn repeat(self) -> Repeat {
        match self {
            Self::Infinite => Repeat::Infinite,
            Self::Finite(n) => Repeat::Finite(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOutput {
    pub path: PathBuf,
    pub frame_count: usize,
    /// Delay stored in the file, after rounding to whole centiseconds.
    pub frame_delay: Duration,
    pub loop_count: LoopCount,
}

const MAX_GIF_DELAY_CS: u128 = u16::MAX as u128;

/// Rounds `duration` to the 10 ms resolution GIF delays are stored in.
pub fn gif_delay(duration: Duration) -> Duration {
    let centis = (duration.as_micros() + 5_000) / 10_000;
    let centis = centis.min(MAX_GIF_DELAY_CS) as u64;
    Duration::from_millis(centis * 10)
}

pub fn write_gif(
    frames: FrameSet,
    output: &Path,
    frame_duration: Duration,
    loop_count: LoopCount,
) -> Result<GifOutput, ConvertError> {
    let frame_delay = gif_delay(frame_duration);
    let frame_count = frames.len();
    if frame_delay != frame_duration {
        debug!(
            requested_ms = frame_duration.as_secs_f64() * 1000.0,
            encoded_ms = frame_delay.as_millis() as u64,
            "rounded frame duration to GIF resolution"
        );
    }

    let bytes = encode(frames, output, frame_delay, loop_count)?;
    persist_atomically(output, &bytes)?;

    info!(
        path = %output.display(),
        frames = frame_count,
        delay_ms = frame_delay.as_millis() as u64,
        loops = loop_count.count(),
        "GIF written"
    );

    Ok(GifOutput {
        path: output.to_path_buf(),
        frame_count,
        frame_delay,
        loop_count,
    })
}

fn encode(
    frames: FrameSet,
    output: &Path,
    frame_delay: Duration,
    loop_count: LoopCount,
) -> Result<Vec<u8>, ConvertError> {
    let encode_err = |source: image::ImageError| ConvertError::Encode {
        path: output.to_path_buf(),
        source,
    };
    let delay_ms = u32::try_from(frame_delay.as_millis()).unwrap_or(u32::MAX);
    let delay = Delay::from_numer_denom_ms(delay_ms, 1);

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(loop_count.repeat()).map_err(encode_err)?;
        for frame in frames.into_frames() {
            encoder
                .encode_frame(AnimationFrame::from_parts(frame.image, 0, 0, delay))
                .map_err(encode_err)?;
        }
        // Dropping the encoder writes the GIF trailer.
    }
    Ok(bytes)
}

fn persist_atomically(output: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".gifmaker-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    let mut staged = builder
        .tempfile_in(parent)
        .map_err(|err| ConvertError::io("failed to stage GIF in", parent, err))?;
    let staged_path = staged.path().to_path_buf();
    staged
        .write_all(bytes)
        .map_err(|err| ConvertError::io("failed to write GIF", &staged_path, err))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|err| ConvertError::io("failed to flush GIF", &staged_path, err))?;
    staged
        .persist(output)
        .map_err(|err| ConvertError::io("failed to write GIF", output, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_round_to_centiseconds() {
        assert_eq!(gif_delay(Duration::from_millis(100)), Duration::from_millis(100));
        assert_eq!(gif_delay(Duration::from_millis(33)), Duration::from_millis(30));
        assert_eq!(gif_delay(Duration::from_millis(35)), Duration::from_millis(40));
        assert_eq!(
            gif_delay(Duration::from_secs_f64(0.09985)),
            Duration::from_millis(100)
        );
        assert_eq!(gif_delay(Duration::ZERO), Duration::ZERO);
        assert_eq!(
            gif_delay(Duration::from_secs(100_000)),
            Duration::from_millis(u64::from(u16::MAX) * 10)
        );
    }

    #[test]
    fn loop_count_zero_is_infinite() {
        assert_eq!(LoopCount::from_count(0), LoopCount::Infinite);
        assert_eq!(LoopCount::from_count(3), LoopCount::Finite(3));
        assert_eq!(LoopCount::Finite(3).count(), 3);
        assert_eq!(LoopCount::Infinite.count(), 0);
    }
}
