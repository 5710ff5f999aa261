//! Turns a directory of lexicographically ordered PNG frames into a single
//! animated GIF.
//!
//! - `frames` discovers and decodes the `FrameSet`.
//! - `pacing` decides how long each frame is shown (`DurationPolicy`, or any
//!   `FramePacing` implementation).
//! - `encode` writes the GIF container atomically.
//! - `convert` ties the pipeline together behind `Converter`.
mod convert;
mod encode;
mod frames;
mod pacing;

pub use convert::{default_output_path, Converter, GIF_SUFFIX};
pub use encode::{gif_delay, write_gif, GifOutput, LoopCount};
pub use frames::{discover_frames, Frame, FrameSet, FRAME_EXTENSION};
pub use pacing::{AdaptiveCurve, DurationPolicy, FramePacing};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no {} frames found in {}", FRAME_EXTENSION, .0.display())]
    EmptyInput(PathBuf),

    #[error("failed to decode frame {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "frame {} is {}x{} but the first frame is {}x{}",
        path.display(),
        actual.0,
        actual.1,
        expected.0,
        expected.1
    )]
    FrameSize {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("failed to encode GIF for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
