use std::path::{Path, PathBuf};

use tracing::debug;

use crate::encode::{write_gif, GifOutput, LoopCount};
use crate::frames::FrameSet;
use crate::pacing::{DurationPolicy, FramePacing};
use crate::ConvertError;

pub const GIF_SUFFIX: &str = ".gif";

/// Converts frame directories into animated GIFs.
///
/// One converter can be reused across directories; it holds no per-run state.
#[derive(Debug, Clone, Default)]
pub struct Converter<P = DurationPolicy> {
    pacing: P,
    loop_count: LoopCount,
}

impl<P: FramePacing> Converter<P> {
    pub fn new(pacing: P) -> Self {
        Self {
            pacing,
            loop_count: LoopCount::Infinite,
        }
    }

    pub fn with_loop_count(mut self, loop_count: LoopCount) -> Self {
        self.loop_count = loop_count;
        self
    }

    pub fn pacing(&self) -> &P {
        &self.pacing
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    /// Writes `input_dir`'s frames to `output`, or to `<input_dir>.gif` when
    /// no output path is given.
    pub fn convert(
        &self,
        input_dir: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> Result<GifOutput, ConvertError> {
        let input_dir = input_dir.as_ref();
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(input_dir)?,
        };
        debug!(
            input = %input_dir.display(),
            output = %output.display(),
            "converting frame directory"
        );

        let frames = FrameSet::load(input_dir)?;
        let duration = self.pacing.frame_duration(frames.len());
        write_gif(frames, &output, duration, self.loop_count)
    }
}

/// `frames/` becomes `frames.gif`.
pub fn default_output_path(input_dir: &Path) -> Result<PathBuf, ConvertError> {
    let trimmed = input_dir.components().as_path();
    let base = if trimmed.file_name().is_some() {
        trimmed.to_path_buf()
    } else {
        input_dir
            .canonicalize()
            .map_err(|err| {
                ConvertError::io("failed to resolve frame directory", input_dir, err)
            })?
    };
    let mut name = base.into_os_string();
    name.push(GIF_SUFFIX);
    Ok(PathBuf::from(name))
}
