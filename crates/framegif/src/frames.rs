//! Frame discovery and decoding.
//!
//! Playback order is the ascending byte-wise order of file names and nothing
//! else, so callers name frames with zero-padded counters or sortable
//! timestamps.
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::ConvertError;

pub const FRAME_EXTENSION: &str = ".png";

#[derive(Debug, Clone)]
pub struct Frame {
    pub path: PathBuf,
    pub image: RgbaImage,
}

impl Frame {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Decoded frames of one directory, in playback order. Never empty.
#[derive(Debug, Clone)]
pub struct FrameSet {
    source_dir: PathBuf,
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let dir = dir.as_ref();
        let paths = discover_frames(dir)?;
        let mut frames: Vec<Frame> = Vec::with_capacity(paths.len());

        for path in paths {
            let image = decode_png(&path)?;
            if let Some(first) = frames.first() {
                let expected = first.dimensions();
                let actual = image.dimensions();
                if actual != expected {
                    return Err(ConvertError::FrameSize {
                        path,
                        expected,
                        actual,
                    });
                }
            }
            debug!(path = %path.display(), "decoded frame");
            frames.push(Frame { path, image });
        }

        info!(dir = %dir.display(), frames = frames.len(), "PNG frames loaded");
        Ok(Self {
            source_dir: dir.to_path_buf(),
            frames,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frames
            .first()
            .map(Frame::dimensions)
            .unwrap_or_default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

/// Lists the `.png` files directly inside `dir`, sorted by file name.
///
/// Fails with `EmptyInput` when nothing matches, before any frame is opened.
pub fn discover_frames(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let entries = fs::read_dir(dir)
        .map_err(|err| ConvertError::io("failed to read frame directory", dir, err))?;

    let mut names: Vec<OsString> = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|err| ConvertError::io("failed to read frame directory", dir, err))?;
        let name = entry.file_name();
        if !name
            .as_encoded_bytes()
            .ends_with(FRAME_EXTENSION.as_bytes())
        {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            debug!(path = %path.display(), "skipping non-file entry with frame extension");
            continue;
        }
        names.push(name);
    }

    if names.is_empty() {
        return Err(ConvertError::EmptyInput(dir.to_path_buf()));
    }

    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

fn decode_png(path: &Path) -> Result<RgbaImage, ConvertError> {
    let file =
        File::open(path).map_err(|err| ConvertError::io("failed to open frame", path, err))?;
    let image = image::load(BufReader::new(file), ImageFormat::Png).map_err(|source| {
        ConvertError::Decode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(image.into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_frame(dir: &Path, name: &str, color: [u8; 4]) {
        RgbaImage::from_pixel(2, 2, Rgba(color))
            .save(dir.join(name))
            .expect("write png");
    }

    #[test]
    fn discovers_png_files_in_name_order() {
        let temp = tempfile::tempdir().unwrap();
        write_frame(temp.path(), "010.png", [0, 0, 255, 255]);
        write_frame(temp.path(), "002.png", [0, 255, 0, 255]);
        write_frame(temp.path(), "001.png", [255, 0, 0, 255]);
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        fs::write(temp.path().join("thumb.PNG"), "ignored").unwrap();
        fs::create_dir(temp.path().join("nested.png")).unwrap();

        let names: Vec<_> = discover_frames(temp.path())
            .unwrap()
            .into_iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["001.png", "002.png", "010.png"]);
    }

    #[test]
    fn empty_directory_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("readme.md"), "no frames").unwrap();

        let err = discover_frames(temp.path()).unwrap_err();
        assert!(matches!(err, ConvertError::EmptyInput(ref dir) if dir == temp.path()));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = discover_frames(&temp.path().join("absent")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn loads_frames_with_pixels_in_order() {
        let temp = tempfile::tempdir().unwrap();
        write_frame(temp.path(), "b.png", [0, 255, 0, 255]);
        write_frame(temp.path(), "a.png", [255, 0, 0, 255]);

        let set = FrameSet::load(temp.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.dimensions(), (2, 2));
        assert_eq!(set.frames()[0].image.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(set.frames()[1].image.get_pixel(1, 1), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn corrupt_frame_names_the_file() {
        let temp = tempfile::tempdir().unwrap();
        write_frame(temp.path(), "001.png", [255, 0, 0, 255]);
        fs::write(temp.path().join("002.png"), b"definitely not a png").unwrap();

        let err = FrameSet::load(temp.path()).unwrap_err();
        match err {
            ConvertError::Decode { path, .. } => {
                assert_eq!(path, temp.path().join("002.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        write_frame(temp.path(), "001.png", [255, 0, 0, 255]);
        RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]))
            .save(temp.path().join("002.png"))
            .unwrap();

        let err = FrameSet::load(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::FrameSize {
                expected: (2, 2),
                actual: (3, 2),
                ..
            }
        ));
    }
}
