use crate::SourceError;
use image::DynamicImage;
use std::{
    collections::VecDeque,
    io::ErrorKind,
    path::PathBuf,
};

/// Yields raster frames on demand.
///
/// `Ok(None)` signals a clean end of stream. An error means the source
/// failed mid-stream and will produce no further frames. The underlying
/// resource is released on drop.
pub trait FrameSource {
    fn read_next(&mut self) -> Result<Option<DynamicImage>, SourceError>;
}

/// Plays a fixed list of image files as a frame stream.
///
/// Every path is checked up front so a bad list fails at open time rather
/// than partway through a stream.
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Result<Self, SourceError> {
        let paths: VecDeque<PathBuf> = paths.into_iter().map(Into::into).collect();
        for path in &paths {
            match std::fs::metadata(path) {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => return Err(SourceError::MissingPath(path.clone())),
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    return Err(SourceError::MissingPath(path.clone()))
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(Self { paths })
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_next(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        match self.paths.pop_front() {
            Some(path) => Ok(Some(image::open(path)?)),
            None => Ok(None),
        }
    }
}

/// Serves frames already decoded in memory. Mostly useful in tests.
pub struct MemorySource {
    frames: VecDeque<DynamicImage>,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for MemorySource {
    fn read_next(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::GenericImageView;
    use std::io::Write;

    #[test]
    fn missing_path_fails_at_open() {
        let missing = std::env::temp_dir().join("definitely-not-a-real-frame.png");
        match ImageSequenceSource::open([missing.clone()]) {
            Err(SourceError::MissingPath(path)) => assert_eq!(path, missing),
            Err(other) => panic!("wrong failure: {}", other),
            Ok(_) => panic!("open accepted a missing path"),
        }
    }

    #[test]
    fn garbage_file_fails_at_read() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .unwrap();
        file.write_all(b"this is not an image").unwrap();

        let mut source = ImageSequenceSource::open([file.path().to_path_buf()]).unwrap();
        assert!(source.read_next().is_err());
    }

    #[test]
    fn sequence_reads_saved_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        DynamicImage::new_rgba8(4, 3).save(&first).unwrap();
        DynamicImage::new_rgba8(6, 5).save(&second).unwrap();

        let mut source = ImageSequenceSource::open([first, second]).unwrap();
        assert_eq!(source.read_next().unwrap().unwrap().dimensions(), (4, 3));
        assert_eq!(source.read_next().unwrap().unwrap().dimensions(), (6, 5));
        assert!(source.read_next().unwrap().is_none());
    }

    #[test]
    fn memory_source_yields_in_order_then_ends() {
        let mut source = MemorySource::new(vec![
            DynamicImage::new_luma8(3, 2),
            DynamicImage::new_luma8(5, 4),
        ]);

        assert_eq!(source.read_next().unwrap().unwrap().dimensions(), (3, 2));
        assert_eq!(source.read_next().unwrap().unwrap().dimensions(), (5, 4));
        assert!(source.read_next().unwrap().is_none());
        assert!(source.read_next().unwrap().is_none());
    }
}
