use std::fs;
use std::path::PathBuf;

use crate::shared::error::EvalError;
use crate::shared::frame::ImageRecord;
use crate::source::domain::image_source::{parse_image_list, ImageSource, ImageStream};
use crate::source::infrastructure::image_decoder::decode_frame;

/// Reads images named in a local list file from a local directory.
///
/// The identifier of each image is its line in the list file.
pub struct LocalImageSource {
    list_path: PathBuf,
    image_dir: PathBuf,
    limit: Option<usize>,
}

impl LocalImageSource {
    pub fn new(list_path: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            list_path: list_path.into(),
            image_dir: image_dir.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn load(&self, id: &str) -> Result<ImageRecord, EvalError> {
        let path = self.image_dir.join(id);
        let bytes = fs::read(&path).map_err(|e| EvalError::Fetch {
            id: id.to_string(),
            source: Box::new(e),
        })?;
        let frame = decode_frame(&bytes).map_err(|source| EvalError::Decode {
            id: id.to_string(),
            source,
        })?;
        Ok(ImageRecord::new(id, frame))
    }
}

impl ImageSource for LocalImageSource {
    fn images(&mut self) -> Result<ImageStream<'_>, EvalError> {
        let text = fs::read_to_string(&self.list_path).map_err(|e| {
            EvalError::Listing(
                format!("cannot read {}: {e}", self.list_path.display()).into(),
            )
        })?;
        let ids = parse_image_list(&text, self.limit);
        log::info!("Local image list has {} images", ids.len());

        Ok(Box::new(ids.into_iter().map(move |id| self.load(&id))))
    }
}
