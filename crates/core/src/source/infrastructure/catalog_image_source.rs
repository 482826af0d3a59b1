use crate::remote::domain::object_store::ObjectStore;
use crate::shared::error::EvalError;
use crate::source::domain::image_source::{parse_image_list, ImageSource, ImageStream};
use crate::source::infrastructure::object_image_stream::stream_objects;

/// Reads a newline-delimited object list from the store, then downloads
/// each listed image from `<bucket>/<image_prefix>/<id>`.
pub struct CatalogImageSource {
    store: Box<dyn ObjectStore>,
    bucket: String,
    list_key: String,
    image_prefix: String,
    limit: Option<usize>,
}

impl CatalogImageSource {
    pub fn new(
        store: Box<dyn ObjectStore>,
        bucket: impl Into<String>,
        list_key: impl Into<String>,
        image_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            list_key: list_key.into(),
            image_prefix: image_prefix.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

impl ImageSource for CatalogImageSource {
    fn images(&mut self) -> Result<ImageStream<'_>, EvalError> {
        let raw = self
            .store
            .get(&self.bucket, &self.list_key)
            .map_err(|e| EvalError::Listing(Box::new(e)))?;
        let text = String::from_utf8(raw).map_err(|e| EvalError::Listing(Box::new(e)))?;
        let ids = parse_image_list(&text, self.limit);
        log::info!(
            "got image list {}/{}, {} images",
            self.bucket,
            self.list_key,
            ids.len()
        );

        Ok(stream_objects(
            self.store.as_ref(),
            self.bucket.clone(),
            self.image_prefix.clone(),
            ids,
        ))
    }
}
