use std::time::Instant;

use crate::remote::domain::object_store::{join_key, ObjectStore};
use crate::shared::error::EvalError;
use crate::shared::frame::ImageRecord;
use crate::source::domain::image_source::ImageStream;
use crate::source::infrastructure::image_decoder::decode_frame;

/// Streams `<bucket>/<prefix>/<id>` for each id, downloading and decoding
/// one object per step.
pub(crate) fn stream_objects<'a>(
    store: &'a dyn ObjectStore,
    bucket: String,
    prefix: String,
    ids: Vec<String>,
) -> ImageStream<'a> {
    Box::new(
        ids.into_iter()
            .map(move |id| fetch_one(store, &bucket, &prefix, &id)),
    )
}

fn fetch_one(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    id: &str,
) -> Result<ImageRecord, EvalError> {
    let started = Instant::now();
    let bytes = store
        .get(bucket, &join_key(prefix, id))
        .map_err(|e| EvalError::Fetch {
            id: id.to_string(),
            source: Box::new(e),
        })?;
    log::debug!(
        "image {id} download time: {:.3}s",
        started.elapsed().as_secs_f64()
    );

    let frame = decode_frame(&bytes).map_err(|source| EvalError::Decode {
        id: id.to_string(),
        source,
    })?;
    Ok(ImageRecord::new(id, frame))
}
