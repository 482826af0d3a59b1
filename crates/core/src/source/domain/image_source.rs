use crate::shared::error::EvalError;
use crate::shared::frame::ImageRecord;

/// Lazily fetched images, one at a time, in list order.
pub type ImageStream<'a> = Box<dyn Iterator<Item = Result<ImageRecord, EvalError>> + 'a>;

/// Produces the images of one evaluation run.
///
/// Implementations resolve the image list up front, so listing failures
/// surface from [`ImageSource::images`] itself; fetch and decode failures
/// for individual images surface from the stream, after the failing
/// identifier has been logged.
pub trait ImageSource: Send {
    fn images(&mut self) -> Result<ImageStream<'_>, EvalError>;
}

/// Parses a newline-delimited image list, dropping blank lines and
/// surrounding whitespace, and keeps at most `limit` entries.
pub fn parse_image_list(text: &str, limit: Option<usize>) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Keeps at most `limit` identifiers, preserving order.
pub fn apply_limit(mut ids: Vec<String>, limit: Option<usize>) -> Vec<String> {
    if let Some(max) = limit {
        ids.truncate(max);
    }
    ids
}
