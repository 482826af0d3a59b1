use ndarray::Array2;
use thiserror::Error;

/// Columns in one detector output row: left, top, width, height, confidence.
pub const BOX_COLUMNS: usize = 5;

/// A single face box in pixel space.
///
/// `left`/`top` are measured from the image's top-left corner; `width` and
/// `height` extend right and down from there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl Detection {
    pub fn to_row(&self) -> [f32; BOX_COLUMNS] {
        [self.left, self.top, self.width, self.height, self.confidence]
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum MalformedOutput {
    #[error("expected 5 columns per box, got {0}")]
    ColumnCount(usize),
    #[error("non-finite value {value} at row {row}, column {column}")]
    NonFinite { row: usize, column: usize, value: f32 },
}

/// Checks a raw detector result and converts it into typed boxes.
///
/// A result with zero rows is a valid "no faces" answer whatever its column
/// count; otherwise every row must hold exactly five finite numbers.
pub fn detections_from_array(boxes: &Array2<f32>) -> Result<Vec<Detection>, MalformedOutput> {
    if boxes.nrows() == 0 {
        return Ok(Vec::new());
    }
    if boxes.ncols() != BOX_COLUMNS {
        return Err(MalformedOutput::ColumnCount(boxes.ncols()));
    }

    let mut detections = Vec::with_capacity(boxes.nrows());
    for (row, values) in boxes.rows().into_iter().enumerate() {
        if let Some((column, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(MalformedOutput::NonFinite { row, column, value });
        }
        detections.push(Detection {
            left: values[0],
            top: values[1],
            width: values[2],
            height: values[3],
            confidence: values[4],
        });
    }
    Ok(detections)
}
