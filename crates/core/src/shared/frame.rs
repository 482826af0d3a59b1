use ndarray::ArrayView3;

/// Number of colour channels in every evaluation frame.
pub const CHANNELS: usize = 3;

/// A decoded evaluation image: contiguous 8-bit BGR bytes in row-major
/// order, shaped `(height, width, 3)`.
///
/// Decoding happens at the image-source boundary only; detectors receive
/// a frame that is already in the fixed channel order.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Builds a BGR frame from RGB-ordered bytes by swapping the outer
    /// channels of every pixel.
    pub fn from_rgb(mut data: Vec<u8>, width: u32, height: u32) -> Self {
        for pixel in data.chunks_exact_mut(CHANNELS) {
            pixel.swap(0, 2);
        }
        Self::new(data, width, height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// `(height, width, channel)` view; channel 0 is blue.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

/// One item produced by an image source.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    pub id: String,
    pub frame: Frame,
}

impl ImageRecord {
    pub fn new(id: impl Into<String>, frame: Frame) -> Self {
        Self {
            id: id.into(),
            frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2);
    }

    #[test]
    fn test_from_rgb_swaps_to_bgr() {
        // 2x1: pure red then pure blue
        let frame = Frame::from_rgb(vec![255, 0, 0, 0, 0, 255], 2, 1);
        assert_eq!(frame.data(), &[0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_as_ndarray_shape_is_height_width_channel() {
        let frame = Frame::new(vec![0u8; 24], 4, 2);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_as_ndarray_channel_zero_is_blue() {
        let frame = Frame::from_rgb(vec![10, 20, 30], 1, 1);
        let arr = frame.as_ndarray();
        assert_eq!(arr[[0, 0, 0]], 30);
        assert_eq!(arr[[0, 0, 1]], 20);
        assert_eq!(arr[[0, 0, 2]], 10);
    }

    #[test]
    fn test_image_record_keeps_id() {
        let record = ImageRecord::new("0_Parade_1.jpg", Frame::new(vec![0; 3], 1, 1));
        assert_eq!(record.id, "0_Parade_1.jpg");
    }
}
