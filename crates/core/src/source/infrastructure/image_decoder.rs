use crate::shared::frame::Frame;

/// Decodes an encoded image (JPEG, PNG, ...) into a BGR frame.
///
/// Orientation metadata is not applied: pixels come out in stored order.
/// Grayscale and alpha images are converted to three colour channels.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, image::ImageError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::from_rgb(rgb.into_raw(), width, height))
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let mut img = image::RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgb(rgb);
    }
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}
