pub mod catalog_image_source;
pub mod image_decoder;
pub mod local_image_source;
mod object_image_stream;
pub mod service_image_source;
