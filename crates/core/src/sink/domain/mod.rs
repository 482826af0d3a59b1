pub mod artifact;
pub mod result_sink;
