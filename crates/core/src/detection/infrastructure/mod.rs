pub mod execution_provider;
pub mod onnx_sample_detector;
