use ort::execution_providers::ExecutionProviderDispatch;

/// Hardware accelerators to register on a detector session, best first.
///
/// ONNX Runtime silently falls back to CPU when a listed provider cannot
/// be loaded, so an empty list and a failed accelerator behave the same.
pub fn platform_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    let providers = vec![ort::execution_providers::CoreMLExecutionProvider::default().build()];
    #[cfg(target_os = "windows")]
    let providers = vec![ort::execution_providers::DirectMLExecutionProvider::default().build()];
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let providers = Vec::new();

    log::debug!("Registering {} execution provider(s)", providers.len());
    providers
}
