use ort::execution_providers::ExecutionProviderDispatch;

/// ONNX execution providers to try, in order, for the current platform.
///
/// ONNX Runtime falls back to its CPU provider when none of these register,
/// so an empty list simply means CPU.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
