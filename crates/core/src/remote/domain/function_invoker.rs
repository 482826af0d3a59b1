use crate::remote::domain::RemoteError;

/// Request-response invocation of a named remote function.
///
/// The call blocks until the function answers; the returned bytes are the
/// function's raw response payload.
pub trait FunctionInvoker: Send {
    fn invoke(&self, function: &str, payload: &serde_json::Value) -> Result<Vec<u8>, RemoteError>;
}
