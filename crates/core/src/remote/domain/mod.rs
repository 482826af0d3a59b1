pub mod function_invoker;
pub mod object_store;
pub mod remote_error;

pub use remote_error::RemoteError;
