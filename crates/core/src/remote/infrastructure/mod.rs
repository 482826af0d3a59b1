pub mod aws_credentials;
pub mod fs_object_store;
pub mod http_function_invoker;
pub mod http_object_store;
mod http_response;
pub mod request_signer;
