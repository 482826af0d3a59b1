pub mod local_verifier;
pub mod remote_uploader;
