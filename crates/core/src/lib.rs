pub mod detection;
pub mod evaluation;
pub mod remote;
pub mod shared;
pub mod sink;
pub mod source;
