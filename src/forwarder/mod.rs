pub mod buffer;
pub mod cloudwatch;
pub mod decode;
pub mod runner;
pub mod s3;

pub use runner::{ForwardError, ForwardResponse, Forwarder};
