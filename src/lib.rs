pub mod config;
pub mod forwarder;
