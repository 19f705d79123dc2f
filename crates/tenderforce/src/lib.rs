pub mod config;
pub mod error;
pub mod obligations;
pub mod telemetry;
