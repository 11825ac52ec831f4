pub mod accounts;
pub mod board;
pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
