pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod server;
pub mod shutdown;
pub mod storage;
pub mod telemetry;
