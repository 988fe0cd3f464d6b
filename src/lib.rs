pub mod clients;
pub mod config;
pub mod consumer;
pub mod error;
pub mod logging;
pub mod models;
pub mod utils;
