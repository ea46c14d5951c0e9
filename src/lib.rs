// src/lib.rs
pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod metrics;
pub mod render;
pub mod server;
pub mod status;
