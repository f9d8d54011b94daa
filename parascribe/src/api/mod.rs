//! HTTP API: job submission, status polling, and health.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;
