pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod probes;
pub mod routes;
