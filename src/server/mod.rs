//! Server module

pub mod config;
pub mod http;

pub use config::ServerConfig;
pub use http::start_http_server;
