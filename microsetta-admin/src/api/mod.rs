//! HTTP API handlers for microsetta-admin

pub mod health;
pub mod pulldown;

pub use health::health_routes;
pub use pulldown::pulldown_routes;
