// Library exports so integration tests can assemble the app.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod limiter;
pub mod routes;
pub mod settings;
pub mod state;
