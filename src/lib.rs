pub mod config;
pub mod error;
pub mod geolocation;
pub mod handoff;
pub mod map;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;
