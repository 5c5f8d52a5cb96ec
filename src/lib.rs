pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod fal;
pub mod logging;
pub mod models;
pub mod routes;
pub mod wizard;

pub use app::build_app;
