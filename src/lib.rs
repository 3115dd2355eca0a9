pub mod api;
pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod legs;
pub mod odds;
pub mod pages;
pub mod sanitize;
pub mod scenario;
pub mod selection;

pub use app::App;
pub use error::ApiError;
