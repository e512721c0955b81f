pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod models;
pub mod notifications;
pub mod panel;
pub mod shell;
pub mod surface;
pub mod traits;
pub mod utils;

pub use client::HttpBackend;
pub use config::Config;
pub use controller::{ViewerController, ViewerEvent};
pub use error::ViewerError;
pub use surface::HeadlessMap;
