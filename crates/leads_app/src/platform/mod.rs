mod app;
mod config;
mod effects;
mod export;
mod logging;
mod ui;

pub use app::run_app;
