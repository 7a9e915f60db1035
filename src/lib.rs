pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod forms;
pub mod models;
pub mod views;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
}
