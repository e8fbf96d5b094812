pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod errors;
pub mod grading;
pub mod models;
pub mod services;
pub mod stores;
