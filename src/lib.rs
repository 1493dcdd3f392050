pub mod api;
pub mod config;
pub mod db;
pub mod model_client;
pub mod models;
pub mod scoring;
