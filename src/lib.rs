pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod fetch_error;
pub mod fetcher;
pub mod scheduler;
pub mod seeing;
pub mod services;
