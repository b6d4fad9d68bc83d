pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod model;
pub mod repo;
pub mod service;
pub mod util;
