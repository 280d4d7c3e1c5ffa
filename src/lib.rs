pub mod anilist;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod roster;
pub mod snapshot;
