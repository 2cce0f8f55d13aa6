#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod logging;
pub mod query;
pub mod render;
pub mod search;
pub mod source;
