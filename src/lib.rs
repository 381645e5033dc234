pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod knowledge;
pub mod logging;
pub mod pattern;
pub mod scheduler;
pub mod search;
pub mod settings;
