pub mod browser;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod gate;
pub mod oracle;
pub mod pacing;
pub mod profile;
pub mod workflow;
