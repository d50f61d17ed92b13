//! agrictl library - CLI for the AgriDetect knowledge service.

pub mod cli;
pub mod client;
pub mod commands;
pub mod output;
