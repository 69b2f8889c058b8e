//! CLI command handlers

pub mod commands;

pub use commands::{convert_options, decode, encode, inspect, serve};
