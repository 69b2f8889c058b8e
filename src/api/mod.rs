//! Sheetbridge API Server module
//!
//! HTTP endpoints for the web UI: workbook upload → JSON, JSON → workbook.
//! Run with `sheetbridge serve` or `sheetbridge-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
