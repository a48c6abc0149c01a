//! zhuge-server library crate.
//!
//! Exposes the HTTP surface and its building blocks for the binary and for
//! integration testing.

pub mod cli;
pub mod config;
pub mod fallback;
pub mod knowledge;
pub mod llm;
pub mod server;
pub mod video;
