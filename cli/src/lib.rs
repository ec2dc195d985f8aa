//! # dockergen
//!
//! Command-line client for the Harbor Dockerfile generator. It sends a
//! generation request to a running server and prints the returned
//! Dockerfile or writes it to a file.

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;

pub use client::ApiClient;
pub use error::{ClientError, Result};
