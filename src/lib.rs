//! Lyrics keyword scan library - shared modules for all binaries.

pub mod aggregate;
pub mod error;
pub mod export;
pub mod fetch;
pub mod keywords;
pub mod models;
pub mod parse;
pub mod progress;
pub mod report;
pub mod safety;
pub mod scan;

pub use error::{Result, ScanError};
