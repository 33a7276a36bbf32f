//! Data models for fxr.

pub mod config;
pub mod rates;

pub use config::*;
pub use rates::*;
