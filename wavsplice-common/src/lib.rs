//! # wavsplice Common Library
//!
//! Shared code for the wavsplice crates:
//! - Error and Result types
//! - TOML configuration loading and resolution
//! - Fade curve definitions and calculations
//! - Seconds/frames conversion
//! - Human-readable clock formatting

pub mod config;
pub mod error;
pub mod fade_curves;
pub mod human_time;
pub mod timing;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
