//! CLI utilities for buildspec
//!
//! Provides shared CLI functionality:
//! - Status messages and finding reports
//! - Progress indicators

#![warn(missing_docs)]

pub mod output;
pub mod progress;
