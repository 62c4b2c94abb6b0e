//! Core utilities for buildspec descriptor tooling
//!
//! This crate provides shared functionality used by the descriptor crates and the CLI:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **File scanning**: Descriptor discovery with filtering
//! - **Configuration**: TOML-based configuration with defaults
//! - **Validation**: Findings with severity, field, and stable codes
//!
//! # Example
//!
//! ```rust,no_run
//! use buildspec_core::config::Config;
//! use buildspec_core::validation::Validator;
//!
//! let config = Config::load(None).expect("config");
//! let report = Validator::new()
//!     .required("namespace", "com.example.app")
//!     .validate();
//!
//! assert!(report.is_valid());
//! println!("ledger at {}", config.schema.general.ledger);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod file_scanner;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
