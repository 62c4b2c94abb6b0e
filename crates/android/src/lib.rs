//! Android build descriptor tooling
//!
//! This crate reads an app module's `build.gradle.kts` into a
//! [`BuildDescriptor`] and checks it:
//! - Kotlin DSL parsing with line/column errors
//! - Resolution of `flutter.*` toolchain references
//! - SDK, JVM, identity, signing, dependency and plugin-order rules
//! - Canonical rendering and JSON/TOML export
//! - A release ledger enforcing increasing versionCodes

pub mod descriptor;
pub mod dsl;
pub mod gradle;
pub mod ledger;
pub mod plugins;
pub mod render;
pub mod resolve;
pub mod rules;

pub use descriptor::{BuildDescriptor, Setting};
pub use gradle::{load_descriptor, parse_descriptor, ParsedDescriptor};
pub use ledger::{ReleaseLedger, ReleaseRecord};
pub use resolve::Resolver;
pub use rules::{validate_descriptor, DescriptorValidator};
