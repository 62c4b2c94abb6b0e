//! Configuration schema definitions
//!
//! Every section carries `#[serde(default)]` so a partial `.buildspec.toml`
//! only overrides what it names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Descriptor validated when no path is given on the command line
    #[serde(default = "default_descriptor")]
    pub descriptor: String,

    /// Release ledger location
    #[serde(default = "default_ledger")]
    pub ledger: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            descriptor: default_descriptor(),
            ledger: default_ledger(),
        }
    }
}

fn default_descriptor() -> String {
    "android/app/build.gradle.kts".to_string()
}

fn default_ledger() -> String {
    ".buildspec/releases.json".to_string()
}

/// Values the Flutter Gradle plugin supplies for `flutter.*` references
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolchainConfig {
    #[serde(default = "default_compile_sdk")]
    pub compile_sdk: u32,

    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,

    #[serde(default = "default_target_sdk")]
    pub target_sdk: u32,

    #[serde(default = "default_ndk_version")]
    pub ndk_version: String,

    /// Properties file, relative to the android project root
    #[serde(default = "default_properties_file")]
    pub properties_file: String,

    /// Extra reference values, e.g. `"flutter.versionCode" = "12"`
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compile_sdk: default_compile_sdk(),
            min_sdk: default_min_sdk(),
            target_sdk: default_target_sdk(),
            ndk_version: default_ndk_version(),
            properties_file: default_properties_file(),
            overrides: BTreeMap::new(),
        }
    }
}

fn default_compile_sdk() -> u32 {
    35
}

fn default_min_sdk() -> u32 {
    21
}

fn default_target_sdk() -> u32 {
    35
}

fn default_ndk_version() -> String {
    "26.3.11579264".to_string()
}

fn default_properties_file() -> String {
    "local.properties".to_string()
}

/// Signing identity policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SigningConfig {
    /// Identities that must not sign a release build
    #[serde(default = "default_non_production")]
    pub non_production: Vec<String>,

    /// Build types treated as distributable
    #[serde(default = "default_release_types")]
    pub release_build_types: Vec<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            non_production: default_non_production(),
            release_build_types: default_release_types(),
        }
    }
}

fn default_non_production() -> Vec<String> {
    vec!["debug".to_string()]
}

fn default_release_types() -> Vec<String> {
    vec!["release".to_string()]
}

/// Plugin ordering rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginsConfig {
    /// plugin id -> plugins that must be applied before it
    #[serde(default = "default_prerequisites")]
    pub prerequisites: BTreeMap<String, Vec<String>>,

    /// Ids that name the same plugin (`kotlin-android` and the qualified id)
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            prerequisites: default_prerequisites(),
            aliases: default_aliases(),
        }
    }
}

fn default_prerequisites() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        "dev.flutter.flutter-gradle-plugin".to_string(),
        vec![
            "com.android.application".to_string(),
            "org.jetbrains.kotlin.android".to_string(),
        ],
    );
    map.insert(
        "com.google.gms.google-services".to_string(),
        vec!["com.android.application".to_string()],
    );
    map.insert(
        "com.google.firebase.crashlytics".to_string(),
        vec!["com.google.gms.google-services".to_string()],
    );
    map.insert(
        "org.jetbrains.kotlin.android".to_string(),
        vec!["com.android.application".to_string()],
    );
    map
}

fn default_aliases() -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(
        "kotlin-android".to_string(),
        "org.jetbrains.kotlin.android".to_string(),
    );
    map
}

/// Toggles and limits for individual rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulesConfig {
    /// Warn when applicationId starts with `com.example`
    #[serde(default = "default_true")]
    pub warn_example_package: bool,

    /// Largest versionCode the store accepts
    #[serde(default = "default_max_version_code")]
    pub max_version_code: u32,

    /// Check that sourceRoot exists relative to the descriptor
    #[serde(default = "default_true")]
    pub check_source_root: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            warn_example_package: true,
            max_version_code: default_max_version_code(),
            check_source_root: true,
        }
    }
}

fn default_max_version_code() -> u32 {
    2_100_000_000
}

fn default_true() -> bool {
    true
}
