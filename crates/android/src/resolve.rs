//! Resolution of toolchain references
//!
//! Values such as `flutter.compileSdkVersion` are supplied by the Flutter
//! Gradle plugin at build time. The [`Resolver`] layers three sources, later
//! ones winning: configured toolchain defaults, the project's
//! `local.properties`, then explicit overrides from `.buildspec.toml`.

use crate::descriptor::{BuildDescriptor, JavaVersion, Setting};
use buildspec_core::config::{Config, ToolchainConfig};
use buildspec_core::error::{Result, ResultExt};
use buildspec_core::validation::{ValidationError, ValidationResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A reference that could not be turned into a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no value for `{0}`")]
    Missing(String),

    #[error("`{reference}` resolves to `{value}`, which is not {expected}")]
    Invalid {
        reference: String,
        value: String,
        expected: &'static str,
    },
}

/// Values for toolchain references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolver {
    values: BTreeMap<String, String>,
}

impl Resolver {
    /// Empty resolver: every reference is unresolved
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults the Flutter Gradle plugin would supply
    pub fn from_toolchain(toolchain: &ToolchainConfig) -> Self {
        Self::new()
            .with_value("flutter.compileSdkVersion", toolchain.compile_sdk.to_string())
            .with_value("flutter.minSdkVersion", toolchain.min_sdk.to_string())
            .with_value("flutter.targetSdkVersion", toolchain.target_sdk.to_string())
            .with_value("flutter.ndkVersion", toolchain.ndk_version.clone())
            .with_value("flutter.versionCode", "1")
            .with_value("flutter.versionName", "1.0")
    }

    /// Resolver for a descriptor on disk
    ///
    /// `local.properties` is looked up in the android project root, the
    /// parent of the app module directory holding the descriptor.
    pub fn for_descriptor(config: &Config, descriptor: &Path) -> Result<Self> {
        let toolchain = &config.schema.toolchain;
        let resolver = Self::from_toolchain(toolchain);
        let resolver = match android_root(descriptor) {
            Some(root) => resolver.with_properties_file(&root.join(&toolchain.properties_file))?,
            None => resolver,
        };
        Ok(resolver.with_overrides(&toolchain.overrides))
    }

    /// Set a single value
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Layer explicit overrides on top
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, value) in overrides {
            self.values.insert(name.clone(), value.clone());
        }
        self
    }

    /// Layer a Java properties file on top; a missing file is not an error
    pub fn with_properties_file(mut self, path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "No properties file");
            return Ok(self);
        }
        let text = std::fs::read_to_string(path)
            .map_err(buildspec_core::Error::from)
            .context(format!("While reading {}", path.display()))?;
        let properties = parse_properties(&text);
        debug!(path = %path.display(), count = properties.len(), "Loaded properties");
        self.values.extend(properties);
        Ok(self)
    }

    /// Raw value for a reference name
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn int(&self, setting: &Setting<u32>) -> std::result::Result<u32, ResolveError> {
        match setting {
            Setting::Literal(v) => Ok(*v),
            Setting::Reference(name) => {
                let raw = self.require(name)?;
                raw.trim().parse().map_err(|_| ResolveError::Invalid {
                    reference: name.clone(),
                    value: raw.to_string(),
                    expected: "a non-negative integer",
                })
            }
        }
    }

    pub fn string(&self, setting: &Setting<String>) -> std::result::Result<String, ResolveError> {
        match setting {
            Setting::Literal(v) => Ok(v.clone()),
            Setting::Reference(name) => self.require(name).map(str::to_string),
        }
    }

    pub fn java(
        &self,
        setting: &Setting<JavaVersion>,
    ) -> std::result::Result<JavaVersion, ResolveError> {
        match setting {
            Setting::Literal(v) => Ok(*v),
            Setting::Reference(name) => {
                let raw = self.require(name)?;
                JavaVersion::parse(raw).ok_or_else(|| ResolveError::Invalid {
                    reference: name.clone(),
                    value: raw.to_string(),
                    expected: "a Java version",
                })
            }
        }
    }

    fn require(&self, name: &str) -> std::result::Result<&str, ResolveError> {
        self.lookup(name)
            .ok_or_else(|| ResolveError::Missing(name.to_string()))
    }
}

/// Descriptor values after reference resolution
///
/// A field is `None` when the descriptor omits it or its reference could
/// not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedValues {
    pub namespace: Option<String>,
    pub application_id: Option<String>,
    pub version_code: Option<u32>,
    pub version_name: Option<String>,
    pub compile_sdk: Option<u32>,
    pub min_sdk: Option<u32>,
    pub target_sdk: Option<u32>,
    pub ndk_version: Option<String>,
    pub source_compatibility: Option<JavaVersion>,
    pub target_compatibility: Option<JavaVersion>,
    pub jvm_target: Option<JavaVersion>,
}

impl Resolver {
    /// Resolve every setting of a descriptor
    ///
    /// Each failed reference becomes an `UNRESOLVED` error on its field.
    pub fn resolve_descriptor(&self, descriptor: &BuildDescriptor) -> (ResolvedValues, ValidationResult) {
        let mut findings = ValidationResult::new();
        let d = descriptor;

        let values = ResolvedValues {
            namespace: settle(&mut findings, "namespace", d.namespace.as_ref(), |s| self.string(s)),
            application_id: settle(&mut findings, "applicationId", d.identity.application_id.as_ref(), |s| {
                self.string(s)
            }),
            version_code: settle(&mut findings, "versionCode", d.identity.version_code.as_ref(), |s| {
                self.int(s)
            }),
            version_name: settle(&mut findings, "versionName", d.identity.version_name.as_ref(), |s| {
                self.string(s)
            }),
            compile_sdk: settle(&mut findings, "compileSdk", d.sdk.compile.as_ref(), |s| self.int(s)),
            min_sdk: settle(&mut findings, "minSdk", d.sdk.min.as_ref(), |s| self.int(s)),
            target_sdk: settle(&mut findings, "targetSdk", d.sdk.target.as_ref(), |s| self.int(s)),
            ndk_version: settle(&mut findings, "ndkVersion", d.ndk_version.as_ref(), |s| self.string(s)),
            source_compatibility: settle(
                &mut findings,
                "sourceCompatibility",
                d.compatibility.source.as_ref(),
                |s| self.java(s),
            ),
            target_compatibility: settle(
                &mut findings,
                "targetCompatibility",
                d.compatibility.target.as_ref(),
                |s| self.java(s),
            ),
            jvm_target: settle(&mut findings, "jvmTarget", d.compatibility.jvm_target.as_ref(), |s| {
                self.java(s)
            }),
        };

        (values, findings)
    }
}

fn settle<S, T>(
    findings: &mut ValidationResult,
    field: &str,
    setting: Option<&S>,
    resolve: impl FnOnce(&S) -> std::result::Result<T, ResolveError>,
) -> Option<T> {
    match resolve(setting?) {
        Ok(value) => Some(value),
        Err(err) => {
            let reference = match &err {
                ResolveError::Missing(name) => name.clone(),
                ResolveError::Invalid { reference, .. } => reference.clone(),
            };
            findings.add_error(
                ValidationError::new(field, "UNRESOLVED", err.to_string()).actual(reference),
            );
            None
        }
    }
}

/// `android/` for `android/app/build.gradle.kts`
fn android_root(descriptor: &Path) -> Option<PathBuf> {
    descriptor.parent()?.parent().map(Path::to_path_buf)
}

/// Parse Java `.properties` text
///
/// Supports `=`, `:` and whitespace separators, `#`/`!` comments, backslash
/// line continuations, and the standard escapes including `\uXXXX`.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut logical = String::new();

    for raw in text.lines() {
        let line = raw.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }
        logical.push_str(line);
        if let Some((key, value)) = split_entry(&logical) {
            properties.insert(key, value);
        }
        logical.clear();
    }
    if !logical.is_empty() {
        if let Some((key, value)) = split_entry(&logical) {
            properties.insert(key, value);
        }
    }
    properties
}

/// An odd number of trailing backslashes continues the line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end]);
    if key.is_empty() {
        return None;
    }
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    Some((key, unescape(rest)))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
