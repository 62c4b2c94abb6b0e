//! Descriptor validation rules
//!
//! [`DescriptorValidator`] resolves toolchain references, then checks SDK
//! ordering, JVM level agreement, identity, signing, dependency pins, plugin
//! order and, when a ledger is attached, versionCode monotonicity.

use crate::descriptor::{BuildDescriptor, DependencyVersion};
use crate::ledger::ReleaseLedger;
use crate::plugins::PluginRules;
use crate::resolve::{ResolvedValues, Resolver};
use buildspec_core::config::ConfigSchema;
use buildspec_core::error::Result;
use buildspec_core::validation::{ValidationError, ValidationResult, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

/// Reverse-domain identifier: two or more segments, each starting with a letter
static PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap()
});

const PACKAGE_RULE: &str = "reverse-domain name (e.g. com.company.app)";

/// The signing identity the Android Gradle plugin always provides
const IMPLICIT_SIGNING_CONFIG: &str = "debug";

/// Validates [`BuildDescriptor`]s against configured rules
pub struct DescriptorValidator<'a> {
    config: &'a ConfigSchema,
    resolver: &'a Resolver,
    plugins: PluginRules,
    ledger: Option<&'a ReleaseLedger>,
    descriptor_path: Option<&'a Path>,
}

impl<'a> DescriptorValidator<'a> {
    /// Fails when the configured plugin table is cyclic
    pub fn new(config: &'a ConfigSchema, resolver: &'a Resolver) -> Result<Self> {
        Ok(Self {
            config,
            resolver,
            plugins: PluginRules::from_config(&config.plugins)?,
            ledger: None,
            descriptor_path: None,
        })
    }

    /// Enforce versionCode monotonicity against a release ledger
    pub fn with_ledger(mut self, ledger: &'a ReleaseLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Resolve `sourceRoot` relative to the descriptor's directory
    pub fn with_descriptor_path(mut self, path: &'a Path) -> Self {
        self.descriptor_path = Some(path);
        self
    }

    pub fn validate(&self, descriptor: &BuildDescriptor) -> ValidationResult {
        let (values, mut result) = self.resolver.resolve_descriptor(descriptor);

        result.merge(self.required(descriptor, &values));
        result.merge(self.identity(&values));
        result.merge(self.sdk_order(&values));
        result.merge(compatibility(&values));
        result.merge(self.version_code(&values));
        result.merge(self.plugins.check(&descriptor.plugins));
        result.merge(self.signing(descriptor));
        result.merge(dependencies(descriptor));
        result.merge(self.source_root(descriptor));

        debug!(
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "Descriptor validated"
        );
        result
    }

    fn required(&self, d: &BuildDescriptor, values: &ResolvedValues) -> ValidationResult {
        let mut validator = Validator::new()
            .present("namespace", d.namespace.as_ref())
            .present("compileSdk", d.sdk.compile.as_ref())
            .present("applicationId", d.identity.application_id.as_ref());
        if let Some(namespace) = &values.namespace {
            validator = validator.required("namespace", namespace);
        }
        if let Some(application_id) = &values.application_id {
            validator = validator.required("applicationId", application_id);
        }
        validator.validate()
    }

    fn identity(&self, values: &ResolvedValues) -> ValidationResult {
        let namespace = values.namespace.as_deref().unwrap_or_default();
        let application_id = values.application_id.as_deref().unwrap_or_default();

        Validator::new()
            .matches("namespace", "NAMESPACE", namespace, &PACKAGE_NAME, PACKAGE_RULE)
            .matches(
                "applicationId",
                "APPLICATION_ID",
                application_id,
                &PACKAGE_NAME,
                PACKAGE_RULE,
            )
            .warn_if(
                "applicationId",
                "EXAMPLE_PACKAGE",
                self.config.rules.warn_example_package && is_example_package(application_id),
                "applicationId uses the com.example prefix, which the Play Store rejects",
            )
            .validate()
    }

    fn sdk_order(&self, values: &ResolvedValues) -> ValidationResult {
        let mut validator = Validator::new();
        if let (Some(min), Some(target)) = (values.min_sdk, values.target_sdk) {
            validator = validator.ordered("SDK_ORDER", ("minSdk", min), ("targetSdk", target));
        }
        if let (Some(target), Some(compile)) = (values.target_sdk, values.compile_sdk) {
            validator = validator.ordered("SDK_ORDER", ("targetSdk", target), ("compileSdk", compile));
        }
        // Without a targetSdk the minimum still has to fit the compile SDK
        if values.target_sdk.is_none() {
            if let (Some(min), Some(compile)) = (values.min_sdk, values.compile_sdk) {
                validator = validator.ordered("SDK_ORDER", ("minSdk", min), ("compileSdk", compile));
            }
        }
        validator.validate()
    }

    fn version_code(&self, values: &ResolvedValues) -> ValidationResult {
        let Some(code) = values.version_code else {
            return ValidationResult::new();
        };
        let mut result = Validator::new()
            .range("versionCode", "VERSION_CODE_RANGE", code, 1, self.config.rules.max_version_code)
            .validate();

        if let (Some(ledger), Some(application_id)) = (self.ledger, &values.application_id) {
            if let Some(last) = ledger.last_for(application_id) {
                if code <= last.version_code {
                    result.add_error(
                        ValidationError::new(
                            "versionCode",
                            "VERSION_CODE_REGRESSION",
                            format!(
                                "versionCode must exceed the last release of {} ({})",
                                application_id, last.version_code
                            ),
                        )
                        .expected(format!("> {}", last.version_code))
                        .actual(code.to_string()),
                    );
                }
            }
        }
        result
    }

    fn signing(&self, d: &BuildDescriptor) -> ValidationResult {
        let mut result = ValidationResult::new();
        let policy = &self.config.signing;

        for build_type in &d.build_types {
            let field = format!("buildTypes.{}.signingConfig", build_type.name);
            let is_release = policy.release_build_types.contains(&build_type.name);

            let Some(identity) = build_type.signing_config.as_deref() else {
                if is_release {
                    result.add_warning(ValidationError::new(
                        field,
                        "MISSING_RELEASE_SIGNING",
                        format!("Build type `{}` produces an unsigned package", build_type.name),
                    ));
                }
                continue;
            };

            if identity != IMPLICIT_SIGNING_CONFIG && !d.signing_configs.iter().any(|s| s == identity) {
                result.add_error(
                    ValidationError::new(
                        field.clone(),
                        "UNKNOWN_SIGNING_CONFIG",
                        format!("Signing config `{}` is not declared in signingConfigs", identity),
                    )
                    .actual(identity),
                );
            }

            if is_release && policy.non_production.iter().any(|s| s == identity) {
                result.add_warning(
                    ValidationError::new(
                        field,
                        "NON_PRODUCTION_SIGNING",
                        format!(
                            "Build type `{}` is signed with the non-production identity `{}`; replace it before distribution",
                            build_type.name, identity
                        ),
                    )
                    .expected("production signing identity")
                    .actual(identity),
                );
            }
        }
        result
    }

    fn source_root(&self, d: &BuildDescriptor) -> ValidationResult {
        let mut result = ValidationResult::new();
        let Some(root) = d.source_root.as_deref() else {
            return result;
        };
        if !self.config.rules.check_source_root {
            return result;
        }

        let path = Path::new(root);
        let relative = buildspec_core::validation::validate_relative_path("sourceRoot", "SOURCE_ROOT", path);
        if !relative.is_clean() {
            return relative;
        }

        if let Some(module_dir) = self.descriptor_path.and_then(Path::parent) {
            let resolved = module_dir.join(path);
            if !resolved.is_dir() {
                result.add_warning(
                    ValidationError::new(
                        "sourceRoot",
                        "SOURCE_ROOT",
                        format!("Source root {} does not exist", resolved.display()),
                    )
                    .actual(root),
                );
            }
        }
        result
    }
}

fn is_example_package(application_id: &str) -> bool {
    application_id == "com.example" || application_id.starts_with("com.example.")
}

fn compatibility(values: &ResolvedValues) -> ValidationResult {
    let levels: Vec<(&str, _)> = [
        ("sourceCompatibility", values.source_compatibility),
        ("targetCompatibility", values.target_compatibility),
        ("jvmTarget", values.jvm_target),
    ]
    .into_iter()
    .filter_map(|(name, level)| level.map(|l| (name, l)))
    .collect();

    let distinct: BTreeSet<_> = levels.iter().map(|(_, level)| *level).collect();
    let mut result = ValidationResult::new();
    if distinct.len() > 1 {
        let actual: Vec<String> = levels
            .iter()
            .map(|(name, level)| format!("{}={}", name, level))
            .collect();
        result.add_error(
            ValidationError::new(
                "compatibility",
                "COMPAT_MISMATCH",
                "sourceCompatibility, targetCompatibility and jvmTarget must name the same Java version",
            )
            .expected("one Java version")
            .actual(actual.join(", ")),
        );
    }
    result
}

fn dependencies(d: &BuildDescriptor) -> ValidationResult {
    let mut result = ValidationResult::new();

    // (name, platform) -> pinned versions in declaration order
    let mut pins: BTreeMap<(&str, bool), Vec<&str>> = BTreeMap::new();
    let mut seen = HashSet::new();
    let has_platform = d.has_platform();

    for dependency in &d.dependencies {
        if !seen.insert(dependency) {
            result.add_warning(
                ValidationError::new(
                    "dependencies",
                    "DEPENDENCY_DUPLICATE",
                    format!(
                        "`{}` is declared more than once in {}",
                        dependency.coordinate(),
                        dependency.configuration
                    ),
                )
                .actual(dependency.coordinate()),
            );
        }

        match &dependency.version {
            DependencyVersion::Pinned(version) => {
                let versions = pins.entry((dependency.name.as_str(), dependency.platform)).or_default();
                if !versions.contains(&version.as_str()) {
                    versions.push(version);
                }
            }
            DependencyVersion::Managed if !has_platform && !dependency.platform => {
                result.add_warning(
                    ValidationError::new(
                        "dependencies",
                        "UNMANAGED_DEPENDENCY",
                        format!(
                            "`{}` has no version and no platform(...) BoM is declared",
                            dependency.name
                        ),
                    )
                    .expected("a pinned version or a platform(...) entry"),
                );
            }
            DependencyVersion::Managed => {}
        }
    }

    for ((name, _), versions) in pins {
        if versions.len() > 1 {
            result.add_error(
                ValidationError::new(
                    "dependencies",
                    "DEPENDENCY_CONFLICT",
                    format!("`{}` is pinned to different versions", name),
                )
                .expected("a single version")
                .actual(versions.join(", ")),
            );
        }
    }
    result
}

/// Validate with the given configuration and resolver
pub fn validate_descriptor(
    descriptor: &BuildDescriptor,
    config: &ConfigSchema,
    resolver: &Resolver,
) -> Result<ValidationResult> {
    Ok(DescriptorValidator::new(config, resolver)?.validate(descriptor))
}
