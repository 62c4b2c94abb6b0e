//! Build descriptor model
//!
//! A [`BuildDescriptor`] is the immutable, parsed form of an Android app
//! module's `build.gradle.kts`. It is produced once by
//! [`crate::gradle::parse_descriptor`] and then only read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value written literally or supplied by the toolchain
///
/// `compileSdk = 34` is a literal, `compileSdk = flutter.compileSdkVersion`
/// is a reference resolved by [`crate::resolve::Resolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting<T> {
    Literal(T),
    Reference(String),
}

impl<T> Setting<T> {
    /// The literal value, if any
    pub fn literal(&self) -> Option<&T> {
        match self {
            Setting::Literal(v) => Some(v),
            Setting::Reference(_) => None,
        }
    }

    /// The reference name, if any
    pub fn reference(&self) -> Option<&str> {
        match self {
            Setting::Literal(_) => None,
            Setting::Reference(name) => Some(name),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Literal(v) => write!(f, "{}", v),
            Setting::Reference(name) => write!(f, "{}", name),
        }
    }
}

/// JVM language level, normalized so `1.8` and `8` compare equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JavaVersion(pub u16);

impl JavaVersion {
    /// Parse `17`, `"1.8"`, `VERSION_17`, `VERSION_1_8`, or `JVM_17`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix("VERSION_")
            .or_else(|| text.strip_prefix("JVM_"))
            .unwrap_or(text);
        let digits = digits.replace('_', ".");
        let level = match digits.strip_prefix("1.") {
            Some(rest) if !rest.is_empty() => rest,
            _ => digits.as_str(),
        };
        level.parse::<u16>().ok().filter(|v| *v > 0).map(JavaVersion)
    }

    /// Name of the `JavaVersion` enum constant for this level
    pub fn constant_name(&self) -> String {
        if self.0 <= 10 {
            format!("VERSION_1_{}", self.0)
        } else {
            format!("VERSION_{}", self.0)
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 8 {
            write!(f, "1.{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// `compileSdk`, `minSdk`, and `targetSdk`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile: Option<Setting<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Setting<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Setting<u32>>,
}

/// Java and Kotlin compilation levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Setting<JavaVersion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Setting<JavaVersion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jvm_target: Option<Setting<JavaVersion>>,
}

/// `applicationId`, `versionCode`, and `versionName`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Setting<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_code: Option<Setting<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_name: Option<Setting<String>>,
}

/// A `buildTypes` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildType {
    pub name: String,
    /// Name of the signing identity this build type uses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrink_resources: Option<bool>,
}

impl BuildType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signing_config: None,
            minify_enabled: None,
            shrink_resources: None,
        }
    }
}

/// Version of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyVersion {
    Pinned(String),
    /// Left to a platform (BoM) to decide
    Managed,
}

impl fmt::Display for DependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyVersion::Pinned(v) => write!(f, "{}", v),
            DependencyVersion::Managed => write!(f, "managed"),
        }
    }
}

/// One entry in the `dependencies` block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Gradle configuration, e.g. `implementation`
    pub configuration: String,
    /// `group:artifact`
    pub name: String,
    pub version: DependencyVersion,
    /// `natives-linux` in `org.lwjgl:lwjgl:3.3.1:natives-linux`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// `aar` in `group:artifact:1.0@aar`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Declared through `platform(...)` or `enforcedPlatform(...)`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub platform: bool,
    /// Declared through `enforcedPlatform(...)`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enforced: bool,
}

impl Dependency {
    /// Build from a `group:artifact[:version[:classifier]][@extension]`
    /// coordinate
    pub fn from_coordinate(configuration: &str, coordinate: &str, platform: bool) -> Option<Self> {
        let (coordinate, extension) = match coordinate.split_once('@') {
            Some((rest, ext)) if !ext.is_empty() && !ext.contains(':') => {
                (rest, Some(ext.to_string()))
            }
            Some(_) => return None,
            None => (coordinate, None),
        };
        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return None;
        }
        let (name, version, classifier) = match parts.as_slice() {
            [group, artifact] => (format!("{}:{}", group, artifact), DependencyVersion::Managed, None),
            [group, artifact, version] => (
                format!("{}:{}", group, artifact),
                DependencyVersion::Pinned((*version).to_string()),
                None,
            ),
            [group, artifact, version, classifier] => (
                format!("{}:{}", group, artifact),
                DependencyVersion::Pinned((*version).to_string()),
                Some((*classifier).to_string()),
            ),
            _ => return None,
        };
        Some(Self {
            configuration: configuration.to_string(),
            name,
            version,
            classifier,
            extension,
            platform,
            enforced: false,
        })
    }

    /// Mark as declared through `enforcedPlatform(...)`
    pub fn enforced(mut self) -> Self {
        self.platform = true;
        self.enforced = true;
        self
    }

    /// The coordinate as written in the descriptor
    pub fn coordinate(&self) -> String {
        let mut out = self.name.clone();
        if let DependencyVersion::Pinned(v) = &self.version {
            out.push(':');
            out.push_str(v);
        }
        if let Some(classifier) = &self.classifier {
            out.push(':');
            out.push_str(classifier);
        }
        if let Some(extension) = &self.extension {
            out.push('@');
            out.push_str(extension);
        }
        out
    }
}

/// The parsed build descriptor of one Android app module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Plugin ids in application order
    pub plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Setting<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<Setting<String>>,
    /// `flutter { source = ... }`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    /// Names declared in `signingConfigs`
    #[serde(default)]
    pub signing_configs: Vec<String>,
    #[serde(default)]
    pub sdk: SdkVersions,
    #[serde(default)]
    pub compatibility: Compatibility,
    #[serde(default)]
    pub identity: AppIdentity,
    #[serde(default)]
    pub build_types: Vec<BuildType>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl BuildDescriptor {
    /// Build type name -> signing identity
    pub fn signing(&self) -> BTreeMap<&str, &str> {
        self.build_types
            .iter()
            .filter_map(|bt| bt.signing_config.as_deref().map(|s| (bt.name.as_str(), s)))
            .collect()
    }

    /// Look up a build type by name
    pub fn build_type(&self, name: &str) -> Option<&BuildType> {
        self.build_types.iter().find(|bt| bt.name == name)
    }

    /// Whether a `platform(...)` dependency is declared
    pub fn has_platform(&self) -> bool {
        self.dependencies.iter().any(|d| d.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_version_parse_forms() {
        assert_eq!(JavaVersion::parse("17"), Some(JavaVersion(17)));
        assert_eq!(JavaVersion::parse("1.8"), Some(JavaVersion(8)));
        assert_eq!(JavaVersion::parse("VERSION_17"), Some(JavaVersion(17)));
        assert_eq!(JavaVersion::parse("VERSION_1_8"), Some(JavaVersion(8)));
        assert_eq!(JavaVersion::parse("JVM_21"), Some(JavaVersion(21)));
        assert_eq!(JavaVersion::parse("VERSION_HIGHER"), None);
        assert_eq!(JavaVersion::parse("0"), None);
    }

    #[test]
    fn test_java_version_constant_name() {
        assert_eq!(JavaVersion(8).constant_name(), "VERSION_1_8");
        assert_eq!(JavaVersion(17).constant_name(), "VERSION_17");
        assert_eq!(JavaVersion::parse(&JavaVersion(10).constant_name()), Some(JavaVersion(10)));
    }

    #[test]
    fn test_dependency_from_coordinate() {
        let pinned =
            Dependency::from_coordinate("implementation", "com.google.firebase:firebase-auth-ktx:23.1.0", false)
                .unwrap();
        assert_eq!(pinned.name, "com.google.firebase:firebase-auth-ktx");
        assert_eq!(pinned.version, DependencyVersion::Pinned("23.1.0".into()));
        assert_eq!(pinned.coordinate(), "com.google.firebase:firebase-auth-ktx:23.1.0");

        let managed =
            Dependency::from_coordinate("implementation", "com.google.firebase:firebase-firestore-ktx", false)
                .unwrap();
        assert_eq!(managed.version, DependencyVersion::Managed);

        assert!(Dependency::from_coordinate("implementation", "just-a-name", false).is_none());
        assert!(Dependency::from_coordinate("implementation", "a::1", false).is_none());
        assert!(Dependency::from_coordinate("implementation", "a:b:1@", false).is_none());
        assert!(Dependency::from_coordinate("implementation", "a:b:1:c:d", false).is_none());
    }

    #[test]
    fn test_dependency_classifier_and_extension() {
        let natives =
            Dependency::from_coordinate("runtimeOnly", "org.lwjgl:lwjgl:3.3.1:natives-linux", false)
                .unwrap();
        assert_eq!(natives.name, "org.lwjgl:lwjgl");
        assert_eq!(natives.version, DependencyVersion::Pinned("3.3.1".into()));
        assert_eq!(natives.classifier.as_deref(), Some("natives-linux"));
        assert_eq!(natives.coordinate(), "org.lwjgl:lwjgl:3.3.1:natives-linux");

        let aar = Dependency::from_coordinate("implementation", "com.radha:player:1.0@aar", false)
            .unwrap();
        assert_eq!(aar.extension.as_deref(), Some("aar"));
        assert_eq!(aar.classifier, None);
        assert_eq!(aar.coordinate(), "com.radha:player:1.0@aar");

        let managed_aar =
            Dependency::from_coordinate("implementation", "com.radha:player@aar", false).unwrap();
        assert_eq!(managed_aar.version, DependencyVersion::Managed);
        assert_eq!(managed_aar.coordinate(), "com.radha:player@aar");
    }

    #[test]
    fn test_enforced_platform_implies_platform() {
        let bom = Dependency::from_coordinate("implementation", "com.google.firebase:firebase-bom:34.6.0", false)
            .unwrap()
            .enforced();
        assert!(bom.platform);
        assert!(bom.enforced);
    }

    #[test]
    fn test_signing_map() {
        let mut release = BuildType::new("release");
        release.signing_config = Some("debug".into());
        let descriptor = BuildDescriptor {
            build_types: vec![release, BuildType::new("profile")],
            ..Default::default()
        };
        let signing = descriptor.signing();
        assert_eq!(signing.get("release"), Some(&"debug"));
        assert!(!signing.contains_key("profile"));
    }

    #[test]
    fn test_setting_accessors() {
        let lit: Setting<u32> = Setting::Literal(34);
        let reference: Setting<u32> = Setting::Reference("flutter.compileSdkVersion".into());
        assert_eq!(lit.literal(), Some(&34));
        assert_eq!(reference.reference(), Some("flutter.compileSdkVersion"));
        assert_eq!(reference.to_string(), "flutter.compileSdkVersion");
    }
}
