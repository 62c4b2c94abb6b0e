//! Canonical rendering of a [`BuildDescriptor`]
//!
//! [`to_gradle`] writes Kotlin DSL that [`crate::gradle::parse_descriptor`]
//! reads back into an equal descriptor. Statements the model does not hold
//! (comments, imports, signing credentials) are not reproduced.

use crate::descriptor::{BuildDescriptor, BuildType, JavaVersion, Setting};
use crate::dsl::quote;
use buildspec_core::error::Result;

const INDENT: &str = "    ";

/// Build types Gradle exposes as plain accessors
const ACCESSOR_BUILD_TYPES: [&str; 2] = ["debug", "release"];

/// Render as canonical Kotlin DSL
pub fn to_gradle(descriptor: &BuildDescriptor) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !descriptor.plugins.is_empty() {
        let mut out = String::from("plugins {\n");
        for plugin in &descriptor.plugins {
            line(&mut out, 1, &format!("id({})", quote(plugin)));
        }
        out.push_str("}\n");
        sections.push(out);
    }

    let android = android_block(descriptor);
    if !android.is_empty() {
        sections.push(android);
    }

    if let Some(source) = &descriptor.source_root {
        let mut out = String::from("flutter {\n");
        line(&mut out, 1, &format!("source = {}", quote(source)));
        out.push_str("}\n");
        sections.push(out);
    }

    if !descriptor.dependencies.is_empty() {
        let mut out = String::from("dependencies {\n");
        for dependency in &descriptor.dependencies {
            let coordinate = quote(&dependency.coordinate());
            let argument = if dependency.enforced {
                format!("enforcedPlatform({})", coordinate)
            } else if dependency.platform {
                format!("platform({})", coordinate)
            } else {
                coordinate
            };
            line(&mut out, 1, &format!("{}({})", dependency.configuration, argument));
        }
        out.push_str("}\n");
        sections.push(out);
    }

    sections.join("\n")
}

/// Pretty JSON export
pub fn to_json(descriptor: &BuildDescriptor) -> Result<String> {
    Ok(serde_json::to_string_pretty(descriptor)?)
}

/// TOML export
pub fn to_toml(descriptor: &BuildDescriptor) -> Result<String> {
    Ok(toml::to_string_pretty(descriptor)?)
}

fn android_block(d: &BuildDescriptor) -> String {
    let mut groups: Vec<String> = Vec::new();

    let mut head = String::new();
    if let Some(namespace) = &d.namespace {
        line(&mut head, 1, &format!("namespace = {}", string_value(namespace)));
    }
    if let Some(compile) = &d.sdk.compile {
        line(&mut head, 1, &format!("compileSdk = {}", int_value(compile)));
    }
    if let Some(ndk) = &d.ndk_version {
        line(&mut head, 1, &format!("ndkVersion = {}", string_value(ndk)));
    }
    groups.push(head);

    if d.compatibility.source.is_some() || d.compatibility.target.is_some() {
        let mut block = String::new();
        line(&mut block, 1, "compileOptions {");
        if let Some(source) = &d.compatibility.source {
            line(&mut block, 2, &format!("sourceCompatibility = {}", java_value(source, false)));
        }
        if let Some(target) = &d.compatibility.target {
            line(&mut block, 2, &format!("targetCompatibility = {}", java_value(target, false)));
        }
        line(&mut block, 1, "}");
        groups.push(block);
    }

    if let Some(jvm) = &d.compatibility.jvm_target {
        let mut block = String::new();
        line(&mut block, 1, "kotlinOptions {");
        line(&mut block, 2, &format!("jvmTarget = {}", java_value(jvm, true)));
        line(&mut block, 1, "}");
        groups.push(block);
    }

    let identity = &d.identity;
    let mut default_config = String::new();
    if let Some(id) = &identity.application_id {
        line(&mut default_config, 2, &format!("applicationId = {}", string_value(id)));
    }
    if let Some(min) = &d.sdk.min {
        line(&mut default_config, 2, &format!("minSdk = {}", int_value(min)));
    }
    if let Some(target) = &d.sdk.target {
        line(&mut default_config, 2, &format!("targetSdk = {}", int_value(target)));
    }
    if let Some(code) = &identity.version_code {
        line(&mut default_config, 2, &format!("versionCode = {}", int_value(code)));
    }
    if let Some(name) = &identity.version_name {
        line(&mut default_config, 2, &format!("versionName = {}", string_value(name)));
    }
    if !default_config.is_empty() {
        let mut block = String::new();
        line(&mut block, 1, "defaultConfig {");
        block.push_str(&default_config);
        line(&mut block, 1, "}");
        groups.push(block);
    }

    if !d.signing_configs.is_empty() {
        let mut block = String::new();
        line(&mut block, 1, "signingConfigs {");
        for name in &d.signing_configs {
            let verb = if name == "debug" { "getByName" } else { "create" };
            line(&mut block, 2, &format!("{}({}) {{}}", verb, quote(name)));
        }
        line(&mut block, 1, "}");
        groups.push(block);
    }

    if !d.build_types.is_empty() {
        let mut block = String::new();
        line(&mut block, 1, "buildTypes {");
        for build_type in &d.build_types {
            build_type_block(&mut block, build_type);
        }
        line(&mut block, 1, "}");
        groups.push(block);
    }

    let body: Vec<String> = groups.into_iter().filter(|g| !g.is_empty()).collect();
    if body.is_empty() {
        return String::new();
    }
    format!("android {{\n{}}}\n", body.join("\n"))
}

fn build_type_block(out: &mut String, build_type: &BuildType) {
    let head = if ACCESSOR_BUILD_TYPES.contains(&build_type.name.as_str()) {
        build_type.name.clone()
    } else {
        format!("create({})", quote(&build_type.name))
    };

    let mut body = String::new();
    if let Some(signing) = &build_type.signing_config {
        line(
            &mut body,
            3,
            &format!("signingConfig = signingConfigs.getByName({})", quote(signing)),
        );
    }
    if let Some(minify) = build_type.minify_enabled {
        line(&mut body, 3, &format!("isMinifyEnabled = {}", minify));
    }
    if let Some(shrink) = build_type.shrink_resources {
        line(&mut body, 3, &format!("isShrinkResources = {}", shrink));
    }

    if body.is_empty() {
        line(out, 2, &format!("{} {{}}", head));
    } else {
        line(out, 2, &format!("{} {{", head));
        out.push_str(&body);
        line(out, 2, "}");
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn string_value(setting: &Setting<String>) -> String {
    match setting {
        Setting::Literal(v) => quote(v),
        Setting::Reference(name) => name.clone(),
    }
}

fn int_value(setting: &Setting<u32>) -> String {
    setting.to_string()
}

fn java_value(setting: &Setting<JavaVersion>, as_string: bool) -> String {
    match setting {
        Setting::Literal(v) if as_string => format!("JavaVersion.{}.toString()", v.constant_name()),
        Setting::Literal(v) => format!("JavaVersion.{}", v.constant_name()),
        Setting::Reference(name) => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AppIdentity, Compatibility, Dependency, SdkVersions};
    use crate::gradle::parse_descriptor;
    use proptest::prelude::*;

    const OBSERVED: &str = include_str!("../tests/fixtures/build.gradle.kts");

    #[test]
    fn test_observed_round_trip() {
        let parsed = parse_descriptor(OBSERVED).unwrap();
        let rendered = to_gradle(&parsed.descriptor);
        let reparsed = parse_descriptor(&rendered).unwrap();
        assert_eq!(reparsed.descriptor, parsed.descriptor);
        assert!(reparsed.is_lossless());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let parsed = parse_descriptor(OBSERVED).unwrap();
        let once = to_gradle(&parsed.descriptor);
        let twice = to_gradle(&parse_descriptor(&once).unwrap().descriptor);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_layout() {
        let parsed = parse_descriptor(OBSERVED).unwrap();
        let rendered = to_gradle(&parsed.descriptor);
        assert!(rendered.starts_with("plugins {\n    id(\"com.android.application\")\n"));
        assert!(rendered.contains("        jvmTarget = JavaVersion.VERSION_17.toString()\n"));
        assert!(rendered.contains(
            "        release {\n            signingConfig = signingConfigs.getByName(\"debug\")\n        }\n"
        ));
        assert!(rendered.contains("    implementation(\"com.google.firebase:firebase-auth-ktx:23.1.0\")\n"));
        assert!(!rendered.contains("//"));
    }

    #[test]
    fn test_enforced_platform_and_classifier_round_trip() {
        let source = "dependencies {\n    implementation(enforcedPlatform(\"com.google.firebase:firebase-bom:34.6.0\"))\n    runtimeOnly(\"org.lwjgl:lwjgl:3.3.1:natives-linux\")\n    implementation(\"com.radha:player:1.0@aar\")\n}\n";
        let parsed = parse_descriptor(source).unwrap();
        assert!(parsed.descriptor.dependencies[0].enforced);
        assert_eq!(to_gradle(&parsed.descriptor), source);
    }

    #[test]
    fn test_dollar_in_literal_is_escaped() {
        let d = BuildDescriptor {
            namespace: Some(Setting::Literal("com.radha.$flavor".into())),
            ..Default::default()
        };
        let rendered = to_gradle(&d);
        assert!(rendered.contains("namespace = \"com.radha.\\$flavor\""));
        assert_eq!(parse_descriptor(&rendered).unwrap().descriptor, d);
    }

    #[test]
    fn test_empty_descriptor_renders_empty() {
        assert_eq!(to_gradle(&BuildDescriptor::default()), "");
    }

    #[test]
    fn test_json_and_toml_exports() {
        let parsed = parse_descriptor(OBSERVED).unwrap();
        let json = to_json(&parsed.descriptor).unwrap();
        let back: BuildDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parsed.descriptor);

        let toml_text = to_toml(&parsed.descriptor).unwrap();
        assert!(toml_text.contains("flutter.compileSdkVersion"));
    }

    fn ident() -> impl Strategy<Value = String> {
        "[a-z][a-zA-Z0-9]{0,8}"
    }

    fn package() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9_]{0,6}", 2..4).prop_map(|parts| parts.join("."))
    }

    fn reference() -> impl Strategy<Value = String> {
        ident().prop_map(|name| format!("flutter.{}", name))
    }

    fn int_setting() -> impl Strategy<Value = Setting<u32>> {
        prop_oneof![
            (1u32..100_000).prop_map(Setting::Literal),
            reference().prop_map(Setting::Reference),
        ]
    }

    fn string_setting() -> impl Strategy<Value = Setting<String>> {
        prop_oneof![
            "[ -~]{0,16}".prop_map(Setting::Literal),
            reference().prop_map(Setting::Reference),
        ]
    }

    fn java_setting() -> impl Strategy<Value = Setting<JavaVersion>> {
        prop_oneof![
            (1u16..=25).prop_map(|v| Setting::Literal(JavaVersion(v))),
            reference().prop_map(Setting::Reference),
        ]
    }

    fn build_type() -> impl Strategy<Value = BuildType> {
        (
            prop_oneof![Just("release".to_string()), Just("debug".to_string()), ident()],
            prop::option::of(ident()),
            prop::option::of(any::<bool>()),
            prop::option::of(any::<bool>()),
        )
            .prop_map(|(name, signing_config, minify_enabled, shrink_resources)| BuildType {
                name,
                signing_config,
                minify_enabled,
                shrink_resources,
            })
    }

    fn dependency() -> impl Strategy<Value = Dependency> {
        let coordinate = (
            package(),
            "[a-z][a-z0-9-]{0,8}",
            prop::option::of((
                "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
                prop::option::of("[a-z][a-z0-9-]{0,8}"),
            )),
            prop::option::of(prop_oneof![Just("aar"), Just("jar")]),
        )
            .prop_map(|(group, artifact, version, extension)| {
                let mut coordinate = format!("{}:{}", group, artifact);
                if let Some((version, classifier)) = version {
                    coordinate.push(':');
                    coordinate.push_str(&version);
                    if let Some(classifier) = classifier {
                        coordinate.push(':');
                        coordinate.push_str(&classifier);
                    }
                }
                if let Some(extension) = extension {
                    coordinate.push('@');
                    coordinate.push_str(extension);
                }
                coordinate
            });
        (
            prop_oneof![Just("implementation"), Just("api"), Just("testImplementation")],
            coordinate,
            // 0 plain, 1 platform(...), 2 enforcedPlatform(...)
            0u8..3,
        )
            .prop_map(|(configuration, coordinate, wrapper)| {
                let dependency =
                    Dependency::from_coordinate(configuration, &coordinate, wrapper == 1).unwrap();
                if wrapper == 2 {
                    dependency.enforced()
                } else {
                    dependency
                }
            })
    }

    fn sdk() -> impl Strategy<Value = SdkVersions> {
        (
            prop::option::of(int_setting()),
            prop::option::of(int_setting()),
            prop::option::of(int_setting()),
        )
            .prop_map(|(compile, min, target)| SdkVersions { compile, min, target })
    }

    fn compatibility() -> impl Strategy<Value = Compatibility> {
        (
            prop::option::of(java_setting()),
            prop::option::of(java_setting()),
            prop::option::of(java_setting()),
        )
            .prop_map(|(source, target, jvm_target)| Compatibility { source, target, jvm_target })
    }

    fn identity() -> impl Strategy<Value = AppIdentity> {
        (
            prop::option::of(string_setting()),
            prop::option::of(int_setting()),
            prop::option::of(string_setting()),
        )
            .prop_map(|(application_id, version_code, version_name)| AppIdentity {
                application_id,
                version_code,
                version_name,
            })
    }

    prop_compose! {
        fn descriptor()(
            plugins in prop::collection::vec(package(), 0..4),
            namespace in prop::option::of(string_setting()),
            ndk_version in prop::option::of(string_setting()),
            source_root in prop::option::of("[./a-z]{1,8}"),
            signing_configs in prop::collection::btree_set(ident(), 0..3),
            sdk in sdk(),
            compatibility in compatibility(),
            identity in identity(),
            build_types in prop::collection::vec(build_type(), 0..3),
            dependencies in prop::collection::vec(dependency(), 0..4),
        ) -> BuildDescriptor {
            let mut unique_types: Vec<BuildType> = Vec::new();
            for bt in build_types {
                if !unique_types.iter().any(|u| u.name == bt.name) {
                    unique_types.push(bt);
                }
            }
            BuildDescriptor {
                plugins,
                namespace,
                ndk_version,
                source_root,
                signing_configs: signing_configs.into_iter().collect(),
                sdk,
                compatibility,
                identity,
                build_types: unique_types,
                dependencies,
            }
        }
    }

    proptest! {
        #[test]
        fn prop_parse_render_round_trip(d in descriptor()) {
            let rendered = to_gradle(&d);
            let parsed = parse_descriptor(&rendered)
                .map_err(|e| TestCaseError::fail(format!("{}\n{}", e, rendered)))?;
            prop_assert_eq!(parsed.descriptor, d);
            prop_assert!(parsed.skipped.is_empty());
        }
    }
}
