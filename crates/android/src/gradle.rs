//! Gradle Kotlin DSL descriptor reading
//!
//! Lowers a parsed `build.gradle.kts` into a [`BuildDescriptor`]. Statements
//! the model has no place for are reported in [`ParsedDescriptor::skipped`]
//! so that rewriting the file can refuse to drop them silently.

use crate::descriptor::{BuildDescriptor, BuildType, Dependency, JavaVersion, Setting};
use crate::dsl::{parse_script, AssignOp, Expr, ParseError, Segment, Stmt};
use buildspec_core::error::{Error, Result, ResultExt};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// A statement the descriptor model does not capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub line: usize,
    /// Enclosing block path, e.g. `android.signingConfigs`
    pub context: String,
    pub statement: String,
}

/// Result of reading a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDescriptor {
    pub descriptor: BuildDescriptor,
    pub skipped: Vec<Skipped>,
    /// Comments in the source, which rendering drops
    pub comments: usize,
}

impl ParsedDescriptor {
    /// Whether rendering the descriptor would reproduce every statement
    pub fn is_lossless(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parse descriptor source text
pub fn parse_descriptor(source: &str) -> std::result::Result<ParsedDescriptor, ParseError> {
    let script = parse_script(source)?;
    let mut lowering = Lowering::default();
    lowering.top_level(&script.statements)?;
    debug!(
        plugins = lowering.descriptor.plugins.len(),
        dependencies = lowering.descriptor.dependencies.len(),
        skipped = lowering.skipped.len(),
        "Descriptor lowered"
    );
    Ok(ParsedDescriptor {
        descriptor: lowering.descriptor,
        skipped: lowering.skipped,
        comments: script.comments,
    })
}

/// Read and parse a descriptor file
pub fn load_descriptor(path: &Path) -> Result<ParsedDescriptor> {
    read_descriptor(path).map(|(_, parsed)| parsed)
}

/// Like [`load_descriptor`], also returning the text that was parsed
pub fn read_descriptor(path: &Path) -> Result<(String, ParsedDescriptor)> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    let source = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("While reading {}", path.display()))?;
    let parsed = parse_descriptor(&source)
        .map_err(Error::from)
        .context(format!("While reading {}", path.display()))?;
    Ok((source, parsed))
}

#[derive(Default)]
struct Lowering {
    descriptor: BuildDescriptor,
    skipped: Vec<Skipped>,
}

fn lower_error(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::new(line, 1, message)
}

/// `name = value` with a plain `=`. Compound `+=` and `-=` depend on a
/// prior value and are left unmodelled.
fn property_set(stmt: &Stmt) -> Option<(&str, &Expr, usize)> {
    match stmt {
        Stmt::Assign {
            target,
            op: AssignOp::Set,
            value,
            line,
        } => match target.as_slice() {
            [name] => Some((name.as_str(), value, *line)),
            _ => None,
        },
        _ => None,
    }
}

/// Name of a `name { ... }` block head
fn plain_block_name(head: &[Segment]) -> Option<&str> {
    match head {
        [Segment::Name(name)] => Some(name),
        _ => None,
    }
}

/// Container element name from `release`, `getByName("release")`, `create("staging")`
fn container_element_name(head: &[Segment]) -> Option<String> {
    match head {
        [Segment::Name(name)] => Some(name.clone()),
        [Segment::Call { name, args }]
            if matches!(
                name.as_str(),
                "getByName" | "create" | "named" | "register" | "maybeCreate"
            ) =>
        {
            match args.as_slice() {
                [arg] if arg.name.is_none() => arg.value.as_str().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }
}

impl Lowering {
    fn skip(&mut self, context: &str, stmt: &Stmt) {
        debug!(line = stmt.line(), context, statement = %stmt.summary(), "Skipping statement");
        self.skipped.push(Skipped {
            line: stmt.line(),
            context: context.to_string(),
            statement: stmt.summary(),
        });
    }

    fn top_level(&mut self, statements: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in statements {
            match stmt {
                Stmt::Block { head, body, .. } => match plain_block_name(head) {
                    Some("plugins") => self.plugins(body),
                    Some("android") => self.android(body)?,
                    Some("flutter") => self.flutter(body)?,
                    Some("dependencies") => self.dependencies(body)?,
                    _ => self.skip("", stmt),
                },
                _ => self.skip("", stmt),
            }
        }
        Ok(())
    }

    fn plugins(&mut self, body: &[Stmt]) {
        for stmt in body {
            let id = match stmt {
                Stmt::Expr { expr: Expr::Chain(segments), .. } => plugin_id(segments),
                _ => None,
            };
            match id {
                Some(id) => self.descriptor.plugins.push(id),
                None => self.skip("plugins", stmt),
            }
        }
    }

    fn android(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            if let Some((name, value, line)) = property_set(stmt) {
                let d = &mut self.descriptor;
                match name {
                    "namespace" => d.namespace = Some(string_setting(value, line)?),
                    "compileSdk" => d.sdk.compile = Some(int_setting(value, line)?),
                    "ndkVersion" => d.ndk_version = Some(string_setting(value, line)?),
                    _ => self.skip("android", stmt),
                }
                continue;
            }
            match stmt {
                Stmt::Block { head, body, .. } => match plain_block_name(head) {
                    Some("compileOptions") => self.compile_options(body)?,
                    Some("kotlinOptions") => self.kotlin_options(body)?,
                    Some("defaultConfig") => self.default_config(body)?,
                    Some("signingConfigs") => self.signing_configs(body),
                    Some("buildTypes") => self.build_types(body)?,
                    _ => self.skip("android", stmt),
                },
                _ => self.skip("android", stmt),
            }
        }
        Ok(())
    }

    fn compile_options(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            let compatibility = &mut self.descriptor.compatibility;
            match property_set(stmt) {
                Some(("sourceCompatibility", value, line)) => {
                    compatibility.source = Some(java_setting(value, line)?)
                }
                Some(("targetCompatibility", value, line)) => {
                    compatibility.target = Some(java_setting(value, line)?)
                }
                _ => self.skip("android.compileOptions", stmt),
            }
        }
        Ok(())
    }

    fn kotlin_options(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            match property_set(stmt) {
                Some(("jvmTarget", value, line)) => {
                    self.descriptor.compatibility.jvm_target = Some(java_setting(value, line)?)
                }
                _ => self.skip("android.kotlinOptions", stmt),
            }
        }
        Ok(())
    }

    fn default_config(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            let Some((name, value, line)) = property_set(stmt) else {
                self.skip("android.defaultConfig", stmt);
                continue;
            };
            let d = &mut self.descriptor;
            match name {
                "applicationId" => d.identity.application_id = Some(string_setting(value, line)?),
                "versionCode" => d.identity.version_code = Some(int_setting(value, line)?),
                "versionName" => d.identity.version_name = Some(string_setting(value, line)?),
                "minSdk" => d.sdk.min = Some(int_setting(value, line)?),
                "targetSdk" => d.sdk.target = Some(int_setting(value, line)?),
                _ => self.skip("android.defaultConfig", stmt),
            }
        }
        Ok(())
    }

    fn signing_configs(&mut self, body: &[Stmt]) {
        for stmt in body {
            let Stmt::Block { head, body: inner, .. } = stmt else {
                self.skip("android.signingConfigs", stmt);
                continue;
            };
            let Some(name) = container_element_name(head) else {
                self.skip("android.signingConfigs", stmt);
                continue;
            };
            let context = format!("android.signingConfigs.{}", name);
            for inner_stmt in inner {
                self.skip(&context, inner_stmt);
            }
            if !self.descriptor.signing_configs.contains(&name) {
                self.descriptor.signing_configs.push(name);
            }
        }
    }

    fn build_types(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            let Stmt::Block { head, body: inner, .. } = stmt else {
                self.skip("android.buildTypes", stmt);
                continue;
            };
            let Some(name) = container_element_name(head) else {
                self.skip("android.buildTypes", stmt);
                continue;
            };

            let index = match self.descriptor.build_types.iter().position(|bt| bt.name == name) {
                Some(index) => index,
                None => {
                    self.descriptor.build_types.push(BuildType::new(name.clone()));
                    self.descriptor.build_types.len() - 1
                }
            };

            let context = format!("android.buildTypes.{}", name);
            for inner_stmt in inner {
                let Some((property, value, line)) = property_set(inner_stmt) else {
                    self.skip(&context, inner_stmt);
                    continue;
                };
                let build_type = &mut self.descriptor.build_types[index];
                match property {
                    "signingConfig" => match signing_reference(value) {
                        Some(identity) => build_type.signing_config = Some(identity),
                        None => {
                            return Err(lower_error(
                                line,
                                format!(
                                    "unsupported signingConfig value `{}`; expected signingConfigs.getByName(\"name\")",
                                    value.render()
                                ),
                            ))
                        }
                    },
                    "isMinifyEnabled" => build_type.minify_enabled = Some(bool_value(value, line)?),
                    "isShrinkResources" => {
                        build_type.shrink_resources = Some(bool_value(value, line)?)
                    }
                    _ => self.skip(&context, inner_stmt),
                }
            }
        }
        Ok(())
    }

    fn flutter(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            match property_set(stmt) {
                Some(("source", Expr::Str(source), _)) => {
                    self.descriptor.source_root = Some(source.clone())
                }
                Some(("source", Expr::Int(_) | Expr::Bool(_) | Expr::Null, line)) => {
                    return Err(lower_error(line, "flutter.source must be a string"))
                }
                _ => self.skip("flutter", stmt),
            }
        }
        Ok(())
    }

    fn dependencies(&mut self, body: &[Stmt]) -> std::result::Result<(), ParseError> {
        for stmt in body {
            let Stmt::Expr { expr, line } = stmt else {
                self.skip("dependencies", stmt);
                continue;
            };
            let Some((configuration, args)) = expr.as_call() else {
                self.skip("dependencies", stmt);
                continue;
            };
            let [arg] = args else {
                self.skip("dependencies", stmt);
                continue;
            };
            if arg.name.is_some() {
                self.skip("dependencies", stmt);
                continue;
            }

            // `wrapper` is `platform` or `enforcedPlatform` for BoM entries
            let (coordinate, wrapper) = match &arg.value {
                Expr::Str(s) => (s.as_str(), None),
                other => match other.as_call() {
                    Some((wrapper @ ("platform" | "enforcedPlatform"), [inner]))
                        if inner.name.is_none() =>
                    {
                        match inner.value.as_str() {
                            Some(s) => (s, Some(wrapper)),
                            None => {
                                self.skip("dependencies", stmt);
                                continue;
                            }
                        }
                    }
                    _ => {
                        // project(":core"), files(...), version catalog accessors
                        self.skip("dependencies", stmt);
                        continue;
                    }
                },
            };

            let dependency = Dependency::from_coordinate(configuration, coordinate, wrapper.is_some())
                .ok_or_else(|| {
                    lower_error(
                        *line,
                        format!(
                            "invalid dependency coordinate `{}`; expected group:artifact[:version[:classifier]][@extension]",
                            coordinate
                        ),
                    )
                })?;
            self.descriptor.dependencies.push(match wrapper {
                Some("enforcedPlatform") => dependency.enforced(),
                _ => dependency,
            });
        }
        Ok(())
    }
}

fn plugin_id(segments: &[Segment]) -> Option<String> {
    match segments {
        [Segment::Call { name, args }] if args.len() == 1 && args[0].name.is_none() => {
            let value = args[0].value.as_str()?;
            match name.as_str() {
                "id" => Some(value.to_string()),
                "kotlin" => Some(format!("org.jetbrains.kotlin.{}", value)),
                _ => None,
            }
        }
        // Built-in plugins written as bare or backtick identifiers: `kotlin-android`
        [Segment::Name(name)] => Some(name.clone()),
        _ => None,
    }
}

fn signing_reference(value: &Expr) -> Option<String> {
    let Expr::Chain(segments) = value else {
        return None;
    };
    match segments.as_slice() {
        [Segment::Name(container), rest] if container == "signingConfigs" => match rest {
            Segment::Call { name, args } if name == "getByName" && args.len() == 1 => {
                args[0].value.as_str().map(str::to_string)
            }
            Segment::Index(index) => index.as_str().map(str::to_string),
            Segment::Name(name) => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn int_setting(value: &Expr, line: usize) -> std::result::Result<Setting<u32>, ParseError> {
    match value {
        Expr::Int(v) => u32::try_from(*v)
            .map(Setting::Literal)
            .map_err(|_| lower_error(line, format!("value {} is out of range", v))),
        Expr::Str(_) | Expr::Template(_) | Expr::Bool(_) | Expr::Null => Err(lower_error(
            line,
            format!("expected an integer, found {}", value.render()),
        )),
        other => Ok(Setting::Reference(reference_text(other))),
    }
}

fn string_setting(value: &Expr, line: usize) -> std::result::Result<Setting<String>, ParseError> {
    match value {
        Expr::Str(s) => Ok(Setting::Literal(s.clone())),
        Expr::Int(_) | Expr::Bool(_) | Expr::Null => Err(lower_error(
            line,
            format!("expected a string, found {}", value.render()),
        )),
        other => Ok(Setting::Reference(reference_text(other))),
    }
}

fn java_setting(value: &Expr, line: usize) -> std::result::Result<Setting<JavaVersion>, ParseError> {
    let invalid = || lower_error(line, format!("unrecognized Java version `{}`", value.render()));
    match value {
        Expr::Str(s) => JavaVersion::parse(s).map(Setting::Literal).ok_or_else(invalid),
        Expr::Int(v) => u16::try_from(*v)
            .ok()
            .and_then(|v| JavaVersion::parse(&v.to_string()))
            .map(Setting::Literal)
            .ok_or_else(invalid),
        Expr::Chain(segments) => {
            let names: Vec<&str> = segments
                .iter()
                .map(|s| match s {
                    Segment::Name(n) => n.as_str(),
                    Segment::Call { name, args } if name == "toString" && args.is_empty() => "",
                    _ => "?",
                })
                .collect();
            match names.as_slice() {
                ["JavaVersion", constant] | ["JavaVersion", constant, ""]
                    if constant.starts_with("VERSION_") =>
                {
                    JavaVersion::parse(constant).map(Setting::Literal).ok_or_else(invalid)
                }
                ["JvmTarget", constant] if constant.starts_with("JVM_") => {
                    JavaVersion::parse(constant).map(Setting::Literal).ok_or_else(invalid)
                }
                _ => Ok(Setting::Reference(reference_text(value))),
            }
        }
        Expr::Bool(_) | Expr::Null => Err(invalid()),
        other => Ok(Setting::Reference(reference_text(other))),
    }
}

fn bool_value(value: &Expr, line: usize) -> std::result::Result<bool, ParseError> {
    match value {
        Expr::Bool(b) => Ok(*b),
        _ => Err(lower_error(
            line,
            format!("expected true or false, found {}", value.render()),
        )),
    }
}

fn reference_text(value: &Expr) -> String {
    value.as_dotted().unwrap_or_else(|| value.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DependencyVersion;

    const OBSERVED: &str = include_str!("../tests/fixtures/build.gradle.kts");

    #[test]
    fn test_observed_descriptor() {
        let parsed = parse_descriptor(OBSERVED).unwrap();
        let d = &parsed.descriptor;

        assert_eq!(
            d.plugins,
            vec![
                "com.android.application",
                "kotlin-android",
                "dev.flutter.flutter-gradle-plugin",
                "com.google.gms.google-services",
            ]
        );
        assert_eq!(
            d.namespace,
            Some(Setting::Literal("com.example.radha_naam_japa".to_string()))
        );
        assert_eq!(
            d.sdk.compile,
            Some(Setting::Reference("flutter.compileSdkVersion".to_string()))
        );
        assert_eq!(d.sdk.min, Some(Setting::Reference("flutter.minSdkVersion".to_string())));
        assert_eq!(d.compatibility.source, Some(Setting::Literal(JavaVersion(17))));
        assert_eq!(d.compatibility.target, Some(Setting::Literal(JavaVersion(17))));
        assert_eq!(d.compatibility.jvm_target, Some(Setting::Literal(JavaVersion(17))));
        assert_eq!(
            d.identity.version_code,
            Some(Setting::Reference("flutter.versionCode".to_string()))
        );
        assert_eq!(d.signing().get("release"), Some(&"debug"));
        assert_eq!(d.source_root.as_deref(), Some("../.."));
        assert_eq!(d.dependencies.len(), 3);
        assert_eq!(
            d.dependencies[1].version,
            DependencyVersion::Pinned("23.1.0".to_string())
        );
        assert!(parsed.is_lossless());
        assert!(parsed.comments > 0);
    }

    #[test]
    fn test_platform_and_managed_dependencies() {
        let parsed = parse_descriptor(
            r#"dependencies {
                implementation(platform("com.google.firebase:firebase-bom:34.6.0"))
                implementation("com.google.firebase:firebase-firestore-ktx")
                testImplementation("junit:junit:4.13.2")
            }"#,
        )
        .unwrap();
        let deps = &parsed.descriptor.dependencies;
        assert!(deps[0].platform);
        assert_eq!(deps[1].version, DependencyVersion::Managed);
        assert_eq!(deps[2].configuration, "testImplementation");
        assert!(parsed.descriptor.has_platform());
    }

    #[test]
    fn test_skipped_statements_are_reported() {
        let parsed = parse_descriptor(
            r#"import java.util.Properties
            android {
                signingConfigs {
                    create("release") {
                        keyAlias = keystoreProperties["keyAlias"] as String
                    }
                }
                lint { abortOnError = false }
            }
            dependencies {
                implementation(project(":core"))
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.descriptor.signing_configs, vec!["release"]);
        let contexts: Vec<&str> = parsed.skipped.iter().map(|s| s.context.as_str()).collect();
        assert_eq!(
            contexts,
            vec!["", "android.signingConfigs.release", "android", "dependencies"]
        );
        assert!(!parsed.is_lossless());
    }

    #[test]
    fn test_build_type_forms_merge() {
        let parsed = parse_descriptor(
            r#"android {
                buildTypes {
                    getByName("release") {
                        isMinifyEnabled = true
                    }
                    release {
                        signingConfig = signingConfigs["upload"]
                    }
                    create("staging") {
                        isShrinkResources = false
                    }
                }
            }"#,
        )
        .unwrap();
        let types = &parsed.descriptor.build_types;
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].minify_enabled, Some(true));
        assert_eq!(types[0].signing_config.as_deref(), Some("upload"));
        assert_eq!(types[1].name, "staging");
    }

    #[test]
    fn test_kotlin_plugin_shorthand_and_jvm_forms() {
        let parsed = parse_descriptor(
            r#"plugins { kotlin("android") }
            android {
                compileOptions { sourceCompatibility = JavaVersion.VERSION_1_8 }
                kotlinOptions { jvmTarget = "1.8" }
            }"#,
        )
        .unwrap();
        let d = &parsed.descriptor;
        assert_eq!(d.plugins, vec!["org.jetbrains.kotlin.android"]);
        assert_eq!(d.compatibility.source, Some(Setting::Literal(JavaVersion(8))));
        assert_eq!(d.compatibility.jvm_target, Some(Setting::Literal(JavaVersion(8))));
    }

    #[test]
    fn test_complex_reference_kept_verbatim() {
        let parsed =
            parse_descriptor("android { compileSdk = libs.versions.compileSdk.get().toInt() }")
                .unwrap();
        assert_eq!(
            parsed.descriptor.sdk.compile,
            Some(Setting::Reference(
                "libs.versions.compileSdk.get().toInt()".to_string()
            ))
        );
    }

    #[test]
    fn test_type_errors_carry_line() {
        let err = parse_descriptor("android {\n  compileSdk = \"34\"\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("integer"));

        let err = parse_descriptor("dependencies {\n\n  implementation(\"nocolon\")\n}").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_read_descriptor_returns_parsed_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("build.gradle.kts");
        std::fs::write(&path, OBSERVED).unwrap();

        let (source, parsed) = read_descriptor(&path).unwrap();
        assert_eq!(source, OBSERVED);
        assert_eq!(parsed, parse_descriptor(OBSERVED).unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_descriptor(Path::new("/nonexistent/build.gradle.kts")).unwrap_err();
        assert_eq!(err.code, buildspec_core::ErrorCode::FileNotFound);
    }

    #[test]
    fn test_compound_assignment_is_skipped() {
        let parsed = parse_descriptor(
            "android {\n  defaultConfig {\n    versionCode += 5\n    minSdk = 21\n  }\n}",
        )
        .unwrap();
        let d = &parsed.descriptor;
        assert_eq!(d.identity.version_code, None);
        assert_eq!(d.sdk.min, Some(Setting::Literal(21)));
        assert!(!parsed.is_lossless());
        assert_eq!(parsed.skipped[0].line, 3);
        assert_eq!(parsed.skipped[0].statement, "`+=` on `versionCode`");
    }

    #[test]
    fn test_enforced_platform_is_kept_apart() {
        let parsed = parse_descriptor(
            r#"dependencies {
                implementation(enforcedPlatform("com.google.firebase:firebase-bom:34.6.0"))
                implementation(platform("androidx.compose:compose-bom:2024.09.00"))
            }"#,
        )
        .unwrap();
        let deps = &parsed.descriptor.dependencies;
        assert!(deps[0].platform && deps[0].enforced);
        assert!(deps[1].platform && !deps[1].enforced);
    }

    #[test]
    fn test_classifier_and_extension_coordinates() {
        let parsed = parse_descriptor(
            r#"dependencies {
                runtimeOnly("org.lwjgl:lwjgl:3.3.1:natives-linux")
                implementation("com.radha:player:1.0@aar")
            }"#,
        )
        .unwrap();
        let deps = &parsed.descriptor.dependencies;
        assert_eq!(deps[0].name, "org.lwjgl:lwjgl");
        assert_eq!(deps[0].classifier.as_deref(), Some("natives-linux"));
        assert_eq!(deps[1].extension.as_deref(), Some("aar"));
        assert!(parsed.is_lossless());
    }

    #[test]
    fn test_string_template_is_a_reference() {
        let parsed = parse_descriptor(
            "android {\n  namespace = \"com.radha.${flavor}\"\n  defaultConfig {\n    versionName = \"1.0.$build\"\n  }\n}",
        )
        .unwrap();
        let d = &parsed.descriptor;
        assert_eq!(
            d.namespace,
            Some(Setting::Reference("\"com.radha.${flavor}\"".to_string()))
        );
        assert_eq!(
            d.identity.version_name,
            Some(Setting::Reference("\"1.0.$build\"".to_string()))
        );

        let err = parse_descriptor("android {\n  compileSdk = \"$sdk\"\n}").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_release_signing_template() {
        let parsed = parse_descriptor(include_str!("../tests/fixtures/release-signing.gradle.kts")).unwrap();
        let d = &parsed.descriptor;
        assert_eq!(d.signing_configs, vec!["release"]);
        assert_eq!(d.signing().get("release"), Some(&"release"));
        assert_eq!(d.namespace, Some(Setting::Literal("com.radha.japa".to_string())));
        assert!(!parsed.is_lossless());
        let skipped_lines: Vec<usize> = parsed.skipped.iter().map(|s| s.line).collect();
        assert_eq!(skipped_lines, vec![1, 2, 10, 11, 12, 40, 41, 42, 43]);
    }

    #[test]
    fn test_flutter_root_build_file_has_no_module() {
        let parsed = parse_descriptor(
            r#"allprojects {
    repositories {
        google()
        mavenCentral()
    }
}

val newBuildDir: Directory = rootProject.layout.buildDirectory.dir("../../build").get()
rootProject.layout.buildDirectory.value(newBuildDir)

subprojects {
    project.evaluationDependsOn(":app")
}

tasks.register<Delete>("clean") {
    delete(rootProject.layout.buildDirectory)
}
"#,
        )
        .unwrap();
        assert_eq!(parsed.descriptor, BuildDescriptor::default());
        assert_eq!(parsed.skipped.len(), 5);
    }
}
