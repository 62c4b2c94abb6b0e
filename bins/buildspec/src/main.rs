//! buildspec CLI
//!
//! Validates, formats and inspects Android app build descriptors.

use anyhow::Result;
use buildspec_android::gradle::{load_descriptor, parse_descriptor, read_descriptor, ParsedDescriptor};
use buildspec_android::ledger::{ReleaseLedger, ReleaseRecord};
use buildspec_android::render;
use buildspec_android::resolve::Resolver;
use buildspec_android::rules::DescriptorValidator;
use buildspec_cli::output::{self, Status};
use buildspec_cli::progress;
use buildspec_core::config::Config;
use buildspec_core::error::exit_codes;
use buildspec_core::file_scanner::{scan_descriptors, DESCRIPTOR_FILE_NAMES};
use buildspec_core::validation::ValidationResult;
use buildspec_telemetry::{LogFormat, TelemetryConfig, Timer};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "buildspec")]
#[command(about = "Validate and format Android build descriptors")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormat {
    Json,
    Toml,
    Gradle,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a descriptor
    Validate {
        /// Descriptor file or app module directory
        path: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Check versionCode against this release ledger
        #[arg(long)]
        ledger: Option<PathBuf>,
    },

    /// Print the parsed descriptor
    Show {
        /// Descriptor file or app module directory
        path: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ShowFormat,
        /// Print values after resolving toolchain references
        #[arg(long)]
        resolved: bool,
    },

    /// Rewrite a descriptor in canonical form
    Fmt {
        /// Descriptor file or app module directory
        path: Option<PathBuf>,
        /// Check only, don't modify
        #[arg(long)]
        check: bool,
        /// Rewrite even if comments or unmodelled statements would be dropped
        #[arg(long)]
        force: bool,
    },

    /// Find and validate every app descriptor under a directory
    Scan {
        /// Directory to search
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// versionCode release ledger
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },

    /// Print the default configuration
    #[command(name = "init-config")]
    InitConfig,
}

#[derive(Subcommand)]
enum ReleaseAction {
    /// Check that the descriptor's versionCode exceeds the last release
    Check {
        /// Descriptor file or app module directory
        path: Option<PathBuf>,
        /// Ledger file
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Record the descriptor's versionCode as released
    Record {
        /// Descriptor file or app module directory
        path: Option<PathBuf>,
        /// Ledger file
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    buildspec_telemetry::init_with_config(TelemetryConfig::from_verbosity(
        cli.verbose,
        cli.quiet,
        cli.log_format.into(),
    ))?;

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    let quiet = cli.quiet;
    let exit_code = match cli.command {
        Commands::Validate { path, json, strict, ledger } => {
            run_validate(&descriptor_path(path, &config), json, strict, ledger, &config, quiet)
        }
        Commands::Show { path, format, resolved } => {
            run_show(&descriptor_path(path, &config), format, resolved, &config)
        }
        Commands::Fmt { path, check, force } => {
            run_fmt(&descriptor_path(path, &config), check, force, quiet)
        }
        Commands::Scan { root, json, strict } => run_scan(&root, json, strict, &config, quiet),
        Commands::Release { action } => run_release(action, &config, quiet),
        Commands::InitConfig => run_init_config(),
    };

    std::process::exit(exit_code);
}

/// Explicit path, else the configured default; directories get the descriptor file name
fn descriptor_path(path: Option<PathBuf>, config: &Config) -> PathBuf {
    let path = path.unwrap_or_else(|| PathBuf::from(&config.schema.general.descriptor));
    if path.is_dir() {
        path.join(DESCRIPTOR_FILE_NAMES[0])
    } else {
        path
    }
}

fn ledger_path(ledger: Option<PathBuf>, config: &Config) -> PathBuf {
    ledger.unwrap_or_else(|| PathBuf::from(&config.schema.general.ledger))
}

/// Load a descriptor, reporting failure as JSON on stdout when `json` is set
fn load(path: &Path, json: bool) -> Option<ParsedDescriptor> {
    let timer = Timer::start("parse");
    match load_descriptor(path) {
        Ok(parsed) => {
            timer.stop();
            Some(parsed)
        }
        Err(e) if json => {
            let report = json!({ "path": path, "valid": false, "error": e.to_report() });
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
            None
        }
        Err(e) => {
            Status::error(&e.to_string());
            None
        }
    }
}

/// Resolve and validate, or return the exit code for a setup failure
fn check_descriptor(
    path: &Path,
    parsed: &ParsedDescriptor,
    config: &Config,
    ledger: Option<&ReleaseLedger>,
) -> std::result::Result<ValidationResult, i32> {
    let resolver = Resolver::for_descriptor(config, path).map_err(|e| {
        Status::error(&e.to_string());
        exit_codes::FAILURE
    })?;
    let validator = DescriptorValidator::new(&config.schema, &resolver).map_err(|e| {
        Status::error(&e.to_string());
        exit_codes::CONFIG_ERROR
    })?;
    let mut validator = validator.with_descriptor_path(path);
    if let Some(ledger) = ledger {
        validator = validator.with_ledger(ledger);
    }

    let timer = Timer::start("validate");
    let result = validator.validate(&parsed.descriptor);
    timer.stop();
    Ok(result)
}

fn run_validate(
    path: &Path,
    json: bool,
    strict: bool,
    ledger: Option<PathBuf>,
    config: &Config,
    quiet: bool,
) -> i32 {
    let Some(parsed) = load(path, json) else {
        return exit_codes::FAILURE;
    };

    let ledger = match ledger.map(|p| ReleaseLedger::load(&p)).transpose() {
        Ok(ledger) => ledger,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_codes::FAILURE;
        }
    };

    let result = match check_descriptor(path, &parsed, config, ledger.as_ref()) {
        Ok(result) => result,
        Err(code) => return code,
    };
    let result = if strict { result.into_strict() } else { result };

    if json {
        let report = json!({
            "path": path,
            "valid": result.is_valid(),
            "errors": result.errors(),
            "warnings": result.warnings(),
            "skipped": parsed.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        if !quiet {
            Status::header(&format!("Validating {}", path.display()));
        }
        output::print_findings(&result);
        if result.is_valid() {
            if !quiet {
                Status::success(&format!("Descriptor is valid ({})", output::summary(&result)));
            }
        } else {
            Status::error(&format!("Descriptor is invalid ({})", output::summary(&result)));
        }
    }

    info!(path = %path.display(), valid = result.is_valid(), "Validation finished");
    if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    }
}

fn run_show(path: &Path, format: ShowFormat, resolved: bool, config: &Config) -> i32 {
    let Some(parsed) = load(path, false) else {
        return exit_codes::FAILURE;
    };

    if resolved {
        let resolver = match Resolver::for_descriptor(config, path) {
            Ok(resolver) => resolver,
            Err(e) => {
                Status::error(&e.to_string());
                return exit_codes::FAILURE;
            }
        };
        let (values, findings) = resolver.resolve_descriptor(&parsed.descriptor);
        output::print_findings(&findings);
        println!("{}", serde_json::to_string_pretty(&values).unwrap_or_default());
        return exit_codes::SUCCESS;
    }

    let rendered = match format {
        ShowFormat::Json => render::to_json(&parsed.descriptor),
        ShowFormat::Toml => render::to_toml(&parsed.descriptor),
        ShowFormat::Gradle => Ok(render::to_gradle(&parsed.descriptor)),
    };
    match rendered {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&e.to_string());
            exit_codes::FAILURE
        }
    }
}

fn run_fmt(path: &Path, check: bool, force: bool, quiet: bool) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            Status::error(&format!("Cannot read {}: {}", path.display(), e));
            return exit_codes::FAILURE;
        }
    };
    let parsed = match parse_descriptor(&source) {
        Ok(parsed) => parsed,
        Err(e) => {
            Status::error(&format!("{}: {}", path.display(), e));
            return exit_codes::FAILURE;
        }
    };

    let rendered = render::to_gradle(&parsed.descriptor);
    if rendered == source {
        if !quiet {
            Status::success(&format!("{} is canonical", path.display()));
        }
        return exit_codes::SUCCESS;
    }

    if check {
        Status::error(&format!("{} is not in canonical form", path.display()));
        return exit_codes::FAILURE;
    }

    if !force && (!parsed.is_lossless() || parsed.comments > 0) {
        Status::error(&format!(
            "Rewriting {} would drop {} and {}",
            path.display(),
            output::format_count(parsed.comments, "comment", "comments"),
            output::format_count(parsed.skipped.len(), "statement", "statements"),
        ));
        for skipped in &parsed.skipped {
            eprintln!(
                "    line {}: {}",
                skipped.line,
                if skipped.context.is_empty() {
                    skipped.statement.clone()
                } else {
                    format!("{} in {}", skipped.statement, skipped.context)
                }
            );
        }
        eprintln!("    {}", "Re-run with --force to rewrite anyway".dimmed());
        return exit_codes::FAILURE;
    }

    if let Err(e) = std::fs::write(path, rendered) {
        Status::error(&format!("Cannot write {}: {}", path.display(), e));
        return exit_codes::FAILURE;
    }
    if !quiet {
        Status::success(&format!("Formatted {}", path.display()));
    }
    exit_codes::SUCCESS
}

fn run_scan(root: &Path, json: bool, strict: bool, config: &Config, quiet: bool) -> i32 {
    let timer = Timer::start("scan");
    let spinner = progress::spinner("Searching for descriptors...", quiet || json);
    let found = scan_descriptors(root);
    progress::finish(&spinner);

    let paths = match found {
        Ok(paths) => paths,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_codes::FAILURE;
        }
    };

    let pb = progress::descriptor_progress(paths.len() as u64, quiet || json);
    let mut reports = Vec::new();
    let mut skipped = 0usize;
    let mut unparsed = 0usize;
    let mut exit_code = exit_codes::SUCCESS;

    for path in &paths {
        pb.inc(1);
        // Root and settings scripts use Kotlin the reader does not model
        let parsed = match load_descriptor(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(path = %path.display(), error = %e.message, "Skipping unparsable descriptor");
                unparsed += 1;
                continue;
            }
        };
        if !is_application_module(&parsed, config) {
            debug!(path = %path.display(), "Skipping non-application module");
            skipped += 1;
            continue;
        }
        let result = match check_descriptor(path, &parsed, config, None) {
            Ok(result) => result,
            Err(code) => {
                progress::finish(&pb);
                return code;
            }
        };
        let result = if strict { result.into_strict() } else { result };
        if !result.is_valid() && exit_code == exit_codes::SUCCESS {
            exit_code = exit_codes::VALIDATION_ERROR;
        }
        reports.push((path.clone(), result));
    }
    progress::finish(&pb);
    let elapsed = timer.stop();

    if json {
        let entries: Vec<_> = reports
            .iter()
            .map(|(path, result)| {
                json!({
                    "path": path,
                    "valid": result.is_valid(),
                    "errors": result.errors(),
                    "warnings": result.warnings(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
        return exit_code;
    }

    if reports.is_empty() {
        Status::warning(&format!("No app descriptors found under {}", root.display()));
        return exit_code;
    }

    for (path, result) in &reports {
        if result.is_clean() {
            if !quiet {
                Status::success(&path.display().to_string());
            }
            continue;
        }
        let line = format!("{} ({})", path.display(), output::summary(result));
        if result.is_valid() {
            Status::warning(&line);
        } else {
            Status::error(&line);
        }
        output::print_findings(result);
    }

    if !quiet {
        if skipped > 0 {
            Status::info(&format!(
                "Skipped {} without com.android.application",
                output::format_count(skipped, "module", "modules")
            ));
        }
        if unparsed > 0 {
            Status::info(&format!(
                "Skipped {} that could not be parsed (run with -v for details)",
                output::format_count(unparsed, "script", "scripts")
            ));
        }
        println!();
        println!(
            "{} checked in {}",
            output::format_count(reports.len(), "descriptor", "descriptors").bold(),
            output::format_duration(elapsed)
        );
    }
    exit_code
}

/// Descriptors that apply the Android application plugin
fn is_application_module(parsed: &ParsedDescriptor, config: &Config) -> bool {
    let aliases = &config.schema.plugins.aliases;
    parsed.descriptor.plugins.iter().any(|id| {
        let id = aliases.get(id).map(String::as_str).unwrap_or(id);
        id == "com.android.application"
    })
}

fn run_release(action: ReleaseAction, config: &Config, quiet: bool) -> i32 {
    let (path, ledger, record) = match action {
        ReleaseAction::Check { path, ledger } => (path, ledger, false),
        ReleaseAction::Record { path, ledger } => (path, ledger, true),
    };
    let path = descriptor_path(path, config);
    let ledger_file = ledger_path(ledger, config);

    // The ledger digest must cover the exact text that was parsed
    let (source, parsed) = match read_descriptor(&path) {
        Ok(read) => read,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_codes::FAILURE;
        }
    };
    let resolver = match Resolver::for_descriptor(config, &path) {
        Ok(resolver) => resolver,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_codes::FAILURE;
        }
    };
    let (values, findings) = resolver.resolve_descriptor(&parsed.descriptor);
    let (Some(application_id), Some(version_code)) = (values.application_id, values.version_code)
    else {
        output::print_findings(&findings);
        Status::error("applicationId and versionCode must both resolve");
        return exit_codes::VALIDATION_ERROR;
    };

    let mut ledger = match ReleaseLedger::load(&ledger_file) {
        Ok(ledger) => ledger,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_codes::FAILURE;
        }
    };

    if !record {
        return match ledger.check(&application_id, version_code) {
            Ok(last) => {
                if !quiet {
                    let previous = last
                        .map(|r| r.version_code.to_string())
                        .unwrap_or_else(|| "none".to_string());
                    Status::success(&format!(
                        "{} versionCode {} is releasable (last released: {})",
                        application_id, version_code, previous
                    ));
                }
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::error(&e.to_string());
                exit_codes::VALIDATION_ERROR
            }
        };
    }

    let entry = ReleaseRecord::new(application_id.clone(), version_code, values.version_name)
        .with_descriptor(&source);
    if let Err(e) = ledger.record(entry) {
        Status::error(&e.to_string());
        return exit_codes::VALIDATION_ERROR;
    }
    if let Err(e) = ledger.save() {
        Status::error(&e.to_string());
        return exit_codes::FAILURE;
    }
    if !quiet {
        Status::success(&format!(
            "Recorded {} versionCode {} in {}",
            application_id,
            version_code,
            ledger_file.display()
        ));
    }
    exit_codes::SUCCESS
}

fn run_init_config() -> i32 {
    match Config::default_toml() {
        Ok(text) => {
            print!("{}", text);
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&e.to_string());
            exit_codes::FAILURE
        }
    }
}
