use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use color_schema_bundler::{
    BundleRequest, BundlerConfig, DependencyCollector, SchemaStore, build_registry,
    bundle_schemas, parse_requested, write_bundle, write_registry,
};
use color_schema_core::{
    Bundle, DependencyNode, ExtractOptions, Registry, ResolvedDependencies, SchemaKey,
    ValidationError, validate_bundle, validate_registry,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const BINARY_NAME: &str = "color-schema";

#[derive(Debug, Parser)]
#[command(name = "color-schema")]
#[command(about = "Inline, resolve and bundle color schema stores", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Schema store root containing types/ and functions/ (default: schemas).
    #[arg(long, global = true)]
    schemas_dir: Option<PathBuf>,
    /// Registry base URL used in every emitted URI.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// YAML configuration file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bundle requested schemas and their runtime dependencies into one JSON file.
    Bundle(BundleArgs),
    /// Build the full registry plus per-schema artifacts and manifest.
    Build(BuildArgs),
    /// Print the resolved dependencies of schemas as JSON.
    Deps(DepsArgs),
    /// Validate a bundle or registry JSON file.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Schemas to bundle: slug, type:slug, function:slug, or registry URI.
    #[arg(required = true)]
    schemas: Vec<String>,
    /// Output JSON bundle path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Output directory for registry artifacts (default: config output_dir).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DepsArgs {
    /// Schemas to resolve: slug, type:slug, function:slug, or registry URI.
    #[arg(required = true)]
    schemas: Vec<String>,
    /// Follow color type conversions as dependencies.
    #[arg(long)]
    include_conversions: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Bundle or registry JSON file.
    input: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DepsReport {
    requested_schemas: Vec<String>,
    resolved_dependencies: ResolvedDependencies,
    dependency_tree: Vec<DependencyNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let result = build_config(&cli.global).and_then(|config| match cli.command {
        Command::Bundle(args) => run_bundle(&config, args),
        Command::Build(args) => run_build(&config, args),
        Command::Deps(args) => run_deps(&config, args),
        Command::Validate(args) => run_validate(args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Defaults, then the `--config` file, then flag overrides.
fn build_config(global: &GlobalArgs) -> Result<BundlerConfig, String> {
    let mut config = match &global.config {
        Some(path) => BundlerConfig::load(path).map_err(|e| e.to_string())?,
        None => BundlerConfig::default(),
    };
    if let Some(dir) = &global.schemas_dir {
        config = config.with_schemas_dir(dir.clone());
    }
    if let Some(base_url) = &global.base_url {
        config = config.with_base_url(base_url.clone());
    }
    config.validate().map_err(|e| e.to_string())?;

    debug!(
        base_url = %config.base_url,
        schemas_dir = %config.schemas_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

fn open_store(config: &BundlerConfig) -> Result<SchemaStore, String> {
    SchemaStore::open(&config.schemas_dir).map_err(|err| {
        format!(
            "Failed to open schema store '{}': {err}",
            config.schemas_dir.display()
        )
    })
}

/// The invoking argument list, recorded as `generatedBy`.
fn invocation() -> String {
    std::iter::once(BINARY_NAME.to_string())
        .chain(std::env::args().skip(1))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_bundle(config: &BundlerConfig, args: BundleArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let request = BundleRequest::new(args.schemas).with_generated_by(invocation());
    let outcome = bundle_schemas(&store, config, &request).map_err(|e| e.to_string())?;
    write_bundle(&outcome.bundle, &args.output).map_err(|e| e.to_string())?;

    println!(
        "Bundled {} schema(s) into '{}'.",
        outcome.bundle.schema_count(),
        args.output.display()
    );
    if !outcome.warnings.is_empty() {
        eprintln!(
            "{} warning(s) emitted during bundling.",
            outcome.warnings.len()
        );
    }
    Ok(())
}

fn run_build(config: &BundlerConfig, args: BuildArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let output = args.output.unwrap_or_else(|| config.output_dir.clone());

    let build = build_registry(&store, config, Some(invocation())).map_err(|e| e.to_string())?;
    write_registry(&build, &output).map_err(|e| e.to_string())?;

    println!(
        "Built registry with {} type(s) and {} function(s) into '{}'.",
        build.registry.metadata.type_count,
        build.registry.metadata.function_count,
        output.display()
    );
    if !build.failures.is_empty() {
        let excluded: Vec<String> = build.failures.iter().map(|f| f.key.to_string()).collect();
        eprintln!(
            "{} schema(s) excluded: {}",
            build.failures.len(),
            excluded.join(", ")
        );
    }
    Ok(())
}

fn run_deps(config: &BundlerConfig, args: DepsArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let options = if args.include_conversions || config.include_color_type_dependencies {
        ExtractOptions::with_conversions()
    } else {
        ExtractOptions::default()
    };

    let seeds = args
        .schemas
        .iter()
        .map(|identifier| parse_requested(&store, config, identifier))
        .collect::<Result<Vec<SchemaKey>, _>>()
        .map_err(|e| e.to_string())?;

    let collector = DependencyCollector::new(&store, config, options);
    let outcome = collector.collect(&seeds);
    let dependency_tree = outcome
        .documents
        .iter()
        .map(|(key, doc)| collector.dependency_node(key, doc))
        .collect();

    let report = DepsReport {
        requested_schemas: args.schemas,
        resolved_dependencies: outcome.dependencies,
        dependency_tree,
        warnings: outcome.warnings,
    };
    let raw = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("Failed to serialize dependency report: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| format!("Invalid JSON in '{}': {err}", args.input.display()))?;

    // Bundles carry a flat `schemas` array; registries split by kind.
    let (label, count, findings): (&str, usize, Vec<ValidationError>) =
        if value.get("schemas").is_some() {
            let bundle: Bundle = serde_json::from_value(value)
                .map_err(|err| format!("'{}' is not a bundle: {err}", args.input.display()))?;
            ("bundle", bundle.schema_count(), validate_bundle(&bundle))
        } else {
            let registry: Registry = serde_json::from_value(value)
                .map_err(|err| format!("'{}' is not a registry: {err}", args.input.display()))?;
            ("registry", registry.schema_count(), validate_registry(&registry))
        };

    for finding in &findings {
        let level = if finding.is_fatal() { "error" } else { "warning" };
        eprintln!("{level}: {finding}");
    }

    let fatal = findings.iter().filter(|f| f.is_fatal()).count();
    if fatal > 0 {
        return Err(format!(
            "{fatal} validation error(s) in '{}'",
            args.input.display()
        ));
    }

    println!(
        "Validated {label} '{}' with {count} schema(s), {} finding(s).",
        args.input.display(),
        findings.len()
    );
    Ok(())
}
