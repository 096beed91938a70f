use clap::{Parser, ValueEnum};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use waypost::metadata::ui_api::UiApiBundle;
use waypost::prelude::*;

/// Input layout of the snapshot file.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// The canonical `MetadataSnapshot` JSON layout
    Snapshot,
    /// A bundle of raw UI API responses
    UiApi,
}

/// Resolves picklist-driven field dependencies and previews path transitions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the metadata JSON file
    snapshot_path: String,

    /// Layout of the metadata file
    #[arg(short, long, value_enum, default_value = "snapshot")]
    format: InputFormat,

    /// Committed value of the controlling field, for a transition preview
    #[arg(long)]
    current: Option<String>,

    /// Step to select before completing; defaults to the current value
    #[arg(long, requires = "current")]
    select: Option<String>,

    /// Maximum nesting depth accepted in the dependency tree
    #[arg(long, default_value_t = waypost::graph::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let load_start = Instant::now();
    let snapshot = load_snapshot(&cli.snapshot_path, cli.format)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load metadata: {}", e)));
    let load_duration = load_start.elapsed();

    let resolve_start = Instant::now();
    let resolver = DependencyResolver::builder(snapshot)
        .with_max_depth(cli.max_depth)
        .build();
    let resolution = resolver.resolve();
    let resolve_duration = resolve_start.elapsed();

    let output = serde_json::to_string_pretty(&resolution.dependencies)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize result: {}", e)));
    println!("{}", output);

    for skipped in &resolution.skipped {
        eprintln!("Skipped: {}", skipped);
    }

    if let Some(current) = cli.current {
        preview_transition(&resolver, resolution.dependencies, current, cli.select);
    }

    eprintln!("\n--- Performance Summary ---");
    eprintln!("File Loading:   {:?}", load_duration);
    eprintln!("Resolution:     {:?}", resolve_duration);
}

fn init_logging(level: &str) {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_snapshot(
    path: &str,
    format: InputFormat,
) -> std::result::Result<MetadataSnapshot, MetadataError> {
    match format {
        InputFormat::Snapshot => MetadataSnapshot::from_file(path),
        InputFormat::UiApi => {
            let json = fs::read_to_string(path).map_err(|e| MetadataError::Unavailable {
                source_name: path.to_string(),
                message: e.to_string(),
            })?;
            UiApiBundle::from_json(&json)?.into_snapshot()
        }
    }
}

/// Prints the gating decision completing the path from `current` would produce.
fn preview_transition(
    resolver: &DependencyResolver,
    dependencies: ResolvedDependencyMap,
    current: String,
    select: Option<String>,
) {
    let snapshot = resolver.snapshot();
    let config = WidgetConfig::new("preview", "preview", snapshot.controlling_field.clone());
    let mut engine = StepTransitionEngine::new(config);
    engine.load(resolver.index().clone(), snapshot.steps.clone(), dependencies);
    engine.sync_record(Some(current));

    if let Some(value) = select {
        engine
            .select(&value)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    }

    println!("\n--- Transition Preview ---");
    match engine.mark_complete() {
        Ok(GatingDecision::CommitDirectly { target }) => {
            println!("-> Commit '{}' directly", target);
        }
        Ok(GatingDecision::RunFlow { target, flow }) => {
            println!("-> Run flow '{}' to reach '{}'", flow.flow_api_name, target);
            for variable in flow.inputs.variables() {
                println!("     {} = {}", variable.name, variable.value);
            }
        }
        Ok(GatingDecision::CollectDependentFields { target, fields }) => {
            println!("-> Collect {} before '{}'", fields.join(", "), target);
        }
        Err(e) => println!("-> Blocked: {}", e),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
