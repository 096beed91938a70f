use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use std::collections::BTreeMap;
use std::fs;
use waypost::metadata::{
    DependencyNode, DependentEntry, DependentPicklistField, MetadataSnapshot, PathStepConfig,
    PicklistEntry, ValidFor,
};
use waypost::validity::encode_bitmap;

/// A CLI tool to generate random metadata snapshots for the waypost resolver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_snapshot.json")]
    output: String,

    /// Number of values of the controlling picklist
    #[arg(long, default_value_t = 6)]
    values: usize,

    /// Number of directly dependent fields
    #[arg(long, default_value_t = 4)]
    dependents: usize,

    /// Maximum nesting depth below each dependent field
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Encode valid-for data as base64 bitmaps instead of ordinal lists
    #[arg(long)]
    bitmask: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.values == 0 {
        eprintln!("Error: --values must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating snapshot ({} values, {} dependent fields, depth up to {})...",
        cli.values, cli.dependents, cli.depth
    );

    let entries: Vec<PicklistEntry> = (0..cli.values)
        .map(|i| PicklistEntry::new(format!("Stage_{}", i), format!("Stage {}", i)))
        .collect();

    let mut tree = BTreeMap::new();
    let mut dependent_fields = BTreeMap::new();
    for i in 0..cli.dependents {
        let field = format!("Dependent_{}__c", i);
        tree.insert(field.clone(), generate_subtree(&mut rng, &field, cli.depth));
        dependent_fields.insert(
            field.clone(),
            generate_dependent_field(&mut rng, &field, cli.values, cli.bitmask),
        );
    }
    println!("-> Generated {} dependent fields.", dependent_fields.len());

    let steps = generate_steps(&mut rng, &entries);
    println!("-> Generated {} step configs.", steps.len());

    let snapshot = MetadataSnapshot {
        controlling_field: "Stage__c".to_string(),
        record_type_id: None,
        entries,
        dependencies: DependencyNode::Branch(tree),
        dependent_fields,
        steps,
    };

    let json_output = serde_json::to_string_pretty(&snapshot)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved snapshot to '{}'",
        cli.output
    );

    Ok(())
}

/// Random nested dependents of `parent`, at most `depth` levels deep.
fn generate_subtree(rng: &mut ThreadRng, parent: &str, depth: usize) -> DependencyNode {
    if depth == 0 {
        return DependencyNode::Leaf;
    }
    let width = rng.random_range(0..=2);
    DependencyNode::branch((0..width).map(|i| {
        let child = format!("{}_{}", parent.trim_end_matches("__c"), i);
        let subtree = generate_subtree(rng, &child, depth - 1);
        (child, subtree)
    }))
}

fn generate_dependent_field(
    rng: &mut ThreadRng,
    field: &str,
    controlling_values: usize,
    bitmask: bool,
) -> DependentPicklistField {
    let entries = (0..rng.random_range(1..=4))
        .map(|i| {
            let ordinals: Vec<usize> = (0..controlling_values)
                .filter(|_| rng.random_bool(0.3))
                .collect();
            let valid_for = if bitmask {
                ValidFor::Bitmask(encode_bitmap(ordinals))
            } else {
                ValidFor::Ordinals(ordinals)
            };
            DependentEntry {
                value: format!("Option_{}", i),
                label: format!("Option {}", i),
                valid_for,
            }
        })
        .collect();

    DependentPicklistField {
        field: field.to_string(),
        entries,
    }
}

/// Step configs with occasional guidance, custom dependent fields and flows.
fn generate_steps(rng: &mut ThreadRng, entries: &[PicklistEntry]) -> Vec<PathStepConfig> {
    let mut steps = Vec::new();
    for entry in entries {
        if !rng.random_bool(0.5) {
            continue;
        }
        let mut step = PathStepConfig::new(entry.value.clone());
        if rng.random_bool(0.5) {
            step.guidance = Some(format!("Review the record before {}.", entry.label));
        }
        if rng.random_bool(0.3) {
            step = step.with_dependent_fields([format!("{}_Notes__c", entry.value)]);
        }
        if rng.random_bool(0.2) {
            step = step.with_flow(format!("{}_Flow", entry.value), rng.random_bool(0.8));
        }
        steps.push(step);
    }
    steps
}
