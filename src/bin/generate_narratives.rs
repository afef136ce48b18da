//! Narrative generation utility
//!
//! Generates human-readable markdown narratives from algorithm traces,
//! used during development to create documentation for QA review.
//!
//! Usage:
//!     generate_narratives <algorithm-name> [example-index | --all]
//!     generate_narratives --all-algorithms
//!
//! Output lands in docs/narratives/<algorithm-name>/example_<N>_<name>.md

use anyhow::{bail, Context};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use algolens::registry::{AlgorithmRegistry, ExampleInput};
use algolens::trace::AlgorithmTracer;

/// Convert an example name to a safe filename component.
///
/// "Basic Search - Target Found" becomes "basic_search_target_found".
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = true;
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_underscore = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !last_was_underscore {
                out.push('_');
                last_was_underscore = true;
            }
        }
    }
    out.trim_end_matches('_').to_string()
}

fn generate_for_example(
    registry: &AlgorithmRegistry,
    algorithm_name: &str,
    example_index: usize,
    example: &ExampleInput,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    println!("  Processing: {}", example.name);

    let mut tracer = registry.lookup(algorithm_name)?;
    let envelope = tracer.execute(example.input.clone())?;

    let narrative = tracer.narrative(&envelope).with_context(|| {
        format!("algorithm '{}' does not produce narratives", algorithm_name)
    })?;

    let filename = format!(
        "example_{}_{}.md",
        example_index + 1,
        sanitize_filename(&example.name)
    );
    let output_path = output_dir.join(filename);
    fs::write(&output_path, narrative)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    Ok(output_path)
}

/// Generate narratives for one algorithm. Returns (success, attempted).
fn generate_for_algorithm(
    registry: &AlgorithmRegistry,
    algorithm_name: &str,
    example_indices: Option<Vec<usize>>,
) -> anyhow::Result<(usize, usize)> {
    let Some(info) = registry.metadata(algorithm_name) else {
        let available: Vec<&str> = registry.list().iter().map(|i| i.name.as_str()).collect();
        println!("Algorithm '{}' not found.", algorithm_name);
        println!("Available: {}", available.join(", "));
        return Ok((0, 0));
    };

    let examples = &info.example_inputs;
    let indices = example_indices.unwrap_or_else(|| (0..examples.len()).collect());

    println!("\n{}", "=".repeat(70));
    println!("Algorithm: {} ({})", info.display_name, algorithm_name);
    println!("Examples: {} of {}", indices.len(), examples.len());
    println!("{}\n", "=".repeat(70));

    let output_dir = PathBuf::from("docs/narratives").join(algorithm_name);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut success_count = 0;
    for idx in &indices {
        let Some(example) = examples.get(*idx) else {
            println!(
                "  Example {} does not exist (max: {})",
                idx,
                examples.len().saturating_sub(1)
            );
            continue;
        };
        match generate_for_example(registry, algorithm_name, *idx, example, &output_dir) {
            Ok(path) => {
                println!("    Saved to: {}", path.display());
                success_count += 1;
            }
            Err(e) => println!("    FAILED: {:#}", e),
        }
    }

    Ok((success_count, indices.len()))
}

fn print_summary(success: usize, total: usize) {
    println!("\n{}", "=".repeat(70));
    if success == total {
        println!("SUCCESS: {}/{} narratives generated", success, total);
    } else {
        println!("PARTIAL: {}/{} narratives generated", success, total);
        println!("{} failed (see errors above)", total - success);
    }
    println!("{}\n", "=".repeat(70));
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(first) = args.first() else {
        eprintln!("Usage: generate_narratives <algorithm-name> [example-index | --all]");
        eprintln!("       generate_narratives --all-algorithms");
        std::process::exit(1);
    };

    let registry = AlgorithmRegistry::with_builtins();

    if first == "--all-algorithms" {
        println!("\nGenerating narratives for ALL algorithms...");

        let names: Vec<String> = registry.list().iter().map(|i| i.name.clone()).collect();
        let mut total_success = 0;
        let mut total_count = 0;
        for name in names {
            let (success, count) = generate_for_algorithm(&registry, &name, None)?;
            total_success += success;
            total_count += count;
        }

        print_summary(total_success, total_count);
        std::process::exit(if total_success == total_count { 0 } else { 1 });
    }

    let example_indices = match args.get(1).map(String::as_str) {
        None | Some("--all") => None,
        Some(raw) => {
            let index: usize = raw.parse().map_err(|_| {
                anyhow::anyhow!("invalid example index '{}', use a number (0-based) or '--all'", raw)
            })?;
            Some(vec![index])
        }
    };

    let (success, total) = generate_for_algorithm(&registry, first, example_indices)?;
    if total == 0 {
        bail!("no narratives generated");
    }

    print_summary(success, total);
    std::process::exit(if success == total { 0 } else { 1 });
}
