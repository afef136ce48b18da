//! Algorithm registry: name to tracer-constructor table
//!
//! The registry is an explicit immutable table constructed once at
//! startup and passed by reference to the HTTP layer, not an ambient
//! singleton. Each lookup returns a fresh tracer instance, matching the
//! one-instance-per-execution model of the core.

use crate::algorithms::{BinarySearchTracer, IntervalCoverageTracer, TwoPointerTracer};
use crate::error::{AlgoLensError, Result};
use crate::trace::AlgorithmTracer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// A named example input for an algorithm, shown by the frontend picker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleInput {
    pub name: String,
    pub input: Value,
}

/// Discovery metadata for one registered algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub example_inputs: Vec<ExampleInput>,
}

type TracerFactory = Box<dyn Fn() -> Box<dyn AlgorithmTracer> + Send + Sync>;

struct Registration {
    info: AlgorithmInfo,
    factory: TracerFactory,
}

/// Immutable name-to-constructor table
///
/// Registration happens during construction; the table is read-only
/// afterwards.
pub struct AlgorithmRegistry {
    entries: Vec<Registration>,
}

impl AlgorithmRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Create a registry with all built-in algorithm tracers registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(
            AlgorithmInfo {
                name: "binary-search".to_string(),
                display_name: "Binary Search".to_string(),
                description: "Halving search over a sorted array, eliminating half the \
                              remaining window at every comparison."
                    .to_string(),
                example_inputs: vec![
                    ExampleInput {
                        name: "Basic Search - Target Found".to_string(),
                        input: json!({"array": [1, 3, 5, 7, 9, 11, 13, 15], "target": 7}),
                    },
                    ExampleInput {
                        name: "Target Missing".to_string(),
                        input: json!({"array": [1, 3, 5, 7, 9, 11, 13, 15], "target": 4}),
                    },
                ],
            },
            Box::new(|| Box::new(BinarySearchTracer::new())),
        );

        registry.register(
            AlgorithmInfo {
                name: "interval-coverage".to_string(),
                display_name: "Interval Coverage".to_string(),
                description: "Remove covered intervals with a recursive greedy filter that \
                              tracks the rightmost coverage point."
                    .to_string(),
                example_inputs: vec![ExampleInput {
                    name: "Basic Coverage".to_string(),
                    input: json!({
                        "intervals": [
                            {"id": 1, "start": 100, "end": 300, "color": "blue"},
                            {"id": 2, "start": 150, "end": 250, "color": "green"},
                            {"id": 3, "start": 400, "end": 500, "color": "amber"},
                        ]
                    }),
                }],
            },
            Box::new(|| Box::new(IntervalCoverageTracer::new())),
        );

        registry.register(
            AlgorithmInfo {
                name: "two-pointer".to_string(),
                display_name: "Two Pointer Pattern".to_string(),
                description: "In-place deduplication of a sorted array using slow and fast \
                              pointers."
                    .to_string(),
                example_inputs: vec![
                    ExampleInput {
                        name: "Duplicates Present".to_string(),
                        input: json!({"array": [1, 1, 2, 2, 3]}),
                    },
                    ExampleInput {
                        name: "Single Element".to_string(),
                        input: json!({"array": [5]}),
                    },
                ],
            },
            Box::new(|| Box::new(TwoPointerTracer::new())),
        );

        registry
    }

    /// Register an algorithm. Intended for use during startup only.
    pub fn register(&mut self, info: AlgorithmInfo, factory: TracerFactory) {
        debug!(name = %info.name, "registering algorithm");
        self.entries.push(Registration { info, factory });
    }

    /// Construct a fresh tracer instance for the named algorithm
    pub fn lookup(&self, name: &str) -> Result<Box<dyn AlgorithmTracer>> {
        self.entries
            .iter()
            .find(|entry| entry.info.name == name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| AlgoLensError::UnknownAlgorithm(name.to_string()))
    }

    /// Whether the named algorithm is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.info.name == name)
    }

    /// Discovery metadata for the named algorithm
    pub fn metadata(&self, name: &str) -> Option<&AlgorithmInfo> {
        self.entries
            .iter()
            .find(|entry| entry.info.name == name)
            .map(|entry| &entry.info)
    }

    /// Discovery metadata for all registered algorithms, in registration order
    pub fn list(&self) -> Vec<&AlgorithmInfo> {
        self.entries.iter().map(|entry| &entry.info).collect()
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
