//! Step recording with ceiling enforcement and envelope assembly
//!
//! The [`TraceRecorder`] owns the mutable trace state of one tracer
//! instance: the ordered step list, the running step counter, the
//! construction clock, and the metadata map the concrete algorithm fills
//! in before the envelope is built.

use super::envelope::{PredictionPoint, Trace, TraceEnvelope, TraceMetadata};
use super::step::TraceStep;
use crate::error::{AlgoLensError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::debug;

/// Recording core driven by every concrete algorithm tracer
///
/// A recorder is single-use: it belongs to exactly one tracer instance and
/// one execution. Tracers call [`reset`](Self::reset) at the start of
/// `execute` so that a re-invoked instance starts from a clean slate
/// instead of silently accumulating steps across calls.
pub struct TraceRecorder {
    steps: Vec<TraceStep>,
    step_count: usize,
    started: Instant,
    metadata: Map<String, Value>,
}

impl TraceRecorder {
    /// Hard ceiling on steps per execution. An unbounded trace indicates a
    /// runaway or adversarial input and must not be allowed to grow without
    /// bound; exceeding the ceiling aborts the execution with
    /// [`AlgoLensError::ResourceExceeded`].
    pub const MAX_STEPS: usize = 10_000;

    /// Create a new recorder with an empty trace and a fresh clock
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            step_count: 0,
            started: Instant::now(),
            metadata: Map::new(),
        }
    }

    /// Clear all recorded state and restart the clock
    ///
    /// Called by tracers at the start of `execute` so re-invoking the same
    /// instance replaces the previous trace rather than appending to it.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.step_count = 0;
        self.metadata.clear();
        self.started = Instant::now();
    }

    /// Append a new step to the trace
    ///
    /// Enforces the [`MAX_STEPS`](Self::MAX_STEPS) ceiling, stamps the
    /// ordinal and relative timestamp, and merges a non-empty
    /// `visualization` snapshot into the payload under the reserved
    /// `"visualization"` key. An empty snapshot leaves the payload
    /// untouched, keeping steps lightweight for tracers with no
    /// enrichment story.
    pub fn record(
        &mut self,
        kind: &str,
        mut data: Map<String, Value>,
        visualization: Map<String, Value>,
        description: impl Into<String>,
    ) -> Result<()> {
        if self.step_count >= Self::MAX_STEPS {
            return Err(AlgoLensError::ResourceExceeded { max: Self::MAX_STEPS });
        }

        if !visualization.is_empty() {
            data.insert("visualization".to_string(), Value::Object(visualization));
        }

        let step = TraceStep {
            step: self.step_count,
            kind: kind.to_string(),
            timestamp: self.started.elapsed().as_secs_f64(),
            data,
            description: description.into(),
        };

        debug!(step = step.step, kind = %step.kind, "recorded trace step");

        self.steps.push(step);
        self.step_count += 1;
        Ok(())
    }

    /// The steps recorded so far, in emission order
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Number of steps recorded so far
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Seconds elapsed since construction (or the last reset)
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Metadata map set by the concrete algorithm
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Mutable access to the metadata map
    pub fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.metadata
    }

    /// Replace the metadata map wholesale
    ///
    /// The map must carry at least an `algorithm` identifier and a
    /// `display_name` before the envelope is built.
    pub fn set_metadata(&mut self, metadata: Map<String, Value>) {
        self.metadata = metadata;
    }

    /// Assemble the standardized envelope for one execution
    ///
    /// Copies the current step list, counts steps, computes the total
    /// duration (now minus construction), merges the metadata, and injects
    /// the given prediction points. Pure with respect to recorder state:
    /// callable multiple times on the same finished trace.
    pub fn build(&self, result: Value, prediction_points: Vec<PredictionPoint>) -> TraceEnvelope {
        let mut fields = self.metadata.clone();
        // prediction_points is a reserved metadata key owned by the core
        fields.remove("prediction_points");

        TraceEnvelope {
            result,
            trace: Trace {
                total_steps: self.steps.len(),
                duration: self.started.elapsed().as_secs_f64(),
                steps: self.steps.clone(),
            },
            metadata: TraceMetadata {
                fields,
                prediction_points,
            },
        }
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a value into a JSON-safe representation
///
/// Positive and negative infinity (and NaN) become `null`, since the
/// transport format cannot represent them; integers, strings, booleans,
/// null, lists, and mappings of such values pass through unchanged. Used
/// by concrete tracers before embedding domain values (e.g. an unbounded
/// initial coverage sentinel) into a step payload.
pub fn sanitize<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
