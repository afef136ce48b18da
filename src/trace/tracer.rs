//! The recording contract satisfied by every concrete algorithm tracer
//!
//! The original abstract-base design ("every tracer must supply `execute`
//! and the prediction-point scan") maps onto a trait with two required
//! operations plus recorder accessors; conformance is checked at compile
//! time rather than at construction time. Concrete tracers own a
//! [`TraceRecorder`] by composition and drive it through the provided
//! [`emit_step`](AlgorithmTracer::emit_step) and
//! [`build_envelope`](AlgorithmTracer::build_envelope) methods.

use super::envelope::{PredictionPoint, TraceEnvelope};
use super::recorder::TraceRecorder;
use crate::error::Result;
use serde_json::{Map, Value};

/// Contract for instrumented algorithm execution
///
/// A tracer instance is intended for exactly one execution: it owns its
/// mutable state exclusively and is never shared across concurrent
/// executions. Implementations must reset their transient state (the
/// recorder plus any algorithm bookkeeping) at the start of `execute`, so
/// re-invoking an instance replaces the previous trace instead of
/// appending to it.
pub trait AlgorithmTracer {
    /// The recorder holding this tracer's trace state
    fn recorder(&self) -> &TraceRecorder;

    /// Mutable access to the recorder
    fn recorder_mut(&mut self) -> &mut TraceRecorder;

    /// Validate the input, run the algorithm emitting steps throughout,
    /// and return the standardized envelope
    ///
    /// Must set the metadata map (at minimum `algorithm` and
    /// `display_name`) before building the envelope. Fails with
    /// [`AlgoLensError::Validation`] before any step is emitted when the
    /// input violates preconditions, and with
    /// [`AlgoLensError::ResourceExceeded`] if the step ceiling is breached
    /// mid-execution.
    ///
    /// [`AlgoLensError::Validation`]: crate::error::AlgoLensError::Validation
    /// [`AlgoLensError::ResourceExceeded`]: crate::error::AlgoLensError::ResourceExceeded
    fn execute(&mut self, input: Value) -> Result<TraceEnvelope>;

    /// Scan the accumulated step sequence and synthesize quiz items
    ///
    /// Typically looks for a decision-eligible step immediately followed
    /// by an outcome step and emits one item per such pair. Must not
    /// mutate the step sequence; may return an empty list.
    fn prediction_points(&self) -> Vec<PredictionPoint>;

    /// Snapshot the point-in-time visual state (pointer positions, element
    /// classifications, call-stack contents)
    ///
    /// Called once per [`emit_step`](Self::emit_step); a non-empty result
    /// is attached to the step payload under the reserved
    /// `"visualization"` key. The default returns an empty map, meaning no
    /// enrichment.
    fn visualization_state(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Append a step, merging in the visualization-state hook result
    fn emit_step(
        &mut self,
        kind: &str,
        data: Map<String, Value>,
        description: impl Into<String>,
    ) -> Result<()>
    where
        Self: Sized,
    {
        let visualization = self.visualization_state();
        self.recorder_mut().record(kind, data, visualization, description)
    }

    /// Build the final envelope from the current trace state
    ///
    /// Callable multiple times; each call re-derives the prediction points
    /// from the current steps.
    fn build_envelope(&self, result: Value) -> TraceEnvelope {
        self.recorder().build(result, self.prediction_points())
    }

    /// Render a finished envelope as markdown prose
    ///
    /// Optional per tracer; a pure consumer of the envelope structure. The
    /// default declines.
    fn narrative(&self, _envelope: &TraceEnvelope) -> Option<String> {
        None
    }
}
