//! The standardized trace-result envelope
//!
//! Every execution of a concrete tracer returns exactly one
//! [`TraceEnvelope`]: the algorithm result, the full step sequence with
//! count and duration, and the tracer-set metadata with the derived list
//! of prediction points injected. The envelope is plain data, safe for
//! JSON encoding, and is the only structure that crosses the boundary to
//! the HTTP layer.

use super::step::TraceStep;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The return value of one algorithm execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEnvelope {
    /// Algorithm-defined output
    pub result: Value,
    /// The recorded step sequence with summary figures
    pub trace: Trace,
    /// Tracer-set fields plus the injected prediction points
    pub metadata: TraceMetadata,
}

/// The step list and its summary figures
///
/// Invariant: `total_steps == steps.len()` always.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
    pub total_steps: usize,
    /// Total execution duration in seconds (envelope build time minus
    /// tracer construction time)
    pub duration: f64,
}

/// Envelope metadata: free-form tracer fields plus prediction points
///
/// The tracer-set fields must include at least an `algorithm` identifier
/// and a `display_name`. `prediction_points` is always present, possibly
/// empty, regardless of whether the concrete tracer defines any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMetadata {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub prediction_points: Vec<PredictionPoint>,
}

/// A derived quiz item referencing a specific step
///
/// Produced by inspecting the already-completed step sequence (looking
/// across adjacent steps), never stored as core state: each envelope
/// build regenerates the list from the current steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Index of the step the viewer is asked to predict from
    pub step_index: usize,
    pub question: String,
    pub choices: Vec<PredictionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Token matching the `id` of the correct choice
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// One labeled answer choice for a prediction point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionChoice {
    pub id: String,
    pub label: String,
}

impl PredictionChoice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
