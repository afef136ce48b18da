//! Core tracing framework for instrumented algorithm execution
//!
//! Every concrete algorithm tracer drives the same small recording core.
//! During execution the tracer emits one step per decision point; each step
//! is enriched with a point-in-time visualization snapshot and appended to
//! the recorder. When the algorithm finishes, the recorder assembles a
//! standardized envelope holding the algorithm result, the full step
//! sequence, and metadata (including auto-derived prediction points for
//! interactive quizzing).
//!
//! # Architecture
//!
//! - **TraceStep**: one immutable recorded event (ordinal, category tag,
//!   payload, description, relative timestamp)
//! - **TraceRecorder**: step storage with a hard step-count ceiling,
//!   timestamp derivation, and envelope assembly
//! - **AlgorithmTracer**: the contract every concrete algorithm satisfies —
//!   `execute`, `prediction_points`, and the visualization-state hook
//! - **TraceEnvelope**: the standardized result structure handed to the
//!   HTTP layer, JSON-serializable end to end
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use algolens::prelude::*;
//! use serde_json::json;
//!
//! let mut tracer = TwoPointerTracer::new();
//! let envelope = tracer.execute(json!({"array": [1, 1, 2, 2, 3]}))?;
//!
//! assert_eq!(envelope.trace.total_steps, envelope.trace.steps.len());
//! for point in &envelope.metadata.prediction_points {
//!     println!("{}", point.question);
//! }
//! ```

pub mod envelope;
pub mod recorder;
pub mod step;
pub mod tracer;

// Re-export main types
pub use envelope::{
    PredictionChoice, PredictionPoint, Trace, TraceEnvelope, TraceMetadata,
};
pub use recorder::{sanitize, TraceRecorder};
pub use step::TraceStep;
pub use tracer::AlgorithmTracer;

use serde_json::{Map, Value};

/// Coerce a JSON value into an object map for use as step data.
///
/// Objects pass through, `null` becomes an empty map, and any other value
/// is wrapped under a `"value"` key so call sites can pass `json!` literals
/// directly.
pub fn to_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_object_passes_objects_through() {
        let map = to_object(json!({"a": 1, "b": "two"}));
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], json!(1));
    }

    #[test]
    fn test_to_object_null_is_empty() {
        assert!(to_object(Value::Null).is_empty());
    }

    #[test]
    fn test_to_object_wraps_scalars() {
        let map = to_object(json!(42));
        assert_eq!(map["value"], json!(42));
    }
}
