//! The immutable step record
//!
//! A [`TraceStep`] is one atomic, recorded event during an algorithm's
//! execution. Steps are created only through [`TraceRecorder::record`]
//! and never mutated after they are appended to a trace.
//!
//! [`TraceRecorder::record`]: super::recorder::TraceRecorder::record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One instrumented event in an algorithm's execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Zero-based ordinal position within the trace, assigned at emission
    /// time and never reused
    pub step: usize,
    /// Short tag identifying the kind of event (open vocabulary, defined
    /// per algorithm: "INITIAL_STATE", "COMPARE", "DECISION_MADE", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Seconds since the tracer was constructed; non-decreasing across a trace
    pub timestamp: f64,
    /// Algorithm-specific payload, JSON-safe. When the owning tracer
    /// reports visualization state, it appears here under the reserved
    /// `"visualization"` key.
    pub data: Map<String, Value>,
    /// Short human-readable sentence describing the event
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_step() -> TraceStep {
        TraceStep {
            step: 0,
            kind: "TEST_STEP".to_string(),
            timestamp: 0.001,
            data: match json!({"test": "data"}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            },
            description: "Test step description".to_string(),
        }
    }

    #[test]
    fn test_step_fields() {
        let step = sample_step();
        assert_eq!(step.step, 0);
        assert_eq!(step.kind, "TEST_STEP");
        assert_eq!(step.timestamp, 0.001);
        assert_eq!(step.data["test"], json!("data"));
        assert_eq!(step.description, "Test step description");
    }

    #[test]
    fn test_step_serializes_kind_as_type() {
        let step = sample_step();
        let value = serde_json::to_value(&step).unwrap();

        assert_eq!(value["type"], json!("TEST_STEP"));
        assert_eq!(value["step"], json!(0));
        assert_eq!(value["data"]["test"], json!("data"));
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_step_round_trips() {
        let step = sample_step();
        let json = serde_json::to_string(&step).unwrap();
        let back: TraceStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
    }
}
