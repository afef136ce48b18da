//! Two-pointer tracer (in-place deduplication of a sorted array)
//!
//! Maintains a slow (write) pointer and a fast (read) pointer. Each
//! iteration emits a COMPARE step showing the state before the action,
//! then either a HANDLE_DUPLICATE step (advance fast only) or a
//! HANDLE_UNIQUE step (advance slow, copy the value, advance fast)
//! showing the state after it. Element classification is derived purely
//! from the pointer positions at the time of the query.
//!
//! Prediction points ask: when the fast pointer sees a value, should it
//! be kept or skipped?

use crate::error::{AlgoLensError, Result};
use crate::trace::{
    to_object, AlgorithmTracer, PredictionChoice, PredictionPoint, TraceEnvelope, TraceRecorder,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

#[derive(Deserialize)]
struct TwoPointerInput {
    array: Vec<i64>,
}

/// Tracer for the two-pointer array-deduplication pattern
pub struct TwoPointerTracer {
    recorder: TraceRecorder,
    array: Vec<i64>,
    original_array: Vec<i64>,
    slow: usize,
    fast: usize,
    is_complete: bool,
}

impl TwoPointerTracer {
    pub fn new() -> Self {
        Self {
            recorder: TraceRecorder::new(),
            array: Vec::new(),
            original_array: Vec::new(),
            slow: 0,
            fast: 1,
            is_complete: false,
        }
    }

    fn reset(&mut self) {
        self.recorder.reset();
        self.array.clear();
        self.original_array.clear();
        self.slow = 0;
        self.fast = 1;
        self.is_complete = false;
    }

    /// Visual state of one array element, derived from the pointers.
    /// Once the run is complete, an element's state depends only on
    /// whether its index precedes the final slow-pointer boundary.
    fn element_state(&self, index: usize) -> &'static str {
        if self.is_complete {
            return if index < self.slow + 1 { "unique" } else { "stale" };
        }

        if index <= self.slow {
            "unique"
        } else if index < self.fast {
            "duplicate"
        } else if index == self.fast {
            "examining"
        } else {
            "pending"
        }
    }

    fn prediction_explanation(slow_val: i64, fast_val: i64, answer: &str) -> Option<String> {
        match answer {
            "skip" => Some(format!(
                "Since {} == {}, it's a duplicate. We only move the fast pointer to check the next element.",
                fast_val, slow_val
            )),
            "keep" => Some(format!(
                "Since {} != {}, it's a new unique element. We move the slow pointer, copy the value, and then move the fast pointer.",
                fast_val, slow_val
            )),
            _ => None,
        }
    }
}

impl Default for TwoPointerTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmTracer for TwoPointerTracer {
    fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    fn recorder_mut(&mut self) -> &mut TraceRecorder {
        &mut self.recorder
    }

    fn execute(&mut self, input: Value) -> Result<TraceEnvelope> {
        let input: TwoPointerInput = serde_json::from_value(input).map_err(|e| {
            AlgoLensError::Validation(format!("expected an object with an 'array' key: {}", e))
        })?;

        if input.array.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(AlgoLensError::Validation(
                "Array must be sorted in ascending order.".to_string(),
            ));
        }

        self.reset();
        self.original_array = input.array.clone();
        self.array = input.array;

        info!(len = self.array.len(), "executing two-pointer deduplication");

        self.recorder.set_metadata(to_object(json!({
            "algorithm": "two-pointer",
            "display_name": "Two Pointer Pattern",
            "visualization_type": "array",
            "input_size": self.array.len(),
            "visualization_config": {"pointer_colors": {"slow": "blue", "fast": "red"}},
        })));

        if self.array.is_empty() {
            self.emit_step("INITIAL_STATE", Map::new(), "Array is empty, 0 unique elements.")?;
            return Ok(self.build_envelope(json!({"unique_count": 0, "final_array": []})));
        }

        if self.array.len() == 1 {
            self.is_complete = true;
            self.emit_step("INITIAL_STATE", Map::new(), "Array has one element, which is unique.")?;
            return Ok(self.build_envelope(json!({"unique_count": 1, "final_array": &self.array})));
        }

        self.emit_step(
            "INITIAL_STATE",
            Map::new(),
            "Start: slow pointer at index 0, fast pointer at index 1.",
        )?;

        while self.fast < self.array.len() {
            let slow_val = self.array[self.slow];
            let fast_val = self.array[self.fast];

            // Decision first: this step shows the state before the action
            self.emit_step(
                "COMPARE",
                to_object(json!({
                    "slow_index": self.slow, "slow_value": slow_val,
                    "fast_index": self.fast, "fast_value": fast_val,
                })),
                format!("Compare arr[fast] ({}) with arr[slow] ({}).", fast_val, slow_val),
            )?;

            // Consequence second: this step shows the state after it
            if fast_val == slow_val {
                let old_fast = self.fast;
                self.fast += 1;
                self.emit_step(
                    "HANDLE_DUPLICATE",
                    to_object(json!({
                        "comparison": format!("{} == {}", fast_val, slow_val),
                        "action": format!("Increment fast pointer from {} to {}", old_fast, self.fast),
                    })),
                    "Duplicate found. Moving fast pointer.",
                )?;
            } else {
                let old_fast = self.fast;
                self.slow += 1;
                self.array[self.slow] = fast_val;
                self.fast += 1;

                self.emit_step(
                    "HANDLE_UNIQUE",
                    to_object(json!({
                        "comparison": format!("{} != {}", fast_val, slow_val),
                        "source_index": old_fast, "dest_index": self.slow, "value": fast_val,
                        "action": format!(
                            "Increment slow to {}, copy value, increment fast to {}",
                            self.slow, self.fast
                        ),
                    })),
                    format!("New unique element found. Placed {} at index {}.", fast_val, self.slow),
                )?;
            }
        }

        self.is_complete = true;
        let unique_count = self.slow + 1;
        let final_array: Vec<i64> = self.array[..unique_count].to_vec();

        self.emit_step(
            "ALGORITHM_COMPLETE",
            to_object(json!({"unique_count": unique_count, "final_array_slice": final_array})),
            format!("Complete! Found {} unique elements.", unique_count),
        )?;

        Ok(self.build_envelope(json!({
            "unique_count": unique_count,
            "final_array": final_array,
        })))
    }

    fn prediction_points(&self) -> Vec<PredictionPoint> {
        let steps = self.recorder.steps();
        let mut predictions = Vec::new();

        for (i, step) in steps.iter().enumerate() {
            if step.kind != "COMPARE" {
                continue;
            }
            let Some(next_step) = steps.get(i + 1) else { continue };

            let correct_answer = match next_step.kind.as_str() {
                "HANDLE_DUPLICATE" => "skip",
                "HANDLE_UNIQUE" => "keep",
                _ => continue,
            };

            let slow_val = step.data["slow_value"].as_i64().unwrap_or_default();
            let fast_val = step.data["fast_value"].as_i64().unwrap_or_default();

            predictions.push(PredictionPoint {
                step_index: i,
                question: format!(
                    "The fast pointer sees value ({}) and the last unique value is ({}). What happens next?",
                    fast_val, slow_val
                ),
                choices: vec![
                    PredictionChoice::new("keep", "Keep: New unique element found."),
                    PredictionChoice::new("skip", "Skip: Duplicate element found."),
                ],
                hint: Some(format!("Compare {} and {}. Are they equal?", fast_val, slow_val)),
                correct_answer: correct_answer.to_string(),
                explanation: Self::prediction_explanation(slow_val, fast_val, correct_answer),
            });
        }

        predictions
    }

    fn visualization_state(&self) -> Map<String, Value> {
        if self.array.is_empty() {
            return Map::new();
        }

        let fast: Value = if self.fast < self.array.len() && !self.is_complete {
            json!(self.fast)
        } else {
            Value::Null
        };

        to_object(json!({
            "array": self
                .array
                .iter()
                .enumerate()
                .map(|(i, v)| json!({"index": i, "value": v, "state": self.element_state(i)}))
                .collect::<Vec<_>>(),
            "pointers": {"slow": self.slow, "fast": fast},
            "metrics": {"unique_count": self.slow + 1},
        }))
    }

    fn narrative(&self, envelope: &TraceEnvelope) -> Option<String> {
        Some(render_narrative(envelope))
    }
}

/// ASCII rendering of one array snapshot for the narrative: index row,
/// value row, state row, and a pointer row underneath.
fn render_array_state(viz: &Value) -> String {
    let Some(array) = viz["array"].as_array() else {
        return "Array is empty.\n".to_string();
    };

    let pointers = &viz["pointers"];
    let col_width = array
        .iter()
        .map(|e| e["value"].to_string().len().max(e["index"].to_string().len()))
        .max()
        .unwrap_or(2)
        .max(9);

    fn state_name(state: &str) -> &str {
        match state {
            "unique" => "Unique",
            "duplicate" => "Duplicate",
            "examining" => "Examining",
            "pending" => "Pending",
            "stale" => "Stale",
            other => other,
        }
    }

    let mut s = format!("{:<10}", "Index:");
    for elem in array {
        s.push_str(&format!("{:<width$} ", elem["index"].to_string(), width = col_width));
    }
    s.push('\n');

    s.push_str(&format!("{:<10}", "Value:"));
    for elem in array {
        s.push_str(&format!("{:<width$} ", elem["value"].to_string(), width = col_width));
    }
    s.push('\n');

    s.push_str(&format!("{:<10}", "State:"));
    for elem in array {
        let state = elem["state"].as_str().unwrap_or_default();
        s.push_str(&format!("{:<width$} ", state_name(state), width = col_width));
    }
    s.push('\n');

    let mut pointer_line = " ".repeat(10);
    for i in 0..array.len() {
        let mut p = String::new();
        if pointers["slow"] == json!(i) {
            p.push('S');
        }
        if pointers["fast"] == json!(i) {
            p.push('F');
        }
        pointer_line.push_str(&format!("{:<width$} ", p, width = col_width));
    }
    // Show the fast pointer once it has moved past the last element
    if pointers["fast"] == json!(array.len()) {
        pointer_line.push('F');
    }
    s.push_str(pointer_line.trim_end());
    s.push('\n');
    s
}

/// Markdown narrative consolidating each compare/handle pair into one
/// pedagogical step.
fn render_narrative(envelope: &TraceEnvelope) -> String {
    let steps = &envelope.trace.steps;
    let result = &envelope.result;

    let mut narrative = String::from("# Two Pointer Pattern: Array Deduplication\n\n");
    narrative.push_str(
        "**Goal:** Remove duplicates in-place and find the count of unique elements.\n",
    );
    narrative.push_str(&format!(
        "**Result:** Found **{}** unique elements. Final unique array: `{}`\n\n---\n\n",
        result["unique_count"], result["final_array"]
    ));

    let mut i = 0;
    let mut step_counter = 0;
    while i < steps.len() {
        let step = &steps[i];

        match step.kind.as_str() {
            "INITIAL_STATE" => {
                narrative.push_str(&format!("## Step {}: {}\n\n", step_counter, step.description));
                if let Some(viz) = step.data.get("visualization") {
                    narrative.push_str("**Initial Array State:**\n```\n");
                    narrative.push_str(&render_array_state(viz));
                    narrative.push_str("```\n");
                }
                narrative.push_str("---\n\n");
                i += 1;
                step_counter += 1;
            }
            "COMPARE" if i + 1 < steps.len() => {
                let action = &steps[i + 1];
                let slow_val = &step.data["slow_value"];
                let fast_val = &step.data["fast_value"];

                narrative.push_str(&format!(
                    "## Step {}: Compare `arr[{}]` and `arr[{}]`\n\n",
                    step_counter, step.data["fast_index"], step.data["slow_index"]
                ));
                narrative.push_str("**State Before Comparison:**\n```\n");
                narrative.push_str(&render_array_state(&step.data["visualization"]));
                narrative.push_str("```\n");

                match action.kind.as_str() {
                    "HANDLE_DUPLICATE" => {
                        narrative.push_str(&format!(
                            "**Result:** `{} == {}`. This is a **duplicate**.\n\
                             **Action:** Increment the `fast` pointer to scan the next element.\n\n",
                            fast_val, slow_val
                        ));
                    }
                    "HANDLE_UNIQUE" => {
                        narrative.push_str(&format!(
                            "**Result:** `{} != {}`. This is a **new unique element**.\n\
                             **Action:** Copy value `{}` from index `{}` to index `{}`, then advance both pointers.\n\n",
                            fast_val, slow_val, fast_val,
                            action.data["source_index"], action.data["dest_index"]
                        ));
                    }
                    _ => {}
                }
                narrative.push_str("**State After Action:**\n```\n");
                narrative.push_str(&render_array_state(&action.data["visualization"]));
                narrative.push_str("```\n---\n\n");

                i += 2;
                step_counter += 1;
            }
            "ALGORITHM_COMPLETE" => {
                narrative.push_str(&format!("## Step {}: {}\n\n", step_counter, step.description));
                narrative.push_str(
                    "The `fast` pointer has reached the end of the array. The algorithm is complete.\n\n",
                );
                narrative.push_str("**Final Array State:**\n```\n");
                narrative.push_str(&render_array_state(&step.data["visualization"]));
                narrative.push_str(&format!(
                    "```\n**Final Unique Array Slice:** `{}`\n**Total Unique Elements:** `{}`\n\n",
                    step.data["final_array_slice"], step.data["unique_count"]
                ));
                i += 1;
                step_counter += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    narrative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates_sorted_array() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2, 2, 3]})).unwrap();

        assert_eq!(envelope.result["unique_count"], json!(3));
        assert_eq!(envelope.result["final_array"], json!([1, 2, 3]));
    }

    #[test]
    fn test_single_element_has_only_initial_step() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [5]})).unwrap();

        assert_eq!(envelope.result["unique_count"], json!(1));
        assert_eq!(envelope.result["final_array"], json!([5]));
        assert_eq!(envelope.trace.total_steps, 1);
        assert_eq!(envelope.trace.steps[0].kind, "INITIAL_STATE");
    }

    #[test]
    fn test_empty_array() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": []})).unwrap();

        assert_eq!(envelope.result["unique_count"], json!(0));
        assert_eq!(envelope.result["final_array"], json!([]));
        // Empty viz state means the initial step is left unenriched
        assert!(!envelope.trace.steps[0].data.contains_key("visualization"));
    }

    #[test]
    fn test_unsorted_array_fails_before_any_step() {
        let mut tracer = TwoPointerTracer::new();
        let err = tracer.execute(json!({"array": [3, 1, 2]})).unwrap_err();

        match err {
            AlgoLensError::Validation(msg) => {
                assert_eq!(msg, "Array must be sorted in ascending order.")
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
        assert_eq!(tracer.recorder().step_count(), 0);
    }

    #[test]
    fn test_missing_array_key_fails_validation() {
        let mut tracer = TwoPointerTracer::new();
        let err = tracer.execute(json!({"values": [1, 2]})).unwrap_err();
        assert!(matches!(err, AlgoLensError::Validation(_)));
    }

    #[test]
    fn test_compare_is_followed_by_handle_step() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2]})).unwrap();

        let kinds: Vec<&str> = envelope.trace.steps.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "INITIAL_STATE",
                "COMPARE",
                "HANDLE_DUPLICATE",
                "COMPARE",
                "HANDLE_UNIQUE",
                "ALGORITHM_COMPLETE",
            ]
        );
    }

    #[test]
    fn test_element_states_during_scan() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2, 2, 3]})).unwrap();

        // After the first HANDLE_DUPLICATE: slow=0, fast=2
        let step = &envelope.trace.steps[2];
        assert_eq!(step.kind, "HANDLE_DUPLICATE");
        let array = step.data["visualization"]["array"].as_array().unwrap();
        assert_eq!(array[0]["state"], json!("unique"));
        assert_eq!(array[1]["state"], json!("duplicate"));
        assert_eq!(array[2]["state"], json!("examining"));
        assert_eq!(array[3]["state"], json!("pending"));
    }

    #[test]
    fn test_final_states_split_at_slow_boundary() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2, 2, 3]})).unwrap();

        let last = envelope.trace.steps.last().unwrap();
        assert_eq!(last.kind, "ALGORITHM_COMPLETE");
        let viz = &last.data["visualization"];
        let array = viz["array"].as_array().unwrap();

        for elem in &array[..3] {
            assert_eq!(elem["state"], json!("unique"));
        }
        for elem in &array[3..] {
            assert_eq!(elem["state"], json!("stale"));
        }
        // The fast pointer has run off the end
        assert_eq!(viz["pointers"]["fast"], Value::Null);
    }

    #[test]
    fn test_prediction_points_keep_and_skip() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2]})).unwrap();

        let points = &envelope.metadata.prediction_points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].correct_answer, "skip");
        assert_eq!(points[1].correct_answer, "keep");

        for point in points {
            assert_eq!(envelope.trace.steps[point.step_index].kind, "COMPARE");
            assert!(point.hint.is_some());
            assert!(point.explanation.is_some());
        }
    }

    #[test]
    fn test_all_unique_array() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 2, 3]})).unwrap();

        assert_eq!(envelope.result["unique_count"], json!(3));
        assert_eq!(envelope.result["final_array"], json!([1, 2, 3]));
    }

    #[test]
    fn test_reexecution_resets_state() {
        let mut tracer = TwoPointerTracer::new();
        let first = tracer.execute(json!({"array": [1, 1, 2, 2, 3]})).unwrap();
        let second = tracer.execute(json!({"array": [1, 1, 2, 2, 3]})).unwrap();

        assert_eq!(first.trace.total_steps, second.trace.total_steps);
        assert_eq!(second.result["unique_count"], json!(3));
    }

    #[test]
    fn test_narrative_state_rows_use_display_labels() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2, 2, 3]})).unwrap();
        let narrative = tracer.narrative(&envelope).unwrap();

        // Mid-scan snapshots show every classification; the final snapshot
        // shows the unique/stale split.
        for label in ["Unique", "Duplicate", "Examining", "Pending", "Stale"] {
            assert!(narrative.contains(label), "missing state label {}", label);
        }
    }

    #[test]
    fn test_narrative_renders_markdown() {
        let mut tracer = TwoPointerTracer::new();
        let envelope = tracer.execute(json!({"array": [1, 1, 2]})).unwrap();
        let narrative = tracer.narrative(&envelope).unwrap();

        assert!(narrative.starts_with("# Two Pointer Pattern: Array Deduplication"));
        assert!(narrative.contains("**State Before Comparison:**"));
        assert!(narrative.contains("duplicate"));
        assert!(narrative.contains("Total Unique Elements"));
    }
}
