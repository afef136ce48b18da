//! Binary search tracer
//!
//! Classic halving search over a sorted array. Every iteration emits a
//! CALCULATE_MID step, a COMPARE step, and then the outcome step
//! (TARGET_FOUND, SEARCH_LEFT, or SEARCH_RIGHT), so the viewer can replay
//! each elimination decision. Prediction points ask which way the search
//! will move after each comparison.

use crate::error::{AlgoLensError, Result};
use crate::trace::{
    to_object, AlgorithmTracer, PredictionChoice, PredictionPoint, TraceEnvelope, TraceRecorder,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

#[derive(Deserialize)]
struct BinarySearchInput {
    array: Vec<i64>,
    target: i64,
}

/// Tracer for binary search over a sorted array
pub struct BinarySearchTracer {
    recorder: TraceRecorder,
    array: Vec<i64>,
    target: i64,
    low: usize,
    high: isize,
    mid: Option<usize>,
    found_index: Option<usize>,
    is_complete: bool,
}

impl BinarySearchTracer {
    pub fn new() -> Self {
        Self {
            recorder: TraceRecorder::new(),
            array: Vec::new(),
            target: 0,
            low: 0,
            high: -1,
            mid: None,
            found_index: None,
            is_complete: false,
        }
    }

    fn reset(&mut self) {
        self.recorder.reset();
        self.array.clear();
        self.target = 0;
        self.low = 0;
        self.high = -1;
        self.mid = None;
        self.found_index = None;
        self.is_complete = false;
    }

    /// Visual state of one element, derived from the current window.
    fn element_state(&self, index: usize) -> &'static str {
        if Some(index) == self.found_index {
            return "found";
        }
        if self.is_complete {
            return "eliminated";
        }
        if Some(index) == self.mid {
            "mid"
        } else if index >= self.low && (index as isize) <= self.high {
            "active"
        } else {
            "eliminated"
        }
    }
}

impl Default for BinarySearchTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmTracer for BinarySearchTracer {
    fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    fn recorder_mut(&mut self) -> &mut TraceRecorder {
        &mut self.recorder
    }

    fn execute(&mut self, input: Value) -> Result<TraceEnvelope> {
        let input: BinarySearchInput = serde_json::from_value(input).map_err(|e| {
            AlgoLensError::Validation(format!(
                "expected an object with 'array' and 'target' keys: {}",
                e
            ))
        })?;

        if input.array.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(AlgoLensError::Validation(
                "Array must be sorted in ascending order.".to_string(),
            ));
        }

        self.reset();
        self.array = input.array;
        self.target = input.target;
        self.high = self.array.len() as isize - 1;

        info!(len = self.array.len(), target = self.target, "executing binary search");

        self.recorder.set_metadata(to_object(json!({
            "algorithm": "binary-search",
            "display_name": "Binary Search",
            "visualization_type": "array",
            "input_size": self.array.len(),
            "visualization_config": {"highlight_mid": true, "show_bounds": true},
        })));

        self.emit_step(
            "INITIAL_STATE",
            to_object(json!({
                "array": self.array.clone(),
                "target": self.target,
                "low": self.low,
                "high": self.high,
            })),
            format!(
                "Searching for {} in a sorted array of {} elements.",
                self.target,
                self.array.len()
            ),
        )?;

        while self.low as isize <= self.high {
            let low = self.low;
            let high = self.high as usize;
            let mid = low + (high - low) / 2;
            self.mid = Some(mid);

            self.emit_step(
                "CALCULATE_MID",
                to_object(json!({"low": low, "high": high, "mid": mid})),
                format!("Midpoint of window [{}..{}] is index {}.", low, high, mid),
            )?;

            let mid_value = self.array[mid];
            self.emit_step(
                "COMPARE",
                to_object(json!({
                    "mid_index": mid,
                    "mid_value": mid_value,
                    "target": self.target,
                })),
                format!("Compare arr[{}] ({}) with target ({}).", mid, mid_value, self.target),
            )?;

            if mid_value == self.target {
                self.found_index = Some(mid);
                self.is_complete = true;
                self.emit_step(
                    "TARGET_FOUND",
                    to_object(json!({"index": mid, "value": mid_value})),
                    format!("Target {} found at index {}.", self.target, mid),
                )?;
                break;
            } else if mid_value < self.target {
                self.low = mid + 1;
                self.mid = None;
                self.emit_step(
                    "SEARCH_RIGHT",
                    to_object(json!({
                        "comparison": format!("{} < {}", mid_value, self.target),
                        "new_low": self.low,
                    })),
                    format!(
                        "{} < {}: the target can only be right of the midpoint. Eliminating the left half.",
                        mid_value, self.target
                    ),
                )?;
            } else {
                self.high = mid as isize - 1;
                self.mid = None;
                self.emit_step(
                    "SEARCH_LEFT",
                    to_object(json!({
                        "comparison": format!("{} > {}", mid_value, self.target),
                        "new_high": self.high,
                    })),
                    format!(
                        "{} > {}: the target can only be left of the midpoint. Eliminating the right half.",
                        mid_value, self.target
                    ),
                )?;
            }
        }

        if self.found_index.is_none() {
            self.is_complete = true;
            self.mid = None;
            self.emit_step(
                "TARGET_NOT_FOUND",
                to_object(json!({"target": self.target})),
                format!("Search window is empty: {} is not in the array.", self.target),
            )?;
        }

        self.emit_step(
            "ALGORITHM_COMPLETE",
            to_object(json!({
                "found": self.found_index.is_some(),
                "index": self.found_index,
            })),
            match self.found_index {
                Some(index) => format!("Complete! Target found at index {}.", index),
                None => "Complete! Target is not present.".to_string(),
            },
        )?;

        Ok(self.build_envelope(json!({
            "found": self.found_index.is_some(),
            "index": self.found_index,
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
                "TARGET_FOUND" => "found",
                "SEARCH_LEFT" => "left",
                "SEARCH_RIGHT" => "right",
                _ => continue,
            };

            let mid_value = &step.data["mid_value"];
            let target = &step.data["target"];

            predictions.push(PredictionPoint {
                step_index: i,
                question: format!(
                    "The midpoint value is {} and the target is {}. Where does the search go next?",
                    mid_value, target
                ),
                choices: vec![
                    PredictionChoice::new("left", "Left half: midpoint is too large."),
                    PredictionChoice::new("right", "Right half: midpoint is too small."),
                    PredictionChoice::new("found", "Nowhere: the midpoint is the target."),
                ],
                hint: Some(format!("Compare {} with {}.", mid_value, target)),
                correct_answer: correct_answer.to_string(),
                explanation: None,
            });
        }

        predictions
    }

    fn visualization_state(&self) -> Map<String, Value> {
        if self.array.is_empty() {
            return Map::new();
        }

        to_object(json!({
            "array": self
                .array
                .iter()
                .enumerate()
                .map(|(i, v)| json!({"index": i, "value": v, "state": self.element_state(i)}))
                .collect::<Vec<_>>(),
            "pointers": {
                "low": self.low,
                "mid": self.mid,
                "high": if self.high >= 0 { json!(self.high) } else { Value::Null },
            },
        }))
    }

    fn narrative(&self, envelope: &TraceEnvelope) -> Option<String> {
        Some(render_narrative(envelope))
    }
}

/// ASCII rendering of one search-window snapshot: index row, value row,
/// state row, and a low/mid/high pointer row underneath.
fn render_array_state(viz: &Value) -> String {
    let Some(array) = viz["array"].as_array() else {
        return "Array is empty.\n".to_string();
    };

    fn state_name(state: &str) -> &str {
        match state {
            "found" => "Found",
            "mid" => "Mid",
            "active" => "Active",
            "eliminated" => "Elim",
            other => other,
        }
    }

    let pointers = &viz["pointers"];
    let col_width = array
        .iter()
        .map(|e| e["value"].to_string().len().max(e["index"].to_string().len()))
        .max()
        .unwrap_or(2)
        .max(6);

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
        if pointers["low"] == json!(i) {
            p.push('L');
        }
        if pointers["mid"] == json!(i) {
            p.push('M');
        }
        if pointers["high"] == json!(i) {
            p.push('H');
        }
        pointer_line.push_str(&format!("{:<width$} ", p, width = col_width));
    }
    s.push_str(pointer_line.trim_end());
    s.push('\n');
    s
}

/// Markdown narrative consolidating each calculate/compare/outcome triple
/// into one pedagogical step.
fn render_narrative(envelope: &TraceEnvelope) -> String {
    let steps = &envelope.trace.steps;
    let result = &envelope.result;

    let mut narrative = String::from("# Binary Search Execution Narrative\n\n");
    narrative.push_str(
        "**Goal:** Locate the target in a sorted array by halving the search window.\n",
    );
    if result["found"] == json!(true) {
        narrative.push_str(&format!(
            "**Result:** Target found at index `{}`.\n\n---\n\n",
            result["index"]
        ));
    } else {
        narrative.push_str("**Result:** Target is not present in the array.\n\n---\n\n");
    }

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
            "CALCULATE_MID" if i + 2 < steps.len() => {
                let compare = &steps[i + 1];
                let outcome = &steps[i + 2];

                narrative.push_str(&format!(
                    "## Step {}: Probe window [{}..{}] at midpoint {}\n\n",
                    step_counter, step.data["low"], step.data["high"], step.data["mid"]
                ));
                narrative.push_str("**Window Before Comparison:**\n```\n");
                narrative.push_str(&render_array_state(&step.data["visualization"]));
                narrative.push_str("```\n");
                narrative.push_str(&format!(
                    "**Comparison:** `arr[{}]` is `{}`, target is `{}`.\n",
                    compare.data["mid_index"], compare.data["mid_value"], compare.data["target"]
                ));

                match outcome.kind.as_str() {
                    "TARGET_FOUND" => {
                        narrative.push_str(&format!(
                            "**Outcome:** the midpoint **is** the target. Search ends at index `{}`.\n\n",
                            outcome.data["index"]
                        ));
                    }
                    "SEARCH_RIGHT" => {
                        narrative.push_str(&format!(
                            "**Outcome:** midpoint too small (`{}`). Eliminate the left half; \
                             the window now starts at index `{}`.\n\n",
                            outcome.data["comparison"], outcome.data["new_low"]
                        ));
                    }
                    "SEARCH_LEFT" => {
                        narrative.push_str(&format!(
                            "**Outcome:** midpoint too large (`{}`). Eliminate the right half; \
                             the window now ends at index `{}`.\n\n",
                            outcome.data["comparison"], outcome.data["new_high"]
                        ));
                    }
                    _ => {}
                }
                narrative.push_str("**Window After Outcome:**\n```\n");
                narrative.push_str(&render_array_state(&outcome.data["visualization"]));
                narrative.push_str("```\n---\n\n");

                i += 3;
                step_counter += 1;
            }
            "TARGET_NOT_FOUND" => {
                narrative.push_str(&format!("## Step {}: {}\n\n", step_counter, step.description));
                narrative.push_str(
                    "Low has crossed high, so no untested candidates remain.\n\n---\n\n",
                );
                i += 1;
                step_counter += 1;
            }
            "ALGORITHM_COMPLETE" => {
                narrative.push_str(&format!("## Step {}: {}\n\n", step_counter, step.description));
                narrative.push_str(&format!(
                    "**Found:** `{}`\n**Index:** `{}`\n\n",
                    step.data["found"], step.data["index"]
                ));
                i += 1;
                step_counter += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    narrative.push_str(
        "## Execution Summary\n\n\
         Each probe compares the midpoint of the remaining window with the target and\n\
         eliminates the half that cannot contain it. Time complexity: O(log n).\n",
    );

    narrative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(target: i64) -> Value {
        json!({"array": [1, 3, 5, 7, 9, 11, 13, 15], "target": target})
    }

    #[test]
    fn test_target_found() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(7)).unwrap();

        assert_eq!(envelope.result["found"], json!(true));
        assert_eq!(envelope.result["index"], json!(3));

        let last = envelope.trace.steps.last().unwrap();
        assert_eq!(last.kind, "ALGORITHM_COMPLETE");
    }

    #[test]
    fn test_target_missing() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(4)).unwrap();

        assert_eq!(envelope.result["found"], json!(false));
        assert_eq!(envelope.result["index"], Value::Null);
        assert!(envelope.trace.steps.iter().any(|s| s.kind == "TARGET_NOT_FOUND"));
    }

    #[test]
    fn test_first_probe_hits_middle() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(7)).unwrap();

        let first_mid = envelope
            .trace
            .steps
            .iter()
            .find(|s| s.kind == "CALCULATE_MID")
            .unwrap();
        assert_eq!(first_mid.data["low"], json!(0));
        assert_eq!(first_mid.data["high"], json!(7));
        assert_eq!(first_mid.data["mid"], json!(3));
    }

    #[test]
    fn test_unsorted_array_fails_before_any_step() {
        let mut tracer = BinarySearchTracer::new();
        let err = tracer
            .execute(json!({"array": [5, 1, 3], "target": 3}))
            .unwrap_err();

        assert!(matches!(err, AlgoLensError::Validation(_)));
        assert_eq!(tracer.recorder().step_count(), 0);
    }

    #[test]
    fn test_missing_target_fails_validation() {
        let mut tracer = BinarySearchTracer::new();
        let err = tracer.execute(json!({"array": [1, 2, 3]})).unwrap_err();
        assert!(matches!(err, AlgoLensError::Validation(_)));
    }

    #[test]
    fn test_empty_array_is_not_found() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(json!({"array": [], "target": 1})).unwrap();

        assert_eq!(envelope.result["found"], json!(false));
        let kinds: Vec<&str> = envelope.trace.steps.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["INITIAL_STATE", "TARGET_NOT_FOUND", "ALGORITHM_COMPLETE"]);
    }

    #[test]
    fn test_elimination_directions() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(13)).unwrap();

        let directions: Vec<&str> = envelope
            .trace
            .steps
            .iter()
            .filter(|s| matches!(s.kind.as_str(), "SEARCH_LEFT" | "SEARCH_RIGHT" | "TARGET_FOUND"))
            .map(|s| s.kind.as_str())
            .collect();
        assert_eq!(directions, vec!["SEARCH_RIGHT", "SEARCH_RIGHT", "TARGET_FOUND"]);
    }

    #[test]
    fn test_element_states_after_elimination() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(13)).unwrap();

        // After the first SEARCH_RIGHT, indices 0..=3 are eliminated
        let step = envelope
            .trace
            .steps
            .iter()
            .find(|s| s.kind == "SEARCH_RIGHT")
            .unwrap();
        let array = step.data["visualization"]["array"].as_array().unwrap();
        for elem in &array[..4] {
            assert_eq!(elem["state"], json!("eliminated"));
        }
        for elem in &array[4..] {
            assert_eq!(elem["state"], json!("active"));
        }
    }

    #[test]
    fn test_found_element_is_marked() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(7)).unwrap();

        let found = envelope
            .trace
            .steps
            .iter()
            .find(|s| s.kind == "TARGET_FOUND")
            .unwrap();
        let array = found.data["visualization"]["array"].as_array().unwrap();
        assert_eq!(array[3]["state"], json!("found"));
    }

    #[test]
    fn test_prediction_points_cover_every_compare() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(13)).unwrap();

        let compares = envelope.trace.steps.iter().filter(|s| s.kind == "COMPARE").count();
        let points = &envelope.metadata.prediction_points;
        assert_eq!(points.len(), compares);

        assert_eq!(points[0].correct_answer, "right");
        assert_eq!(points.last().unwrap().correct_answer, "found");
        for point in points {
            assert_eq!(point.choices.len(), 3);
        }
    }

    #[test]
    fn test_narrative_renders_markdown() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(7)).unwrap();
        let narrative = tracer.narrative(&envelope).unwrap();

        assert!(narrative.starts_with("# Binary Search Execution Narrative"));
        assert!(narrative.contains("**Result:** Target found at index `3`."));
        assert!(narrative.contains("**Window Before Comparison:**"));
        assert!(narrative.contains("the midpoint **is** the target"));
        assert!(narrative.contains("## Execution Summary"));
    }

    #[test]
    fn test_narrative_for_missing_target() {
        let mut tracer = BinarySearchTracer::new();
        let envelope = tracer.execute(sample_input(4)).unwrap();
        let narrative = tracer.narrative(&envelope).unwrap();

        assert!(narrative.contains("**Result:** Target is not present in the array."));
        assert!(narrative.contains("no untested candidates remain"));
        // Both elimination directions appear for this search path
        assert!(narrative.contains("Eliminate the left half"));
        assert!(narrative.contains("Eliminate the right half"));
    }
}
