//! Remove-covered-intervals tracer (recursive greedy filter)
//!
//! Sorts intervals by start ascending, end descending (ties prefer the
//! longer interval), then recursively filters while threading a running
//! maximum-end coverage value. The backend does all the computation; the
//! frontend only replays the recorded steps, so every comparison,
//! decision, and coverage update is emitted as its own step. The call
//! stack is kept as an explicit vector of frames so it can be inspected
//! and serialized mid-recursion for the stack visualization.

use crate::error::{AlgoLensError, Result};
use crate::trace::{
    sanitize, to_object, AlgorithmTracer, PredictionChoice, PredictionPoint, TraceEnvelope,
    TraceRecorder,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::info;

/// A time interval with its display color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub id: u32,
    pub start: i64,
    pub end: i64,
    pub color: String,
}

#[derive(Deserialize)]
struct IntervalCoverageInput {
    intervals: Vec<Interval>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameStatus {
    Examining,
    Decided,
    Returning,
}

impl FrameStatus {
    fn as_str(self) -> &'static str {
        match self {
            FrameStatus::Examining => "examining",
            FrameStatus::Decided => "decided",
            FrameStatus::Returning => "returning",
        }
    }
}

/// One recursive call, kept explicit so the stack is serializable
/// at any emission point
#[derive(Debug, Clone)]
struct CallFrame {
    id: usize,
    depth: usize,
    current: Option<Interval>,
    remaining: Vec<Interval>,
    max_end: f64,
    status: FrameStatus,
    decision: Option<String>,
    return_value: Vec<Interval>,
}

#[derive(Debug, Clone, Copy, Default)]
struct VisualState {
    is_examining: bool,
    is_covered: bool,
    is_kept: bool,
}

impl VisualState {
    /// Single state string for the frontend. Priority order:
    /// examining > covered > kept > active.
    fn as_str(self) -> &'static str {
        if self.is_examining {
            "examining"
        } else if self.is_covered {
            "covered"
        } else if self.is_kept {
            "kept"
        } else {
            "active"
        }
    }
}

/// Tracer for the remove-covered-intervals algorithm
pub struct IntervalCoverageTracer {
    recorder: TraceRecorder,
    call_stack: Vec<CallFrame>,
    next_call_id: usize,
    original_intervals: Vec<Interval>,
    interval_states: HashMap<u32, VisualState>,
    current_max_end: f64,
}

impl IntervalCoverageTracer {
    pub const MAX_INTERVALS: usize = 100;

    pub fn new() -> Self {
        Self {
            recorder: TraceRecorder::new(),
            call_stack: Vec::new(),
            next_call_id: 0,
            original_intervals: Vec::new(),
            interval_states: HashMap::new(),
            current_max_end: f64::NEG_INFINITY,
        }
    }

    fn reset(&mut self) {
        self.recorder.reset();
        self.call_stack.clear();
        self.next_call_id = 0;
        self.original_intervals.clear();
        self.interval_states.clear();
        self.current_max_end = f64::NEG_INFINITY;
    }

    fn fresh_call_id(&mut self) -> usize {
        let id = self.next_call_id;
        self.next_call_id += 1;
        id
    }

    /// Clear transient visual marks. Covered/kept are permanent decisions
    /// and must persist for the rest of the execution.
    fn reset_transient_visuals(&mut self) {
        for state in self.interval_states.values_mut() {
            state.is_examining = false;
        }
    }

    fn set_visual(&mut self, id: u32, update: impl FnOnce(&mut VisualState)) {
        update(self.interval_states.entry(id).or_default());
    }

    fn intervals_with_state(&self) -> Value {
        Value::Array(
            self.original_intervals
                .iter()
                .map(|interval| {
                    let state = self.interval_states.get(&interval.id).copied().unwrap_or_default();
                    json!({
                        "id": interval.id,
                        "start": interval.start,
                        "end": interval.end,
                        "color": interval.color,
                        "state": state.as_str(),
                    })
                })
                .collect(),
        )
    }

    fn call_stack_state(&self) -> Value {
        Value::Array(
            self.call_stack
                .iter()
                .map(|frame| {
                    json!({
                        "id": frame.id,
                        "is_active": frame.status == FrameStatus::Examining,
                        "depth": frame.depth,
                        "current_interval": sanitize(&frame.current),
                        "max_end": sanitize(&frame.max_end),
                        "remaining_count": frame.remaining.len(),
                        "status": frame.status.as_str(),
                        "decision": sanitize(&frame.decision),
                        "return_value": sanitize(&frame.return_value),
                    })
                })
                .collect(),
        )
    }

    fn filter_recursive(&mut self, intervals: &[Interval], max_end: f64) -> Result<Vec<Interval>> {
        self.current_max_end = max_end;

        let Some((current, remaining)) = intervals.split_first() else {
            let call_id = self.fresh_call_id();
            self.emit_step(
                "BASE_CASE",
                to_object(json!({
                    "call_id": call_id,
                    "max_end": sanitize(&max_end),
                    "description": "No intervals remaining - return empty list",
                })),
                "Base case: no more intervals to process, return empty result",
            )?;
            return Ok(Vec::new());
        };

        let current = current.clone();
        let remaining = remaining.to_vec();
        let call_id = self.fresh_call_id();
        let depth = self.call_stack.len();

        self.call_stack.push(CallFrame {
            id: call_id,
            depth,
            current: Some(current.clone()),
            remaining: remaining.clone(),
            max_end,
            status: FrameStatus::Examining,
            decision: None,
            return_value: Vec::new(),
        });
        let frame_idx = self.call_stack.len() - 1;

        self.reset_transient_visuals();
        self.set_visual(current.id, |s| s.is_examining = true);

        self.emit_step(
            "CALL_START",
            to_object(json!({
                "call_id": call_id,
                "depth": depth,
                "examining": &current,
                "max_end": sanitize(&max_end),
                "remaining_count": remaining.len(),
                "intervals": intervals,
            })),
            format!(
                "New recursive call (depth {}): examining interval ({}, {}) with {} remaining",
                depth,
                current.start,
                current.end,
                remaining.len()
            ),
        )?;

        self.emit_step(
            "EXAMINING_INTERVAL",
            to_object(json!({
                "call_id": call_id,
                "interval": &current,
                "max_end": sanitize(&max_end),
                "comparison": format!("{} vs {}", current.end, max_end_label(max_end)),
            })),
            format!(
                "Does interval ({}, {}) extend beyond max_end={}? If yes, we KEEP it; if no, it's COVERED.",
                current.start,
                current.end,
                max_end_label(max_end)
            ),
        )?;

        // The whole algorithm hangs on this one comparison
        let is_covered = (current.end as f64) <= max_end;
        let decision = if is_covered { "covered" } else { "keep" };

        self.call_stack[frame_idx].status = FrameStatus::Decided;
        self.call_stack[frame_idx].decision = Some(decision.to_string());

        self.set_visual(current.id, |s| {
            s.is_examining = false;
            s.is_covered = is_covered;
        });

        let explanation = if is_covered {
            format!(
                "COVERED: end={} <= max_end={} - an earlier interval already covers this range, so we can skip it safely.",
                current.end,
                max_end_label(max_end)
            )
        } else {
            format!(
                "KEEP: end={} > max_end={} - this interval extends our coverage, so we must keep it.",
                current.end,
                max_end_label(max_end)
            )
        };

        self.emit_step(
            "DECISION_MADE",
            to_object(json!({
                "call_id": call_id,
                "interval": &current,
                "decision": decision,
                "reason": format!(
                    "end={} {} max_end={}",
                    current.end,
                    if is_covered { "<=" } else { ">" },
                    max_end_label(max_end)
                ),
                "will_keep": !is_covered,
            })),
            explanation,
        )?;

        let result = if is_covered {
            self.filter_recursive(&remaining, max_end)?
        } else {
            let new_max_end = max_end.max(current.end as f64);
            self.emit_step(
                "MAX_END_UPDATE",
                to_object(json!({
                    "call_id": call_id,
                    "interval": &current,
                    "old_max_end": sanitize(&max_end),
                    "new_max_end": new_max_end,
                })),
                format!(
                    "Coverage extended: max_end updated from {} to {} (now we can skip intervals ending <= {})",
                    max_end_label(max_end),
                    new_max_end,
                    new_max_end
                ),
            )?;

            self.current_max_end = new_max_end;
            let rest = self.filter_recursive(&remaining, new_max_end)?;
            let mut kept = vec![current.clone()];
            kept.extend(rest);
            kept
        };

        self.call_stack[frame_idx].status = FrameStatus::Returning;
        self.call_stack[frame_idx].return_value = result.clone();

        self.emit_step(
            "CALL_RETURN",
            to_object(json!({
                "call_id": call_id,
                "depth": depth,
                "return_value": &result,
                "kept_count": result.len(),
            })),
            format!(
                "Returning from call #{}: kept {} interval(s) from this branch",
                call_id,
                result.len()
            ),
        )?;

        self.call_stack.pop();
        Ok(result)
    }
}

impl Default for IntervalCoverageTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmTracer for IntervalCoverageTracer {
    fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    fn recorder_mut(&mut self) -> &mut TraceRecorder {
        &mut self.recorder
    }

    fn execute(&mut self, input: Value) -> Result<TraceEnvelope> {
        let input: IntervalCoverageInput = serde_json::from_value(input).map_err(|e| {
            AlgoLensError::Validation(format!("expected an object with an 'intervals' list: {}", e))
        })?;

        if input.intervals.len() > Self::MAX_INTERVALS {
            return Err(AlgoLensError::Validation(format!(
                "Too many intervals provided ({}). The maximum allowed is {}.",
                input.intervals.len(),
                Self::MAX_INTERVALS
            )));
        }

        self.reset();
        let intervals = input.intervals;
        self.original_intervals = intervals.clone();
        for interval in &intervals {
            self.interval_states.insert(interval.id, VisualState::default());
        }

        info!(count = intervals.len(), "executing interval coverage");

        self.recorder.set_metadata(to_object(json!({
            "algorithm": "interval-coverage",
            "display_name": "Interval Coverage",
            "visualization_type": "timeline",
            "input_size": intervals.len(),
            "visualization_config": {
                "show_call_stack": true,
                "highlight_examining": true,
                "color_by_state": true,
            },
        })));

        self.emit_step(
            "INITIAL_STATE",
            to_object(json!({"intervals": &intervals, "count": intervals.len()})),
            "Original unsorted intervals",
        )?;

        self.emit_step(
            "SORT_BEGIN",
            to_object(json!({"description": "Sorting by (start asc, end desc)"})),
            "Sorting intervals by start time (ascending) breaks ties by preferring longer intervals",
        )?;

        let mut sorted = intervals.clone();
        sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        self.emit_step(
            "SORT_COMPLETE",
            to_object(json!({"intervals": &sorted})),
            "Sorted! Now we can use a greedy strategy: process intervals left-to-right, keeping only those that extend our coverage.",
        )?;

        let result = self.filter_recursive(&sorted, f64::NEG_INFINITY)?;

        for interval in &result {
            let id = interval.id;
            self.set_visual(id, |s| s.is_kept = true);
        }

        self.emit_step(
            "ALGORITHM_COMPLETE",
            to_object(json!({
                "result": &result,
                "kept_count": result.len(),
                "removed_count": intervals.len() - result.len(),
            })),
            format!(
                "Algorithm complete! Kept {} essential intervals, removed {} covered intervals.",
                result.len(),
                intervals.len() - result.len()
            ),
        )?;

        self.recorder
            .metadata_mut()
            .insert("output_size".to_string(), json!(result.len()));

        Ok(self.build_envelope(sanitize(&result)))
    }

    fn prediction_points(&self) -> Vec<PredictionPoint> {
        let steps = self.recorder.steps();
        let mut predictions = Vec::new();

        for (i, step) in steps.iter().enumerate() {
            if step.kind != "EXAMINING_INTERVAL" {
                continue;
            }
            let Some(decision_step) = steps.get(i + 1) else { continue };
            if decision_step.kind != "DECISION_MADE" {
                continue;
            }

            let interval = &step.data["interval"];
            let start = &interval["start"];
            let end = &interval["end"];
            let decision = decision_step.data["decision"].as_str().unwrap_or_default();

            predictions.push(PredictionPoint {
                step_index: i,
                question: format!("Will interval ({}, {}) be kept or covered?", start, end),
                choices: vec![
                    PredictionChoice::new("keep", "Keep this interval"),
                    PredictionChoice::new("covered", "Covered by previous"),
                ],
                hint: Some(format!("Compare interval.end ({}) with max_end", end)),
                correct_answer: decision.to_string(),
                explanation: Some(if decision == "keep" {
                    format!("Interval ({}, {}) was kept.", start, end)
                } else {
                    format!("Interval ({}, {}) is covered by a previous interval.", start, end)
                }),
            });
        }

        predictions
    }

    fn visualization_state(&self) -> Map<String, Value> {
        to_object(json!({
            "all_intervals": self.intervals_with_state(),
            "call_stack_state": self.call_stack_state(),
            "max_end": sanitize(&self.current_max_end),
        }))
    }

    fn narrative(&self, envelope: &TraceEnvelope) -> Option<String> {
        Some(render_narrative(envelope))
    }
}

/// Display form of a possibly-unbounded coverage value
fn max_end_label(max_end: f64) -> String {
    if max_end.is_finite() {
        format!("{}", max_end)
    } else {
        "-inf".to_string()
    }
}

fn fmt_interval(value: &Value) -> String {
    format!(
        "Interval {}: [{:>4}, {:>4}]",
        value["id"],
        value["start"].to_string(),
        value["end"].to_string()
    )
}

/// Markdown narrative of the full recursive execution, a pure consumer of
/// the finished envelope.
fn render_narrative(envelope: &TraceEnvelope) -> String {
    let metadata = &envelope.metadata.fields;
    let steps = &envelope.trace.steps;
    let input_size = metadata.get("input_size").and_then(Value::as_u64).unwrap_or(0);
    let output_size = metadata.get("output_size").and_then(Value::as_u64).unwrap_or(0);

    let mut narrative = String::from("# Interval Coverage Execution Narrative\n\n");
    narrative.push_str(&format!(
        "**Algorithm:** {}\n",
        metadata.get("display_name").and_then(Value::as_str).unwrap_or("Interval Coverage")
    ));
    narrative.push_str(&format!("**Input Size:** {} intervals\n", input_size));
    narrative.push_str(&format!("**Output Size:** {} intervals kept\n", output_size));
    narrative.push_str(&format!(
        "**Removed:** {} intervals (covered)\n\n",
        input_size.saturating_sub(output_size)
    ));

    narrative.push_str("**Input Intervals:**\n```\n");
    if let Some(first) = steps.first() {
        if first.kind == "INITIAL_STATE" {
            for interval in first.data["intervals"].as_array().into_iter().flatten() {
                narrative.push_str(&format!("{} ({})\n", fmt_interval(interval), interval["color"]));
            }
        }
    }
    narrative.push_str("```\n\n**Final Result:**\n```\n");
    for interval in envelope.result.as_array().into_iter().flatten() {
        narrative.push_str(&format!("{} (KEPT)\n", fmt_interval(interval)));
    }
    narrative.push_str("```\n\n---\n\n");

    let mut current_depth = 0;
    for step in steps {
        let data = &step.data;
        if let Some(depth) = data.get("depth").and_then(Value::as_u64) {
            current_depth = depth as usize;
        }
        let indent = match step.kind.as_str() {
            "INITIAL_STATE" | "SORT_BEGIN" | "SORT_COMPLETE" | "ALGORITHM_COMPLETE" => String::new(),
            _ => "  ".repeat(current_depth),
        };

        narrative.push_str(&format!("{}## Step {}: {}\n\n", indent, step.step, step.description));

        match step.kind.as_str() {
            "SORT_COMPLETE" => {
                narrative.push_str("**Sorted Intervals:**\n```\n");
                for interval in data["intervals"].as_array().into_iter().flatten() {
                    narrative.push_str(&format!("{}\n", fmt_interval(interval)));
                }
                narrative.push_str("```\n\n");
            }
            "CALL_START" => {
                let examining = &data["examining"];
                narrative.push_str(&format!(
                    "{}**Recursive Call #{}** (Depth {})\n\n\
                     {}- Examining: {}\n\
                     {}- Current coverage (max_end): {}\n\
                     {}- Remaining intervals: {}\n\n",
                    indent, data["call_id"], data["depth"],
                    indent, fmt_interval(examining),
                    indent, fmt_max_end(&data["max_end"]),
                    indent, data["remaining_count"],
                ));
            }
            "EXAMINING_INTERVAL" => {
                let interval = &data["interval"];
                narrative.push_str(&format!(
                    "{}**Comparison:** does `{} > {}` hold?\n\
                     {}- If YES: this interval extends coverage, KEEP it\n\
                     {}- If NO: this interval is already covered, skip it\n\n",
                    indent, interval["end"], fmt_max_end(&data["max_end"]),
                    indent, indent,
                ));
            }
            "DECISION_MADE" => {
                let verdict = if data["decision"] == json!("covered") {
                    "DECISION: COVERED"
                } else {
                    "DECISION: KEEP"
                };
                narrative.push_str(&format!(
                    "{}**{}** — reason: `{}`\n\n",
                    indent, verdict, data["reason"].as_str().unwrap_or_default()
                ));
            }
            "MAX_END_UPDATE" => {
                narrative.push_str(&format!(
                    "{}**Coverage Extended:** max_end {} -> {}\n\n",
                    indent,
                    fmt_max_end(&data["old_max_end"]),
                    data["new_max_end"],
                ));
            }
            "CALL_RETURN" => {
                let kept: Vec<String> = data["return_value"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|iv| format!("#{}", iv["id"]))
                    .collect();
                narrative.push_str(&format!(
                    "{}**Return from Call #{}:** kept {} — {}\n\n",
                    indent,
                    data["call_id"],
                    data["kept_count"],
                    if kept.is_empty() { "(none)".to_string() } else { kept.join(", ") },
                ));
            }
            "ALGORITHM_COMPLETE" => {
                narrative.push_str(&format!(
                    "**Summary:** kept **{}**, removed {} (covered)\n\n",
                    data["kept_count"], data["removed_count"],
                ));
            }
            _ => {}
        }

        narrative.push_str("---\n\n");
    }

    narrative.push_str(
        "## Execution Summary\n\n\
         1. Sort intervals by start time (ascending), breaking ties by end time (descending)\n\
         2. Process intervals left-to-right using recursive filtering\n\
         3. Track coverage with `max_end`; keep intervals that extend it, skip those already covered\n\n\
         Time complexity: O(n log n) sorting + O(n) filtering. An interval is covered exactly\n\
         when its end point does not extend beyond the current coverage (`end <= max_end`).\n",
    );

    narrative
}

fn fmt_max_end(value: &Value) -> String {
    if value.is_null() {
        "-inf".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> Value {
        json!({
            "intervals": [
                {"id": 1, "start": 100, "end": 300, "color": "blue"},
                {"id": 2, "start": 150, "end": 250, "color": "green"},
                {"id": 3, "start": 400, "end": 500, "color": "amber"},
            ]
        })
    }

    #[test]
    fn test_covered_interval_is_removed() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        let result = envelope.result.as_array().unwrap();
        let ids: Vec<u64> = result.iter().map(|iv| iv["id"].as_u64().unwrap()).collect();
        // Interval 2 is covered since 250 <= 300
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(envelope.metadata.fields["output_size"], json!(2));
    }

    #[test]
    fn test_sequence_numbers_and_count_invariant() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        assert_eq!(envelope.trace.total_steps, envelope.trace.steps.len());
        for (i, step) in envelope.trace.steps.iter().enumerate() {
            assert_eq!(step.step, i);
        }

        let timestamps: Vec<f64> = envelope.trace.steps.iter().map(|s| s.timestamp).collect();
        for pair in timestamps.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_too_many_intervals_fails_validation() {
        let intervals: Vec<Value> = (0..101)
            .map(|i| json!({"id": i, "start": i * 10, "end": i * 10 + 5, "color": "blue"}))
            .collect();

        let mut tracer = IntervalCoverageTracer::new();
        let err = tracer.execute(json!({"intervals": intervals})).unwrap_err();

        match err {
            AlgoLensError::Validation(msg) => assert!(msg.contains("maximum allowed is 100")),
            other => panic!("Expected Validation, got {:?}", other),
        }
        assert_eq!(tracer.recorder().step_count(), 0);
    }

    #[test]
    fn test_exactly_max_intervals_is_allowed() {
        // Disjoint intervals, so every one is kept
        let intervals: Vec<Value> = (0..IntervalCoverageTracer::MAX_INTERVALS)
            .map(|i| json!({"id": i, "start": i * 10, "end": i * 10 + 5, "color": "blue"}))
            .collect();

        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(json!({"intervals": intervals})).unwrap();

        assert_eq!(
            envelope.metadata.fields["input_size"],
            json!(IntervalCoverageTracer::MAX_INTERVALS)
        );
        assert_eq!(
            envelope.result.as_array().unwrap().len(),
            IntervalCoverageTracer::MAX_INTERVALS
        );
    }

    #[test]
    fn test_malformed_input_fails_validation() {
        let mut tracer = IntervalCoverageTracer::new();
        let err = tracer.execute(json!({"wrong": []})).unwrap_err();
        assert!(matches!(err, AlgoLensError::Validation(_)));
    }

    #[test]
    fn test_initial_max_end_is_sanitized_to_null() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        let first_call = envelope
            .trace
            .steps
            .iter()
            .find(|s| s.kind == "CALL_START")
            .unwrap();
        assert_eq!(first_call.data["max_end"], Value::Null);
    }

    #[test]
    fn test_every_step_carries_visualization_state() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        for step in &envelope.trace.steps {
            let viz = &step.data["visualization"];
            assert!(viz["all_intervals"].is_array(), "missing viz on {}", step.kind);
            assert!(viz["call_stack_state"].is_array());
        }
    }

    #[test]
    fn test_call_stack_depth_is_threaded() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        let depths: Vec<u64> = envelope
            .trace
            .steps
            .iter()
            .filter(|s| s.kind == "CALL_START")
            .map(|s| s.data["depth"].as_u64().unwrap())
            .collect();
        assert_eq!(depths, vec![0, 1, 2]);

        // Mid-recursion the deepest CALL_START sees all enclosing frames
        let deepest = envelope
            .trace
            .steps
            .iter()
            .filter(|s| s.kind == "CALL_START")
            .last()
            .unwrap();
        let stack = deepest.data["visualization"]["call_stack_state"].as_array().unwrap();
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_prediction_points_pair_examining_with_decision() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        let points = &envelope.metadata.prediction_points;
        assert_eq!(points.len(), 3);

        for point in points {
            let step = &envelope.trace.steps[point.step_index];
            assert_eq!(step.kind, "EXAMINING_INTERVAL");
            assert_eq!(envelope.trace.steps[point.step_index + 1].kind, "DECISION_MADE");
            assert_eq!(point.choices.len(), 2);
        }

        // Interval 2 (sorted second) is the covered one
        assert_eq!(points[0].correct_answer, "keep");
        assert_eq!(points[1].correct_answer, "covered");
        assert_eq!(points[2].correct_answer, "keep");
    }

    #[test]
    fn test_kept_intervals_marked_in_final_state() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();

        let complete = envelope.trace.steps.last().unwrap();
        assert_eq!(complete.kind, "ALGORITHM_COMPLETE");

        let states: HashMap<u64, String> = complete.data["visualization"]["all_intervals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|iv| {
                (iv["id"].as_u64().unwrap(), iv["state"].as_str().unwrap().to_string())
            })
            .collect();

        assert_eq!(states[&1], "kept");
        assert_eq!(states[&2], "covered");
        assert_eq!(states[&3], "kept");
    }

    #[test]
    fn test_reexecution_resets_state() {
        let mut tracer = IntervalCoverageTracer::new();
        let first = tracer.execute(sample_input()).unwrap();
        let second = tracer.execute(sample_input()).unwrap();

        assert_eq!(first.trace.total_steps, second.trace.total_steps);
        assert_eq!(second.trace.steps[0].step, 0);
        // call ids restart too
        let first_call = second.trace.steps.iter().find(|s| s.kind == "CALL_START").unwrap();
        assert_eq!(first_call.data["call_id"], json!(0));
    }

    #[test]
    fn test_empty_input_produces_base_case_only() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(json!({"intervals": []})).unwrap();

        assert_eq!(envelope.result, json!([]));
        let kinds: Vec<&str> = envelope.trace.steps.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["INITIAL_STATE", "SORT_BEGIN", "SORT_COMPLETE", "BASE_CASE", "ALGORITHM_COMPLETE"]
        );
    }

    #[test]
    fn test_sort_prefers_longer_interval_on_ties() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer
            .execute(json!({
                "intervals": [
                    {"id": 1, "start": 100, "end": 200, "color": "blue"},
                    {"id": 2, "start": 100, "end": 400, "color": "green"},
                ]
            }))
            .unwrap();

        let sorted = envelope
            .trace
            .steps
            .iter()
            .find(|s| s.kind == "SORT_COMPLETE")
            .unwrap();
        let ids: Vec<u64> = sorted.data["intervals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|iv| iv["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 1]);

        // The shorter one is then covered
        let result_ids: Vec<u64> = envelope
            .result
            .as_array()
            .unwrap()
            .iter()
            .map(|iv| iv["id"].as_u64().unwrap())
            .collect();
        assert_eq!(result_ids, vec![2]);
    }

    #[test]
    fn test_narrative_renders_markdown() {
        let mut tracer = IntervalCoverageTracer::new();
        let envelope = tracer.execute(sample_input()).unwrap();
        let narrative = tracer.narrative(&envelope).unwrap();

        assert!(narrative.starts_with("# Interval Coverage Execution Narrative"));
        assert!(narrative.contains("**Input Size:** 3 intervals"));
        assert!(narrative.contains("DECISION: COVERED"));
        assert!(narrative.contains("## Execution Summary"));
    }
}
