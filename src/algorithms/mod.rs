//! Concrete algorithm tracers
//!
//! Each tracer owns its algorithm's working state (arrays, pointers,
//! recursion bookkeeping) and emits one step at every decision point the
//! visualization must be able to replay. All of them satisfy the same
//! [`AlgorithmTracer`] contract defined by the core.
//!
//! [`AlgorithmTracer`]: crate::trace::AlgorithmTracer

pub mod binary_search;
pub mod interval_coverage;
pub mod two_pointer;

pub use binary_search::BinarySearchTracer;
pub use interval_coverage::{Interval, IntervalCoverageTracer};
pub use two_pointer::TwoPointerTracer;
