pub mod algorithms;
pub mod error;
pub mod registry;
pub mod trace;

pub use error::{AlgoLensError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::algorithms::{BinarySearchTracer, IntervalCoverageTracer, TwoPointerTracer};
    pub use crate::error::{AlgoLensError, Result};
    pub use crate::registry::{AlgorithmInfo, AlgorithmRegistry, ExampleInput};
    pub use crate::trace::{
        AlgorithmTracer, PredictionChoice, PredictionPoint, TraceEnvelope, TraceRecorder,
        TraceStep,
    };
}
