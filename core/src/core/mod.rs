pub mod context;
pub mod context_data;
pub mod control;
pub mod step;

pub use context::Handler;
pub use context_data::FlowData;
pub use control::{FlowOutcome, StepControl};
pub use step::{SkipCondition, StepDef};
