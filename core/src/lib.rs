// core/src/lib.rs

//! Storefront Flow: asynchronous, type-safe step pipelines.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers that operate on a shared [`FlowData`]
//! context and decide whether the run continues or stops. Steps can be
//! optional, skipped by a condition, inserted or removed after construction.
//! The [`Workflows`] registry keys pipelines by their context type so callers
//! only need to hand over a context to run the matching workflow.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::FlowData;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Workflows;
