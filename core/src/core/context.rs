// core/src/core/context.rs

//! The boxed handler type stored by pipelines.

use crate::core::context_data::FlowData;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the shared context and resolves to a
/// [`StepControl`] or the pipeline's error type.
///
/// Handlers must release every `FlowData` guard before they `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(FlowData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;
