// core/src/pipeline/execution.rs

//! `Pipeline::run()`.

use crate::core::context::Handler;
use crate::core::context_data::FlowData;
use crate::core::control::{FlowOutcome, StepControl};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// For each step: evaluate `skip_if`, then run `before`, `on` and `after`
  /// handlers. The first handler error aborts the run and is returned as is.
  /// A handler returning [`StepControl::Stop`] ends the run with
  /// [`FlowOutcome::Stopped`]. A non-optional step without any handler fails
  /// with [`FlowError::HandlerMissing`].
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: FlowData<TData>) -> Result<FlowOutcome, Err> {
    for (step_index, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::INFO, "step", step_name, step_index);

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by condition.");
          continue;
        }
      }

      let hooks = match self.hooks.get(step_name).filter(|h| !h.is_empty()) {
        Some(hooks) => hooks,
        None if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers.");
          continue;
        }
        None => {
          event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
          return Err(Err::from(FlowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for (phase, handlers) in [("before", &hooks.before), ("on", &hooks.on), ("after", &hooks.after)] {
        let control = run_phase(phase, handlers, &ctx_data).instrument(step_span.clone()).await?;
        if control == StepControl::Stop {
          event!(parent: &step_span, Level::INFO, phase, "Pipeline stopped by handler.");
          return Ok(FlowOutcome::Stopped);
        }
      }
    }

    Ok(FlowOutcome::Completed)
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &FlowData<TData>,
) -> Result<StepControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for handler in handlers {
    match handler(ctx_data.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => return Ok(StepControl::Stop),
      Err(e) => {
        event!(Level::WARN, phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
