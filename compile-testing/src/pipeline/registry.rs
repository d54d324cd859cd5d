//! The step registry: registration, ordering and fail-fast execution.

use super::{ExecutionResult, StageDescriptor};
use crate::context::BuildModel;
use crate::core::ExitCode;
use crate::errors::ConfigurationError;
use crate::events::{kinds, EventSink, NoOpEventSink};
use crate::observability::stage_span;
use crate::stages::{Stage, StageRecord};
use crate::toolchain::ExecutionEnv;
use chrono::Utc;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

struct RegisteredStage<M: ?Sized> {
    descriptor: StageDescriptor,
    stage: Box<dyn Stage<M>>,
}

/// Registered stages and their ordering constraints.
///
/// Stages run one at a time in an order that honours every constraint
/// between registered stages. Among stages that are ready at the same time,
/// the one registered first runs first.
pub struct StepRegistry<M: ?Sized = dyn BuildModel> {
    stages: HashMap<String, RegisteredStage<M>>,
    order: Vec<String>,
    event_sink: Arc<dyn EventSink>,
}

impl<M: ?Sized> Default for StepRegistry<M> {
    fn default() -> Self {
        Self {
            stages: HashMap::new(),
            order: Vec::new(),
            event_sink: Arc::new(NoOpEventSink),
        }
    }
}

impl<M: ?Sized> StepRegistry<M> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sink receiving lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Replaces the sink receiving lifecycle events.
    pub fn set_event_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.event_sink = sink;
    }

    /// Registers a stage under `descriptor`.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken, the constraint sets overlap, the descriptor
    /// names itself, or the descriptor and stage ids differ. The registry is
    /// left unchanged on error.
    pub fn register(
        &mut self,
        descriptor: StageDescriptor,
        stage: Box<dyn Stage<M>>,
    ) -> Result<(), ConfigurationError> {
        if descriptor.id() != stage.id() {
            return Err(ConfigurationError::IdMismatch {
                descriptor: descriptor.id().to_string(),
                stage: stage.id().to_string(),
            });
        }
        if self.stages.contains_key(descriptor.id()) {
            return Err(ConfigurationError::duplicate(descriptor.id()));
        }
        descriptor.validate()?;

        tracing::debug!(
            stage = descriptor.id(),
            after = ?descriptor.after(),
            before = ?descriptor.before(),
            "registered stage"
        );
        let id = descriptor.id().to_string();
        self.order.push(id.clone());
        self.stages.insert(id, RegisteredStage { descriptor, stage });
        Ok(())
    }

    /// Registers a stage with no ordering constraints.
    pub fn register_stage<S>(&mut self, stage: S) -> Result<(), ConfigurationError>
    where
        S: Stage<M> + 'static,
    {
        let descriptor = StageDescriptor::new(stage.id());
        self.register(descriptor, Box::new(stage))
    }

    /// Returns true if a stage with `id` is registered.
    #[must_use]
    pub fn has_stage(&self, id: &str) -> bool {
        self.stages.contains_key(id)
    }

    /// Returns the descriptor registered for `id`.
    #[must_use]
    pub fn descriptor(&self, id: &str) -> Option<&StageDescriptor> {
        self.stages.get(id).map(|s| &s.descriptor)
    }

    /// Registered ids in registration order.
    #[must_use]
    pub fn stage_ids(&self) -> &[String] {
        &self.order
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Computes the execution order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CycleDetected`] when the constraints
    /// admit no order.
    pub fn execution_order(&self) -> Result<Vec<String>, ConfigurationError> {
        let predecessors = self.predecessors();
        let mut done: HashSet<&str> = HashSet::with_capacity(self.order.len());
        let mut ordered = Vec::with_capacity(self.order.len());

        while ordered.len() < self.order.len() {
            let ready = self.order.iter().map(String::as_str).find(|id| {
                !done.contains(id)
                    && predecessors
                        .get(id)
                        .is_some_and(|preds| preds.iter().all(|p| done.contains(p)))
            });
            match ready {
                Some(id) => {
                    done.insert(id);
                    ordered.push(id.to_string());
                }
                None => {
                    let cycle = self.cycle_path(&predecessors, &done);
                    tracing::error!(cycle = %cycle.join(" -> "), "stage constraints form a cycle");
                    return Err(ConfigurationError::cycle(cycle));
                }
            }
        }
        Ok(ordered)
    }

    /// Runs every stage in order, stopping at the first non-`Ok` exit code.
    ///
    /// The order is computed before any stage runs, so a cycle never leads
    /// to partial execution. A stage returning `Err` ends the run with
    /// [`ExitCode::InternalError`] and its error chain in the diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CycleDetected`] when no order exists.
    pub fn execute(
        &self,
        env: &ExecutionEnv,
        initial_model: Arc<M>,
    ) -> Result<ExecutionResult<M>, ConfigurationError> {
        let order = self.execution_order()?;
        self.event_sink
            .emit(kinds::PIPELINE_STARTED, Some(json!({ "stages": order })));

        let mut model = initial_model;
        let mut exit_code = ExitCode::Ok;
        let mut payloads = Vec::new();
        let mut records = Vec::with_capacity(order.len());

        for id in &order {
            let Some(entry) = self.stages.get(id) else {
                continue;
            };
            let span = stage_span(id);
            let _guard = span.enter();
            self.event_sink
                .emit(kinds::STAGE_STARTED, Some(json!({ "stage": id })));
            let started_at = Utc::now();

            let outcome = match entry.stage.execute(env, Arc::clone(&model)) {
                Ok(outcome) => outcome,
                Err(err) => {
                    let chain = format!("{err:#}");
                    env.messages()
                        .error(format!("Stage '{id}' failed unexpectedly: {chain}"));
                    records.push(
                        StageRecord::finished(id.as_str(), ExitCode::InternalError, false, started_at)
                            .with_error(chain.as_str()),
                    );
                    exit_code = ExitCode::InternalError;
                    self.event_sink.emit(
                        kinds::STAGE_FAILED,
                        Some(json!({ "stage": id, "exit_code": exit_code, "error": chain })),
                    );
                    break;
                }
            };

            records.push(StageRecord::finished(
                id.as_str(),
                outcome.exit_code,
                outcome.skipped,
                started_at,
            ));
            exit_code = outcome.exit_code;
            model = outcome.model;
            if !outcome.skipped {
                payloads.extend(outcome.payload);
            }

            if !exit_code.is_ok() {
                tracing::info!(stage = %id, exit_code = %exit_code, "stage failed, stopping");
                self.event_sink.emit(
                    kinds::STAGE_FAILED,
                    Some(json!({ "stage": id, "exit_code": exit_code })),
                );
                break;
            }
            let kind = if outcome.skipped {
                kinds::STAGE_SKIPPED
            } else {
                kinds::STAGE_COMPLETED
            };
            tracing::debug!(stage = %id, skipped = outcome.skipped, "stage finished");
            self.event_sink.emit(kind, Some(json!({ "stage": id })));
        }

        self.event_sink.emit(
            kinds::PIPELINE_COMPLETED,
            Some(json!({ "exit_code": exit_code, "executed": records.len() })),
        );
        Ok(ExecutionResult {
            exit_code,
            payloads,
            final_model: model,
            records,
        })
    }

    /// Predecessor sets restricted to registered ids.
    fn predecessors(&self) -> HashMap<&str, HashSet<&str>> {
        let mut predecessors: HashMap<&str, HashSet<&str>> = self
            .order
            .iter()
            .map(|id| (id.as_str(), HashSet::new()))
            .collect();

        for entry in self.order.iter().filter_map(|id| self.stages.get(id)) {
            let id = entry.descriptor.id();
            for after in entry.descriptor.after() {
                if self.stages.contains_key(after) {
                    if let Some(preds) = predecessors.get_mut(id) {
                        preds.insert(after.as_str());
                    }
                }
            }
            for before in entry.descriptor.before() {
                if let Some(preds) = predecessors.get_mut(before.as_str()) {
                    preds.insert(id);
                }
            }
        }
        predecessors
    }

    /// Walks unfinished predecessors until a stage repeats.
    ///
    /// Every unfinished stage has an unfinished predecessor, otherwise it
    /// would be ready, so the walk always closes a cycle.
    fn cycle_path(
        &self,
        predecessors: &HashMap<&str, HashSet<&str>>,
        done: &HashSet<&str>,
    ) -> Vec<String> {
        let mut path: Vec<&str> = Vec::new();
        let mut current = self
            .order
            .iter()
            .map(String::as_str)
            .find(|id| !done.contains(id));

        while let Some(node) = current {
            if let Some(start) = path.iter().position(|n| *n == node) {
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .rev()
                    .map(|s| (*s).to_string())
                    .collect();
                if let Some(first) = cycle.first().cloned() {
                    cycle.push(first);
                }
                return cycle;
            }
            path.push(node);
            current = predecessors.get(node).and_then(|preds| {
                self.order
                    .iter()
                    .map(String::as_str)
                    .find(|id| preds.contains(id) && !done.contains(id))
            });
        }
        path.iter().map(|s| (*s).to_string()).collect()
    }
}

impl<M: ?Sized> fmt::Debug for StepRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("stages", &self.order)
            .finish_non_exhaustive()
    }
}
