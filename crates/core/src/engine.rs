use crate::flow::{self, CompletionDelta};
use crate::template;
use crate::types::{FlowDefinition, FlowId, FlowStatus, RunId, TaskId, TaskInstance, TaskStatus};
use anyhow::Result;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Typed failures surfaced by [`FlowEngine`] operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("flow {0} not found")]
    FlowNotFound(FlowId),
    #[error("template {0} not found")]
    TemplateNotFound(FlowId),
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    #[error("flow {} failed validation: {}", .id, .errors.join("; "))]
    InvalidFlow { id: FlowId, errors: Vec<String> },
}

/// Owner of the authoritative flow and task collections.
///
/// The four core operations (validate, instantiate, complete, resolve) are
/// pure; this facade holds the state they read and commits their deltas.
/// Completion is a read-compute-commit transaction under one write lock, so
/// there is a single authoritative writer per run and cascades never observe
/// a half-merged collection.
pub struct FlowEngine {
    flows: RwLock<HashMap<FlowId, FlowDefinition>>,
    tasks: RwLock<Vec<TaskInstance>>,
}

impl FlowEngine {
    pub fn new() -> Self {
        Self {
            flows: RwLock::new(HashMap::new()),
            tasks: RwLock::new(Vec::new()),
        }
    }

    /// Register a flow definition from the editing collaborator.
    pub async fn add_flow(&self, flow: FlowDefinition) {
        self.flows.write().await.insert(flow.id.clone(), flow);
    }

    pub async fn get_flow(&self, id: &FlowId) -> Option<FlowDefinition> {
        self.flows.read().await.get(id).cloned()
    }

    pub async fn list_flows(&self) -> Vec<FlowDefinition> {
        self.flows.read().await.values().cloned().collect()
    }

    pub async fn remove_flow(&self, id: &FlowId) -> Option<FlowDefinition> {
        self.flows.write().await.remove(id)
    }

    /// Copy a registered flow into a reusable template.
    pub async fn save_as_template(
        &self,
        flow_id: &FlowId,
        name: impl Into<String>,
    ) -> Result<FlowDefinition> {
        let mut flows = self.flows.write().await;
        let flow = flows
            .get(flow_id)
            .ok_or_else(|| EngineError::FlowNotFound(flow_id.clone()))?;

        let saved = template::save_as_template(flow, name);
        flows.insert(saved.id.clone(), saved.clone());

        tracing::info!("Saved flow {} as template {}", flow_id, saved.id);
        Ok(saved)
    }

    /// Produce and register an independent draft copy of a template.
    pub async fn instantiate_template(&self, template_id: &FlowId) -> Result<FlowDefinition> {
        let mut flows = self.flows.write().await;
        let found = flows
            .get(template_id)
            .filter(|f| f.is_template)
            .ok_or_else(|| EngineError::TemplateNotFound(template_id.clone()))?;

        let draft = template::instantiate_copy(found);
        flows.insert(draft.id.clone(), draft.clone());

        tracing::info!("Instantiated template {} as draft {}", template_id, draft.id);
        Ok(draft)
    }

    /// Start one run of a flow: validate the graph, instantiate its task
    /// instances under a fresh [`RunId`], and commit them.
    pub async fn start_flow(&self, flow_id: &FlowId) -> Result<Vec<TaskInstance>> {
        let mut flows = self.flows.write().await;
        let flow = flows
            .get_mut(flow_id)
            .ok_or_else(|| EngineError::FlowNotFound(flow_id.clone()))?;

        let report = flow::validate(flow);
        if !report.is_valid {
            return Err(EngineError::InvalidFlow {
                id: flow_id.clone(),
                errors: report.errors,
            }
            .into());
        }

        let run_id = RunId::new();
        let instances = flow::instantiate(flow, run_id);
        flow.status = FlowStatus::Active;

        self.tasks.write().await.extend(instances.iter().cloned());

        tracing::info!(
            "Started flow {}: run_id={}, tasks={}",
            flow_id,
            run_id,
            instances.len()
        );
        Ok(instances)
    }

    /// Complete a task and commit the resulting cascade atomically.
    ///
    /// Returns `None` when the task is already completed: repeating a
    /// completion is a no-op, not an error.
    pub async fn complete_task(&self, task_id: TaskId) -> Result<Option<CompletionDelta>> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(EngineError::TaskNotFound(task_id))?
            .clone();

        if task.status == TaskStatus::Completed {
            tracing::warn!("Task {} is already completed, ignoring", task_id);
            return Ok(None);
        }

        // Cascade readiness is evaluated against this run only.
        let run_tasks: Vec<TaskInstance> = tasks
            .iter()
            .filter(|t| t.run_id == task.run_id)
            .cloned()
            .collect();

        let delta = flow::complete(&task, &run_tasks);

        // Single atomic merge while still holding the write lock.
        for updated in std::iter::once(&delta.updated).chain(delta.triggered.iter()) {
            if let Some(slot) = tasks.iter_mut().find(|t| t.id == updated.id) {
                *slot = updated.clone();
            }
        }

        tracing::info!(
            "Completed task {}: triggered {} dependent(s)",
            task_id,
            delta.triggered.len()
        );
        Ok(Some(delta))
    }

    /// Manually force a task to `active`, outside the dependency cascade.
    pub async fn activate_task(&self, task_id: TaskId) -> Result<TaskInstance> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(EngineError::TaskNotFound(task_id))?
            .clone();

        let updated = flow::activate(&task);
        if let Some(slot) = tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = updated.clone();
        }

        Ok(updated)
    }

    pub async fn get_task(&self, task_id: TaskId) -> Option<TaskInstance> {
        self.tasks.read().await.iter().find(|t| t.id == task_id).cloned()
    }

    /// Task instances of one run, for timeline and calendar display.
    pub async fn tasks_for_run(&self, run_id: RunId) -> Vec<TaskInstance> {
        self.tasks
            .read()
            .await
            .iter()
            .filter(|t| t.run_id == run_id)
            .cloned()
            .collect()
    }

    pub async fn list_tasks(&self) -> Vec<TaskInstance> {
        self.tasks.read().await.clone()
    }
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::new()
    }
}
