use crate::schedule;
use crate::types::{TaskInstance, TaskStatus};
use chrono::Utc;

/// Delta produced by completing one task. The caller merges `updated` and
/// `triggered` into the authoritative collection as a single atomic write.
#[derive(Debug, Clone)]
pub struct CompletionDelta {
    pub updated: TaskInstance,
    pub triggered: Vec<TaskInstance>,
}

/// Compute the effect of completing `task` within its run.
///
/// Precondition: `task` is not already `completed` and `all_in_run` holds
/// every instance of the same run (callers check status and no-op
/// otherwise). The input collection is not mutated; this is a pure delta.
///
/// Cascade rule: every other instance whose dependency set contains the
/// completed id and whose status is `pending` is re-evaluated. It triggers
/// to `active` when each of its dependencies is either the task completed
/// right now or an instance already in `completed` status. Dependents that
/// are not `pending` are left untouched, so the cascade is idempotent.
pub fn complete(task: &TaskInstance, all_in_run: &[TaskInstance]) -> CompletionDelta {
    let now = Utc::now();

    let updated = TaskInstance {
        status: TaskStatus::Completed,
        completed_at: Some(now),
        updated_at: now,
        ..task.clone()
    };

    let triggered = all_in_run
        .iter()
        .filter(|dep| dep.status == TaskStatus::Pending)
        .filter(|dep| dep.dependencies.contains(&task.id))
        .filter(|dep| {
            dep.dependencies.iter().all(|dep_id| {
                // The task completed right now satisfies itself; everything
                // else must already be completed.
                *dep_id == task.id
                    || all_in_run
                        .iter()
                        .find(|t| t.id == *dep_id)
                        .is_some_and(|t| t.status == TaskStatus::Completed)
            })
        })
        .map(|dep| TaskInstance {
            status: TaskStatus::Active,
            scheduled_date: Some(schedule::resolve(&dep.scheduling_rule, now)),
            updated_at: now,
            ..dep.clone()
        })
        .collect();

    CompletionDelta { updated, triggered }
}

/// Force a task to `active` outside the dependency cascade (manual start).
pub fn activate(task: &TaskInstance) -> TaskInstance {
    TaskInstance {
        status: TaskStatus::Active,
        updated_at: Utc::now(),
        ..task.clone()
    }
}
