use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a flow definition (template or draft)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowId(pub String);

impl FlowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh identity for template copies and drafts created by the engine
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a node within a flow definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an edge within a flow definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one execution of a flow definition.
///
/// Distinct from [`FlowId`]: the same definition may run many times
/// concurrently, and task instances of one run must never be confused with
/// siblings of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a task instance.
///
/// One flow node may spawn many instances across runs, so this is never the
/// originating node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of task a node instantiates into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    Deadline,
}

/// Status of a task instance.
///
/// `Overdue` is never assigned by the execution core; a time-aware external
/// process owns that transition (see [`TaskInstance::is_overdue`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Active,
    Completed,
    Overdue,
}

/// Status of a flow definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
}

/// Policy for turning a reference date into a concrete schedule date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SchedulingRule {
    /// Schedule at the reference date itself
    #[default]
    Immediate,
    /// Offset from the reference date, days applied before hours
    Relative {
        #[serde(default)]
        relative_days: i64,
        #[serde(default)]
        relative_hours: i64,
    },
    /// A fixed date, or the next occurrence of a time of day
    Absolute {
        #[serde(default)]
        specific_date: Option<DateTime<Utc>>,
        /// "HH:MM"
        #[serde(default)]
        specific_time: Option<String>,
    },
    /// Offset in business days (weekends skipped), with an optional time of
    /// day: "morning", "afternoon", or "HH:MM"
    BusinessDay {
        #[serde(default)]
        business_day_offset: i64,
        #[serde(default)]
        time_of_day: Option<String>,
    },
    /// Unrecognized rule kinds resolve as a no-op rather than an error
    #[serde(other)]
    Unknown,
}

/// A flow definition: the template graph of nodes and edges describing a
/// workflow. Produced by the graph-editing collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    pub id: FlowId,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default)]
    pub status: FlowStatus,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// A node in a flow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: NodeId,
    #[serde(default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub data: NodeData,
}

/// Per-node payload carried from the editor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: Option<String>,
    /// Estimated duration in minutes
    pub duration: Option<i64>,
    pub scheduling_rule: Option<SchedulingRule>,
    pub deadline: Option<DateTime<Utc>>,
}

/// A directed dependency edge: `target` depends on `source`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

/// A runtime task record created from one flow node for one run.
///
/// Mutated only by the lifecycle engine (status and timestamps); everything
/// else is fixed at instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInstance {
    pub id: TaskId,
    pub title: String,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub scheduling_rule: SchedulingRule,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    /// Estimated duration in minutes
    pub duration: i64,
    /// Template identity of the definition this instance came from
    pub flow_id: FlowId,
    /// Run-scoping key; dependencies only ever reference instances that
    /// share it
    pub run_id: RunId,
    /// Originating node in the flow definition
    pub node_id: NodeId,
    pub dependencies: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskInstance {
    /// Whether the deadline has passed without completion.
    ///
    /// The core itself never flips a task to [`TaskStatus::Overdue`]; a
    /// periodic external sweep is expected to call this and commit the
    /// transition.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => self.status != TaskStatus::Completed && now > deadline,
            None => false,
        }
    }
}
