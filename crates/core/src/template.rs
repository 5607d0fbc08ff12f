// Reusable flow templates

use crate::types::{FlowDefinition, FlowId, FlowStatus};
use chrono::Utc;

/// Copy a flow definition into a reusable template under a fresh identity.
/// The original flow is left untouched.
pub fn save_as_template(flow: &FlowDefinition, name: impl Into<String>) -> FlowDefinition {
    FlowDefinition {
        id: FlowId::generate(),
        name: name.into(),
        is_template: true,
        status: FlowStatus::Draft,
        created_at: Utc::now(),
        ..flow.clone()
    }
}

/// Produce an independent draft copy of a template. The copy has its own
/// identity and is decoupled from the template's lifecycle: runs started
/// from it never touch the template.
pub fn instantiate_copy(template: &FlowDefinition) -> FlowDefinition {
    FlowDefinition {
        id: FlowId::generate(),
        name: format!("{} (Copy)", template.name),
        is_template: false,
        status: FlowStatus::Draft,
        created_at: Utc::now(),
        ..template.clone()
    }
}
