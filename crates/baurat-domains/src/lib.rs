pub mod regulation;

use baurat_core::types::{AgentProfile, TaskConfig};

pub use regulation::crew::RegulationCrew;

// ── Shared builders ──────────────────────────────────────────────────────

/// Create a persona with no tool capabilities.
pub(crate) fn persona(key: &str, role: &str, goal: &str, backstory: &str) -> AgentProfile {
    AgentProfile {
        key: key.into(),
        role: role.into(),
        goal: goal.into(),
        backstory: backstory.into(),
        tools: Vec::new(),
    }
}

/// Create a task bound to an agent with the four most common fields.
pub(crate) fn agent_task(
    name: &str,
    label: &str,
    agent: &str,
    description: String,
    expected_output: &str,
) -> TaskConfig {
    TaskConfig {
        name: name.into(),
        label: label.into(),
        description,
        expected_output: expected_output.into(),
        agent: agent.into(),
        context: Vec::new(),
        notes: Vec::new(),
    }
}
