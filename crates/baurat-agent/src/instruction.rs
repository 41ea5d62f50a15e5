use baurat_core::types::{AgentProfile, TaskConfig, TaskContext};

/// System prompt for an agent persona.
pub fn build_system_prompt(agent: &AgentProfile) -> String {
    let mut s = format!("You are the {}.", agent.role);
    if !agent.goal.is_empty() {
        s.push_str(&format!("\n\nGoal: {}", agent.goal));
    }
    if !agent.backstory.is_empty() {
        s.push_str("\n\n");
        s.push_str(&agent.backstory);
    }
    s
}

/// Build the user prompt passed to any model backend.
///
/// Composes the task marker and description, the expected output, the
/// task's precomputed notes, and the full output of every declared upstream
/// task. All backends use this so the prompt format stays consistent.
pub fn build_instruction(task: &TaskConfig, ctx: &TaskContext) -> String {
    let mut s = format!("Task {} {}\n\n", task.marker(), task.label);
    s.push_str(task.description.trim());

    if !task.expected_output.is_empty() {
        s.push_str("\n\nExpected output: ");
        s.push_str(&task.expected_output);
    }

    for (title, body) in &task.notes {
        s.push_str(&format!("\n\n---\n\n## {title}\n\n{}", body.trim_end()));
    }

    for (label, output) in &ctx.upstream {
        s.push_str(&format!("\n\n---\n\n## Context from {label}\n\n{output}"));
    }

    s
}
