use baurat_agent::instruction::{build_instruction, build_system_prompt};
use baurat_core::types::{AgentProfile, RegulationQuery, TaskConfig, TaskContext};

fn agent() -> AgentProfile {
    AgentProfile {
        key: "legal_analyst".into(),
        role: "Regulatory Legal Analyst".into(),
        goal: "Interpret regulatory hierarchy".into(),
        backstory: "You are a legal expert.".into(),
        tools: Vec::new(),
    }
}

fn task() -> TaskConfig {
    TaskConfig {
        name: "legal_hierarchy".into(),
        label: "Legal Hierarchy Analysis".into(),
        description: "  Analyze the regulatory hierarchy.\n".into(),
        expected_output: "Precedence rules".into(),
        agent: "legal_analyst".into(),
        context: vec!["document_research".into()],
        notes: Vec::new(),
    }
}

fn ctx(upstream: Vec<(String, String)>) -> TaskContext {
    TaskContext {
        query: RegulationQuery::new("q"),
        model: "gpt-4".into(),
        temperature: 0.1,
        upstream,
    }
}

#[test]
fn test_system_prompt_contains_persona() {
    let s = build_system_prompt(&agent());
    assert!(s.starts_with("You are the Regulatory Legal Analyst."));
    assert!(s.contains("Goal: Interpret regulatory hierarchy"));
    assert!(s.ends_with("You are a legal expert."));
}

#[test]
fn test_system_prompt_skips_empty_fields() {
    let bare = AgentProfile {
        goal: String::new(),
        backstory: String::new(),
        ..agent()
    };
    assert_eq!(build_system_prompt(&bare), "You are the Regulatory Legal Analyst.");
}

#[test]
fn test_instruction_starts_with_marker() {
    let s = build_instruction(&task(), &ctx(Vec::new()));
    assert!(s.starts_with("Task [legal_hierarchy] Legal Hierarchy Analysis\n\nAnalyze the regulatory hierarchy."));
    assert!(s.contains("Expected output: Precedence rules"));
    assert!(!s.contains("Context from"));
}

#[test]
fn test_instruction_injects_upstream_verbatim_in_order() {
    let upstream = vec![
        ("Document Research".to_string(), "found LBO § 5\n\nand § 37".to_string()),
        ("Technical Analysis".to_string(), "DIN 18040".to_string()),
    ];
    let s = build_instruction(&task(), &ctx(upstream));
    let research = s.find("## Context from Document Research\n\nfound LBO § 5\n\nand § 37").unwrap();
    let technical = s.find("## Context from Technical Analysis\n\nDIN 18040").unwrap();
    assert!(research < technical);
}

#[test]
fn test_notes_precede_upstream_context() {
    let t = task().with_note("Regulatory hierarchy", "Primary regulatory level: LOCAL level regulations identified\n");
    let s = build_instruction(&t, &ctx(vec![("Document Research".into(), "docs".into())]));
    let note = s.find("## Regulatory hierarchy\n\nPrimary regulatory level").unwrap();
    let context = s.find("## Context from Document Research").unwrap();
    assert!(note < context);
}
