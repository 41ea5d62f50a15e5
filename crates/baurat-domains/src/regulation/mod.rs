pub mod costs;
pub mod crew;
pub mod hierarchy;
pub mod index;

use baurat_core::{
    retrieval::SearchOutcome,
    types::{AgentProfile, RegulationQuery, TaskConfig},
};

use crate::{agent_task, persona};

pub const DOCUMENT_RESEARCH: &str = "document_research";
pub const LEGAL_HIERARCHY: &str = "legal_hierarchy";
pub const TECHNICAL_ANALYSIS: &str = "technical_analysis";
pub const COMPLIANCE_STRATEGY: &str = "compliance_strategy";
pub const SYNTHESIS: &str = "synthesis";

/// The five crew personas, in the order their tasks run.
pub fn agents() -> Vec<AgentProfile> {
    vec![
        persona(
            "document_specialist",
            "Document Research Specialist",
            "Find and analyze relevant building regulations from Stuttgart's comprehensive database",
            DOCUMENT_SPECIALIST_BACKSTORY,
        ),
        persona(
            "legal_analyst",
            "Regulatory Legal Analyst",
            "Interpret regulatory hierarchy and resolve conflicts between different levels of regulation",
            LEGAL_ANALYST_BACKSTORY,
        ),
        persona(
            "technical_expert",
            "Technical Standards Expert",
            "Analyze technical requirements including DIN standards, accessibility, and safety regulations",
            TECHNICAL_EXPERT_BACKSTORY,
        ),
        persona(
            "compliance_strategist",
            "Compliance Strategy Advisor",
            "Develop cost-effective compliance strategies and assess risks",
            COMPLIANCE_STRATEGIST_BACKSTORY,
        ),
        persona(
            "synthesis_manager",
            "Professional Synthesis Manager",
            "Integrate all analyses into comprehensive, actionable recommendations",
            SYNTHESIS_MANAGER_BACKSTORY,
        ),
    ]
}

/// Deterministic tool output gathered before the agents run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Findings {
    /// Rendered retrieval outcome (documents, "no results", or the error).
    pub documents: String,
    pub hierarchy: String,
    pub costs: String,
}

impl Findings {
    pub fn gather(query: &RegulationQuery, outcome: &SearchOutcome) -> Self {
        let documents = outcome.render();
        let hierarchy = hierarchy::classify(&format!(
            "{} {} {} {}",
            query.query, query.location, query.district, documents
        ));
        let costs = costs::estimate(&costs::requirement_keys(&format!(
            "{} {}",
            query.query, query.project_type
        )));
        Self {
            documents,
            hierarchy,
            costs,
        }
    }
}

/// Build the five tasks for one query with their context wiring:
/// research feeds everything, legal and technical feed strategy, and
/// synthesis reads all four.
pub fn build_tasks(query: &RegulationQuery, findings: &Findings) -> Vec<TaskConfig> {
    vec![
        agent_task(
            DOCUMENT_RESEARCH,
            "Document Research",
            "document_specialist",
            research_description(query),
            "Comprehensive list of relevant regulations with precise citations and content excerpts",
        )
        .with_note("Retrieved documents", &findings.documents),
        agent_task(
            LEGAL_HIERARCHY,
            "Legal Hierarchy Analysis",
            "legal_analyst",
            legal_description(query),
            "Legal hierarchy analysis with precedence rules and conflict resolution guidance",
        )
        .with_context(&[DOCUMENT_RESEARCH])
        .with_note("Regulatory hierarchy", &findings.hierarchy),
        agent_task(
            TECHNICAL_ANALYSIS,
            "Technical Standards Analysis",
            "technical_expert",
            technical_description(query),
            "Technical requirements summary with implementation guidance and compliance criteria",
        )
        .with_context(&[DOCUMENT_RESEARCH]),
        agent_task(
            COMPLIANCE_STRATEGY,
            "Compliance Strategy",
            "compliance_strategist",
            compliance_description(query),
            "Compliance strategy with cost analysis, timeline, and risk assessment",
        )
        .with_context(&[DOCUMENT_RESEARCH, LEGAL_HIERARCHY, TECHNICAL_ANALYSIS])
        .with_note("Compliance cost estimate", &findings.costs),
        agent_task(
            SYNTHESIS,
            "Synthesis",
            "synthesis_manager",
            synthesis_description(query),
            "Professional consultation report with executive summary, detailed analysis, and actionable recommendations",
        )
        .with_context(&[
            DOCUMENT_RESEARCH,
            LEGAL_HIERARCHY,
            TECHNICAL_ANALYSIS,
            COMPLIANCE_STRATEGY,
        ]),
    ]
}

fn research_description(q: &RegulationQuery) -> String {
    format!(
        "Research all relevant building regulations for: {query}\
\nProject details:\
\n- Type: {project_type}\
\n- Location: {location}\
\n- District: {district}\
\n- Urgency: {urgency}\
\n\
\nUse the retrieved documents below to find regulations from:\
\n1. Federal level (BauGB, DIN standards)\
\n2. State level (LBO Baden-Württemberg)\
\n3. Local level (Stuttgart municipal regulations)\
\n4. District-specific requirements for {district}\
\n\
\nProvide detailed citations with:\
\n- Document names and file paths\
\n- Page numbers and sections\
\n- Content excerpts\
\n- Legal reference numbers",
        query = q.query,
        project_type = q.project_type,
        location = q.location,
        district = q.district,
        urgency = q.urgency,
    )
}

fn legal_description(q: &RegulationQuery) -> String {
    format!(
        "Analyze the regulatory hierarchy for the regulations found by document research.\
\n\
\nDetermine:\
\n1. Which regulations take precedence (federal > state > local)\
\n2. Any conflicts between different regulatory levels\
\n3. How local Stuttgart regulations interact with state LBO BW\
\n4. Special provisions for {district} district\
\n5. Override conditions where local rules supersede state rules\
\n\
\nProvide clear guidance on regulatory priority and conflict resolution.",
        district = q.district,
    )
}

fn technical_description(q: &RegulationQuery) -> String {
    format!(
        "Analyze technical requirements for: {query}\
\n\
\nFocus on technical standards including:\
\n1. DIN standards (accessibility DIN 18040, sound insulation DIN 4109, etc.)\
\n2. Fire safety requirements for {project_type}\
\n3. Energy efficiency standards (EnEV/GEG)\
\n4. Structural and safety requirements\
\n5. Building physics requirements\
\n\
\nTranslate technical standards into practical implementation requirements with specific compliance criteria.",
        query = q.query,
        project_type = q.project_type,
    )
}

fn compliance_description(q: &RegulationQuery) -> String {
    format!(
        "Develop a comprehensive compliance strategy for: {query}\
\n\
\nStarting from the cost estimate below, assess:\
\n1. Cost implications of different compliance approaches\
\n2. Timeline requirements for permits and approvals\
\n3. Risk assessment for non-compliance scenarios\
\n4. Alternative compliance methods where permitted\
\n5. Cost multipliers for accessibility, fire safety, energy efficiency\
\n6. Estimated additional timeline (weeks) for each requirement\
\n\
\nProvide detailed cost-benefit analysis and strategic recommendations.",
        query = q.query,
    )
}

fn synthesis_description(q: &RegulationQuery) -> String {
    format!(
        "Synthesize all previous analyses into a professional consultation report for: {query}\
\n\
\nIntegrate findings from:\
\n- Document research results\
\n- Legal hierarchy analysis\
\n- Technical requirements assessment\
\n- Compliance strategy recommendations\
\n\
\nCreate a comprehensive response including:\
\n1. Executive Summary with key requirements\
\n2. Detailed regulatory analysis with precise citations\
\n3. Step-by-step compliance roadmap\
\n4. Cost and timeline estimates with breakdowns\
\n5. Risk factors and mitigation strategies\
\n6. Required forms and documents list\
\n7. Next steps and recommended actions\
\n8. Professional recommendations for implementation\
\n\
\nFormat as a professional consultation report suitable for architects, developers, or city officials.",
        query = q.query,
    )
}

const DOCUMENT_SPECIALIST_BACKSTORY: &str =
    "You are an expert at navigating complex German building regulation\
\ndocuments. You can quickly identify the most relevant regulations for any building\
\nproject and extract precise citations and requirements.";

const LEGAL_ANALYST_BACKSTORY: &str =
    "You are a legal expert specializing in German building law. You understand\
\nthe complex interplay between federal (BauGB), state (LBO BW), and municipal regulations.\
\nYou can determine which regulations take precedence and identify potential conflicts.";

const TECHNICAL_EXPERT_BACKSTORY: &str =
    "You are a technical expert who understands DIN standards, accessibility\
\nrequirements (DIN 18040), fire safety regulations, and energy efficiency standards.\
\nYou translate technical requirements into practical implementation guidance.";

const COMPLIANCE_STRATEGIST_BACKSTORY: &str =
    "You are a seasoned building industry professional who helps developers\
\nand architects navigate compliance requirements efficiently. You understand the practical\
\nand financial implications of different regulatory approaches.";

const SYNTHESIS_MANAGER_BACKSTORY: &str =
    "You are a senior building regulation consultant who synthesizes complex\
\nregulatory analysis into clear, professional recommendations. You provide decision-makers\
\nwith the information they need to move forward confidently.";
