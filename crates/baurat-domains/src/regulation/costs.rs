//! Rule-table compliance cost estimator.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostFactor {
    pub name: &'static str,
    pub multiplier: f64,
    pub weeks: u32,
}

pub const COST_FACTORS: [CostFactor; 5] = [
    CostFactor { name: "accessibility", multiplier: 1.1, weeks: 2 },
    CostFactor { name: "fire_safety", multiplier: 1.15, weeks: 3 },
    CostFactor { name: "energy_efficiency", multiplier: 1.2, weeks: 4 },
    CostFactor { name: "parking", multiplier: 1.05, weeks: 1 },
    CostFactor { name: "setback", multiplier: 1.02, weeks: 1 },
];

pub const STANDARD: &str = "Standard compliance requirements. Estimated timeline: 2-4 weeks.";

/// Factors whose name occurs in `text` (case-insensitive), in table order.
pub fn matching_factors(text: &str) -> Vec<CostFactor> {
    let haystack = text.to_lowercase();
    COST_FACTORS
        .into_iter()
        .filter(|f| haystack.contains(f.name))
        .collect()
}

/// Summarize the cost and schedule impact of the factors named in `text`.
pub fn estimate(text: &str) -> String {
    let factors = matching_factors(text);
    if factors.is_empty() {
        return STANDARD.to_string();
    }

    // Multiply in table order from 1.0 so the rounding is stable.
    let multiplier = factors.iter().fold(1.0_f64, |acc, f| acc * f.multiplier);
    let weeks: u32 = factors.iter().map(|f| f.weeks).sum();
    let names: Vec<&str> = factors.iter().map(|f| f.name).collect();

    format!(
        "Compliance factors: {}. Estimated cost impact: +{:.1}%. Timeline: {} weeks additional.",
        names.join(", "),
        (multiplier - 1.0) * 100.0,
        weeks
    )
}

/// Normalize free text so multi-word requirements line up with factor names:
/// lowercase, with words split on whitespace or hyphens rejoined by `_`.
///
/// "Fire safety" becomes "fire_safety"; the whole text becomes one token.
pub fn requirement_keys(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
