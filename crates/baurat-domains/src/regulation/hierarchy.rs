//! Jurisdiction-level classifier for German building regulation text.

/// Regulatory levels in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Federal,
    State,
    Local,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Federal => "FEDERAL",
            Level::State => "STATE",
            Level::Local => "LOCAL",
        }
    }

    /// Markers that identify this level, matched as case-insensitive substrings.
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Level::Federal => &["BauGB", "EnEV", "GEG", "DIN", "VDI"],
            Level::State => &["LBO", "Baden-Württemberg", "BW"],
            Level::Local => &["Stuttgart", "Zuffenhausen", "Municipal", "Stadt"],
        }
    }
}

pub const LEVELS: [Level; 3] = [Level::Federal, Level::State, Level::Local];

pub const UNCLEAR: &str = "Regulatory level unclear - recommend consulting multiple sources";

/// Levels with at least one marker present in `text`, in precedence order.
pub fn identified_levels(text: &str) -> Vec<Level> {
    let haystack = text.to_lowercase();
    LEVELS
        .into_iter()
        .filter(|level| {
            level
                .markers()
                .iter()
                .any(|m| haystack.contains(&m.to_lowercase()))
        })
        .collect()
}

/// Describe which regulatory levels `text` touches.
pub fn classify(text: &str) -> String {
    let findings: Vec<String> = identified_levels(text)
        .into_iter()
        .map(|l| format!("{} level regulations identified", l.as_str()))
        .collect();

    match findings.as_slice() {
        [] => UNCLEAR.to_string(),
        [only] => format!("Primary regulatory level: {only}"),
        many => format!(
            "Multiple regulatory levels apply. Hierarchy: {}. Local regulations may override state where specifically permitted.",
            many.join(" > ")
        ),
    }
}
