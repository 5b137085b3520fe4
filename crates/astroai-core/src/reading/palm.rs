use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::normalizer::Normalize;

/// Which hand was photographed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Hand {
    Left,
    #[default]
    Right,
}

/// Reading of a single palm line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalmLine {
    /// Visual description of the line, e.g. "Long and curved".
    #[serde(rename = "type")]
    pub kind: String,
    pub meaning: String,
    pub advice: String,
}

impl PalmLine {
    fn analyzed(advice: &str) -> Self {
        Self {
            kind: "Analyzed".to_string(),
            meaning: "See summary for details".to_string(),
            advice: advice.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalmReading {
    pub summary: String,
    pub heart_line: PalmLine,
    pub head_line: PalmLine,
    pub life_line: PalmLine,
    pub fate_line: PalmLine,
    pub overall_advice: String,
}

const DEFAULT_SUMMARY: &str = "Your palm carries a story of resilience and quiet strength.";
const DEFAULT_OVERALL_ADVICE: &str = "The stars guide your journey. Trust the process.";

impl Normalize for PalmReading {
    type Context = ();

    fn template(_: &()) -> Self {
        Self {
            summary: DEFAULT_SUMMARY.to_string(),
            heart_line: PalmLine::analyzed("Trust your heart"),
            head_line: PalmLine::analyzed("Follow your mind"),
            life_line: PalmLine::analyzed("Live fully"),
            fate_line: PalmLine::analyzed("Embrace your path"),
            overall_advice: DEFAULT_OVERALL_ADVICE.to_string(),
        }
    }

    fn fallback(raw: &str, ctx: &()) -> Self {
        let raw = raw.trim();
        let mut reading = Self::template(ctx);
        if !raw.is_empty() {
            reading.summary = raw.to_string();
        }
        reading
    }
}
