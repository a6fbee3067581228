use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Output contract of an analyzer. Percentages are whole numbers in 0 – 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub keyword_match: u8,
    pub formatting: u8,
    pub improvements: Vec<String>,
    pub mistakes: Vec<String>,
    pub matched_keywords: BTreeSet<String>,
    pub missing_keywords: BTreeSet<String>,
}

/// Qualitative label shown next to the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => Self::Excellent,
            70..=84 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::NeedsWork,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Match",
            Self::Good => "Good Match",
            Self::Fair => "Fair Match",
            Self::NeedsWork => "Needs Work",
        }
    }
}

impl AnalysisResult {
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    /// Checks that every percentage field lies in 0 – 100.
    pub fn ensure_bounded(&self) -> Result<(), String> {
        for (field, value) in [
            ("score", self.score),
            ("keyword_match", self.keyword_match),
            ("formatting", self.formatting),
        ] {
            if value > 100 {
                return Err(format!("{field} out of range: {value}"));
            }
        }
        Ok(())
    }
}
