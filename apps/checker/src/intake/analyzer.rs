//! Analyzer — pluggable producer of the `AnalysisResult` contract.
//!
//! Default: `StaticAnalyzer`, which returns the same fixed report for every
//! file and never reads the content. A real implementation can replace it
//! without touching the controller's state machine.

use async_trait::async_trait;

use crate::errors::IntakeError;
use crate::models::{AnalysisResult, UploadedFile};

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, file: &UploadedFile) -> Result<AnalysisResult, IntakeError>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}

pub struct StaticAnalyzer;

#[async_trait]
impl Analyzer for StaticAnalyzer {
    async fn analyze(&self, _file: &UploadedFile) -> Result<AnalysisResult, IntakeError> {
        Ok(static_result())
    }

    fn backend(&self) -> &'static str {
        "static"
    }
}

/// The fixed report every scan currently produces.
pub fn static_result() -> AnalysisResult {
    AnalysisResult {
        score: 78,
        keyword_match: 85,
        formatting: 72,
        improvements: vec![
            "Add more technical keywords relevant to your field".to_string(),
            "Use standard section headings (Experience, Education, Skills)".to_string(),
            "Include quantifiable achievements with numbers".to_string(),
            "Optimize for ATS by using standard fonts".to_string(),
        ],
        mistakes: vec![
            "Missing contact information in header".to_string(),
            "Using tables or columns that ATS can't read".to_string(),
            "Inconsistent date formatting".to_string(),
        ],
        matched_keywords: ["communication", "problem solving", "project management", "teamwork"]
            .into_iter()
            .map(String::from)
            .collect(),
        missing_keywords: ["agile", "data analysis", "stakeholder management"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}
