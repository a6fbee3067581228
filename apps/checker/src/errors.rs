use thiserror::Error;

use crate::gate::DateLabel;
use crate::intake::surface::{Notice, Severity};

/// Failures of the persisted scan store.
/// The gate never surfaces these to the user; it logs them and fails open.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Intake-level error type.
/// Every variant is locally recoverable and maps to a user-facing `Notice`.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid file type: {media_type}")]
    InvalidFileType { media_type: String },

    #[error("Daily limit reached, next scan on {next_scan_date}")]
    DailyLimitReached { next_scan_date: DateLabel },

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Another scan is still in progress")]
    Busy,
}

impl IntakeError {
    pub fn to_notice(&self) -> Notice {
        match self {
            IntakeError::InvalidFileType { .. } => Notice {
                severity: Severity::Destructive,
                title: "Invalid file type".to_string(),
                description: "Please upload a PDF file only.".to_string(),
            },
            IntakeError::DailyLimitReached { next_scan_date } => Notice {
                severity: Severity::Destructive,
                title: "Daily limit reached".to_string(),
                description: format!(
                    "You can only upload one resume per day. Come back tomorrow ({next_scan_date})."
                ),
            },
            IntakeError::Busy => Notice {
                severity: Severity::Normal,
                title: "Analysis in progress".to_string(),
                description: "Please wait for your current resume to finish.".to_string(),
            },
            IntakeError::Analysis(msg) => {
                tracing::error!("Analysis error: {msg}");
                Notice {
                    severity: Severity::Destructive,
                    title: "Analysis failed".to_string(),
                    description: "We couldn't analyze your resume. Please try again later."
                        .to_string(),
                }
            }
        }
    }
}
