//! ATS résumé checker core: a once-per-day scan gate over local storage and
//! the upload intake that feeds the result display.

pub mod config;
pub mod errors;
pub mod gate;
pub mod intake;
pub mod models;
pub mod telemetry;

pub use config::Config;
pub use errors::{IntakeError, StoreError};
pub use gate::{DateLabel, ScanGate};
pub use intake::{IntakeController, IntakeReport, IntakeState};
pub use models::{AnalysisResult, UploadedFile};
