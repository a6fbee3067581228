pub mod analysis;
pub mod scan;
pub mod upload;

pub use analysis::{AnalysisResult, ScoreBand};
pub use scan::{ScanRecord, SCAN_STORAGE_KEY};
pub use upload::{UploadedFile, PDF_MEDIA_TYPE};
