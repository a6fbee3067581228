// Upload workflow: validate → gate → simulated analysis → display.
// The analyzer, delay, and both UI surfaces are injected as trait objects.

pub mod analyzer;
pub mod controller;
pub mod delay;
pub mod surface;

pub use analyzer::{Analyzer, StaticAnalyzer};
pub use controller::{IntakeController, IntakeReport, IntakeState};
pub use delay::{AnalysisDelay, FixedDelay, NoDelay};
pub use surface::{ModalState, ModalVisibility, Notice, NoticeLog, Notifier, ResultDisplay, Severity};
