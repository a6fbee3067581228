//! Daily scan gate — one successful scan per calendar day per device.
//!
//! The gate is the only component that touches the persisted `ScanRecord`.
//! Storage goes through `ScanStore`, "today" comes from `Clock`; both are
//! injected so tests run against an in-memory map and a fixed date.

pub mod clock;
pub mod scan_gate;
pub mod store;

pub use clock::{Clock, FixedClock, LocalClock};
pub use scan_gate::{DateLabel, ScanGate};
pub use store::{JsonFileStore, MemoryStore, ScanStore};
