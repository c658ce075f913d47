pub mod backend;
pub mod config;
pub mod delay;
pub mod facilities;
pub mod format;
pub mod live_stats;
pub mod log_entry;
pub mod orchestrator;
pub mod outcome;
pub mod payload;
pub mod phase;
pub mod request;
pub mod state;

#[cfg(test)]
mod http_integration_tests;

pub use backend::{ConnectionStatus, Credential, ExtractionBackend, HttpBackend};
pub use config::{ClientConfig, TrackerConfig};
pub use delay::{NoDelay, PhaseDelay, RecordingDelay, TokioDelay};
pub use facilities::{FACILITIES, Facility, FacilityKind, display_name, find_by_cnes};
pub use format::{format_brl, format_elapsed};
pub use live_stats::{LiveStats, LiveStatsProjection};
pub use log_entry::{LogEntry, LogLedger, Severity};
pub use orchestrator::{ExtractionOrchestrator, TrackerObserver};
pub use outcome::OperationResult;
pub use payload::{ConnectionTestResponse, ExtractionResponse, ExtractionStats};
pub use phase::{PHASE_SEQUENCE, Phase, PhaseState, PhaseStatus};
pub use request::{Cnes, Competencia, ExtractionRequest};
pub use state::{TrackerAction, TrackerState};
