use crate::errors::{ExtractionError, ExtractionResult};
use crate::models::live_stats::{LiveStats, LiveStatsProjection};
use crate::models::log_entry::{LogLedger, Severity};
use crate::models::outcome::OperationResult;
use crate::models::phase::{Phase, PhaseState};
use chrono::{DateTime, Local};

/// Every transition the extraction console can go through
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerAction {
    /// Clears ledger, stats and result and marks a run as active
    RunStarted,
    LogAppended {
        timestamp: DateTime<Local>,
        phase: Phase,
        message: String,
        severity: Severity,
        details: Option<String>,
    },
    PhaseAdvanced(Phase),
    StatsUpdated(LiveStats),
    /// Stores the final result and marks the run as finished
    RunCompleted(OperationResult),
    ResultDismissed,
    /// Console "clear" button: empties everything shown
    ConsoleCleared,
}

impl TrackerAction {
    pub fn log(phase: Phase, message: impl Into<String>, severity: Severity, details: Option<String>) -> Self {
        TrackerAction::LogAppended {
            timestamp: Local::now(),
            phase,
            message: message.into(),
            severity,
            details,
        }
    }
}

/// Everything the extraction console renders, owned by one tracker
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    ledger: LogLedger,
    phase: PhaseState,
    stats: LiveStatsProjection,
    result: Option<OperationResult>,
    running: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &LogLedger {
        &self.ledger
    }

    pub fn phase(&self) -> &PhaseState {
        &self.phase
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.phase.current()
    }

    pub fn stats(&self) -> &LiveStatsProjection {
        &self.stats
    }

    pub fn result(&self) -> Option<&OperationResult> {
        self.result.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Single transition function for the console state
    ///
    /// Only `RunStarted` can be rejected: a run may not start while another
    /// one is active. Clearing the console mid-run is ignored.
    pub fn apply(&mut self, action: TrackerAction) -> ExtractionResult<()> {
        match action {
            TrackerAction::RunStarted => {
                if self.running {
                    return Err(ExtractionError::RunInProgress);
                }
                self.ledger.clear();
                self.stats.clear();
                self.result = None;
                self.phase.reset();
                self.running = true;
            }
            TrackerAction::LogAppended {
                timestamp,
                phase,
                message,
                severity,
                details,
            } => {
                self.ledger.append_at(timestamp, phase, message, severity, details);
            }
            TrackerAction::PhaseAdvanced(phase) => self.phase.set_phase(phase),
            TrackerAction::StatsUpdated(stats) => self.stats.update(stats),
            TrackerAction::RunCompleted(result) => {
                self.result = Some(result);
                self.running = false;
            }
            TrackerAction::ResultDismissed => self.result = None,
            TrackerAction::ConsoleCleared => {
                if !self.running {
                    self.ledger.clear();
                    self.phase.reset();
                    self.stats.clear();
                    self.result = None;
                }
            }
        }
        Ok(())
    }
}
