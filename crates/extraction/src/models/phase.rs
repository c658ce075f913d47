use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of an extraction run, plus the out-of-band `Error` phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Connect,
    Download,
    Filter,
    Process,
    Save,
    Complete,
    Error,
}

/// The fixed order a successful run walks through
pub const PHASE_SEQUENCE: [Phase; 6] = [
    Phase::Connect,
    Phase::Download,
    Phase::Filter,
    Phase::Process,
    Phase::Save,
    Phase::Complete,
];

impl Phase {
    /// Position in [`PHASE_SEQUENCE`]; `None` for `Error`
    pub fn index(self) -> Option<usize> {
        PHASE_SEQUENCE.iter().position(|p| *p == self)
    }

    /// Wire/tag name
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Connect => "connect",
            Phase::Download => "download",
            Phase::Filter => "filter",
            Phase::Process => "process",
            Phase::Save => "save",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }

    /// Label shown in the progress indicator
    pub fn label(self) -> &'static str {
        match self {
            Phase::Connect => "Conectando",
            Phase::Download => "Baixando",
            Phase::Filter => "Filtrando SIGTAP",
            Phase::Process => "Processando",
            Phase::Save => "Salvando",
            Phase::Complete => "Concluído",
            Phase::Error => "Erro",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering status of one phase relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
    Active,
    Pending,
    Error,
}

/// Current phase of the run, `None` before any run
///
/// `set_phase` is unconditional: the orchestrator is trusted to advance in
/// order. Entering `Error` remembers the last sequenced phase so rendering
/// can keep the phases already passed as completed and flag the failing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseState {
    current: Option<Phase>,
    failed_at: Option<Phase>,
}

impl PhaseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Phase> {
        self.current
    }

    /// The sequenced phase that was active when the run failed
    pub fn failed_at(&self) -> Option<Phase> {
        self.failed_at
    }

    pub fn set_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Error => {
                if self.current != Some(Phase::Error) {
                    self.failed_at = self.current;
                }
            }
            _ => self.failed_at = None,
        }
        self.current = Some(phase);
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.failed_at = None;
    }

    pub fn is_failed(&self) -> bool {
        self.current == Some(Phase::Error)
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_some_and(Phase::is_terminal)
    }

    /// Status of `phase` for rendering
    pub fn status_of(&self, phase: Phase) -> PhaseStatus {
        let Some(phase_index) = phase.index() else {
            return if self.is_failed() {
                PhaseStatus::Error
            } else {
                PhaseStatus::Pending
            };
        };

        match self.current {
            None => PhaseStatus::Pending,
            Some(Phase::Error) => match self.failed_at.and_then(Phase::index) {
                Some(failed_index) if phase_index < failed_index => PhaseStatus::Completed,
                Some(failed_index) if phase_index == failed_index => PhaseStatus::Error,
                _ => PhaseStatus::Pending,
            },
            Some(current) => {
                // current is sequenced here, index() is always Some
                let current_index = current.index().unwrap_or(0);
                if phase_index < current_index {
                    PhaseStatus::Completed
                } else if phase_index == current_index {
                    PhaseStatus::Active
                } else {
                    PhaseStatus::Pending
                }
            }
        }
    }

    /// Status of every sequenced phase, in order
    pub fn statuses(&self) -> Vec<(Phase, PhaseStatus)> {
        PHASE_SEQUENCE
            .iter()
            .map(|phase| (*phase, self.status_of(*phase)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_all_pending() {
        let state = PhaseState::new();
        assert_eq!(state.current(), None);
        for (_, status) in state.statuses() {
            assert_eq!(status, PhaseStatus::Pending);
        }
    }

    #[test]
    fn test_status_relative_to_current() {
        let mut state = PhaseState::new();
        state.set_phase(Phase::Process);

        assert_eq!(state.status_of(Phase::Connect), PhaseStatus::Completed);
        assert_eq!(state.status_of(Phase::Filter), PhaseStatus::Completed);
        assert_eq!(state.status_of(Phase::Process), PhaseStatus::Active);
        assert_eq!(state.status_of(Phase::Save), PhaseStatus::Pending);
        assert_eq!(state.status_of(Phase::Complete), PhaseStatus::Pending);
    }

    #[test]
    fn test_complete_marks_complete_active() {
        let mut state = PhaseState::new();
        state.set_phase(Phase::Complete);
        assert!(state.is_terminal());
        assert!(!state.is_failed());
        assert_eq!(state.status_of(Phase::Save), PhaseStatus::Completed);
        assert_eq!(state.status_of(Phase::Complete), PhaseStatus::Active);
    }

    #[test]
    fn test_error_flags_failing_phase() {
        let mut state = PhaseState::new();
        state.set_phase(Phase::Connect);
        state.set_phase(Phase::Download);
        state.set_phase(Phase::Error);

        assert!(state.is_failed());
        assert_eq!(state.failed_at(), Some(Phase::Download));
        assert_eq!(state.status_of(Phase::Connect), PhaseStatus::Completed);
        assert_eq!(state.status_of(Phase::Download), PhaseStatus::Error);
        assert_eq!(state.status_of(Phase::Filter), PhaseStatus::Pending);
        assert_eq!(state.status_of(Phase::Error), PhaseStatus::Error);

        // a repeated error does not lose the failing phase
        state.set_phase(Phase::Error);
        assert_eq!(state.failed_at(), Some(Phase::Download));
    }

    #[test]
    fn test_set_phase_is_unconditional() {
        let mut state = PhaseState::new();
        state.set_phase(Phase::Save);
        state.set_phase(Phase::Connect);
        assert_eq!(state.current(), Some(Phase::Connect));

        state.reset();
        assert_eq!(state.current(), None);
        assert_eq!(state.failed_at(), None);
    }

    #[test]
    fn test_phase_serde_names() {
        assert_eq!(serde_json::to_string(&Phase::Download).unwrap(), "\"download\"");
        assert_eq!(Phase::Filter.to_string(), "filter");
        assert_eq!(Phase::Error.index(), None);
        assert_eq!(Phase::Complete.index(), Some(5));
    }
}
