use serde::{Deserialize, Serialize};

/// Final result of one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub summary_message: String,
    pub saved_count: u64,
    pub errors: Vec<String>,
}

impl OperationResult {
    pub fn succeeded(summary_message: impl Into<String>, saved_count: u64, errors: Vec<String>) -> Self {
        Self {
            success: true,
            summary_message: summary_message.into(),
            saved_count,
            errors,
        }
    }

    pub fn failed(summary_message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            summary_message: summary_message.into(),
            saved_count: 0,
            errors,
        }
    }

    /// Successful run that still reported warnings
    pub fn has_warnings(&self) -> bool {
        self.success && !self.errors.is_empty()
    }
}
