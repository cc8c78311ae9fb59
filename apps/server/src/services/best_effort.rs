use crate::error::AppResult;

/// Outcome of a side effect whose failure is logged and never propagated.
///
/// Returned by operations that must not block or fail the caller (tester
/// registration, error notifications). Dropping it is always fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort {
    Done,
    Skipped,
    Failed(String),
}

impl BestEffort {
    pub fn is_done(&self) -> bool {
        matches!(self, BestEffort::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BestEffort::Failed(_))
    }
}

impl From<AppResult<()>> for BestEffort {
    fn from(result: AppResult<()>) -> Self {
        match result {
            Ok(()) => BestEffort::Done,
            Err(e) => BestEffort::Failed(e.to_string()),
        }
    }
}
