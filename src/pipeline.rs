//! Step budget for the staged pipelines.
//!
//! The wiki orchestrator and the documentation agent are linear state
//! machines. Each stage transition spends one step; a run that would exceed
//! the budget fails with [`DocumateError::StepLimitExceeded`] instead of
//! looping.

use tracing::info;

use crate::constants::pipeline::MAX_STEPS;
use crate::types::{DocumateError, Result};

#[derive(Debug, Clone)]
pub struct StepBudget {
    limit: usize,
    taken: usize,
}

impl Default for StepBudget {
    fn default() -> Self {
        Self::new(MAX_STEPS)
    }
}

impl StepBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, taken: 0 }
    }

    /// Spend one step to enter `stage`
    pub fn enter(&mut self, stage: &str) -> Result<()> {
        if self.taken >= self.limit {
            return Err(DocumateError::StepLimitExceeded { limit: self.limit });
        }
        self.taken += 1;
        info!("[{}/{}] {}", self.taken, self.limit, stage);
        Ok(())
    }

    pub fn taken(&self) -> usize {
        self.taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_counts_steps() {
        let mut budget = StepBudget::new(3);
        budget.enter("one").unwrap();
        budget.enter("two").unwrap();
        assert_eq!(budget.taken(), 2);
    }

    #[test]
    fn test_budget_exhaustion() {
        let mut budget = StepBudget::new(2);
        budget.enter("a").unwrap();
        budget.enter("b").unwrap();
        assert!(matches!(
            budget.enter("c"),
            Err(DocumateError::StepLimitExceeded { limit: 2 })
        ));
        assert_eq!(budget.taken(), 2);
    }

    #[test]
    fn test_default_limit() {
        let mut budget = StepBudget::default();
        for _ in 0..MAX_STEPS {
            budget.enter("stage").unwrap();
        }
        assert!(budget.enter("one too many").is_err());
    }
}
