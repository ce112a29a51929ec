use serde::{Deserialize, Serialize};

use crate::document::Passage;

/// How a rejected candidate's tokens affect the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Add every candidate's tokens to the running total, then admit while
    /// the total stays strictly below the limit. Rejected candidates keep
    /// counting against later ones.
    #[default]
    Cumulative,
    /// Add tentatively; a rejected candidate's tokens are rolled back.
    Rollback,
}

/// Metadata describing the outcome of a budgeting pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetMetadata {
    pub model_id: String,
    pub token_limit: usize,
    pub policy: AdmissionPolicy,

    /// Final value of the running counter.
    pub tokens_counted: usize,
    /// Sum of the admitted passages' own token counts.
    pub tokens_admitted: usize,

    pub passages_considered: usize,
    pub passages_admitted: usize,
    pub passages_excluded_by_budget: usize,
}

/// Passages admitted into the context, in candidate order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetedContext {
    pub passages: Vec<Passage>,
    pub budget: BudgetMetadata,
}

impl BudgetedContext {
    pub fn into_passages(self) -> Vec<Passage> {
        self.passages
    }
}
