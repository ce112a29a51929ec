use crate::document::Passage;
use crate::types::AdmissionPolicy;

use super::tokenizer::TokenCounter;

pub struct BudgetResult {
    pub admitted: Vec<Passage>,
    pub tokens_counted: usize,
    pub tokens_admitted: usize,
    pub passages_considered: usize,
    pub passages_excluded_by_budget: usize,
}

pub fn apply_budget<T, I>(
    candidates: I,
    counter: &T,
    token_limit: usize,
    policy: AdmissionPolicy,
) -> BudgetResult
where
    T: TokenCounter + ?Sized,
    I: IntoIterator<Item = Passage>,
{
    let mut admitted = Vec::new();
    let mut tokens_counted: usize = 0;
    let mut tokens_admitted: usize = 0;
    let mut passages_considered = 0;
    let mut passages_excluded_by_budget = 0;

    for passage in candidates {
        passages_considered += 1;
        let tokens = counter.count_tokens(passage.content());

        // Add first, then test. Never split a passage to make it fit.
        let total = tokens_counted.saturating_add(tokens);
        if total < token_limit {
            tokens_counted = total;
            tokens_admitted += tokens;
            admitted.push(passage);
        } else {
            if policy == AdmissionPolicy::Cumulative {
                tokens_counted = total;
            }
            passages_excluded_by_budget += 1;
        }
    }

    BudgetResult {
        admitted,
        tokens_counted,
        tokens_admitted,
        passages_considered,
        passages_excluded_by_budget,
    }
}
