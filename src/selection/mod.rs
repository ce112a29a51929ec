pub mod budgeting;
pub mod tokenizer;

use tracing::debug;

use crate::document::Passage;
use crate::types::{AdmissionPolicy, BudgetMetadata, BudgetedContext};
pub use budgeting::{apply_budget, BudgetResult};
pub use tokenizer::{resolve_tokenizer, TiktokenCounter, TokenCounter, UnknownModelError};

/// Admits passages from the front of a relevance-ordered list while the
/// running token count stays below a limit.
pub struct ContextBudgeter<T> {
	model_id: String,
	tokenizer: T,
	policy: AdmissionPolicy,
}

impl ContextBudgeter<TiktokenCounter> {
	/// Budgeter bound to the exact tokenizer of `model_id`.
	pub fn for_model(model_id: &str) -> Result<Self, UnknownModelError> {
		let tokenizer = resolve_tokenizer(model_id)?;
		Ok(Self::new(model_id, tokenizer))
	}
}

impl<T> ContextBudgeter<T>
where
	T: TokenCounter,
{
	pub fn new(model_id: impl Into<String>, tokenizer: T) -> Self {
		Self {
			model_id: model_id.into(),
			tokenizer,
			policy: AdmissionPolicy::default(),
		}
	}

	pub fn with_policy(mut self, policy: AdmissionPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn policy(&self) -> AdmissionPolicy {
		self.policy
	}

	pub fn filter(&self, candidates: Vec<Passage>, token_limit: usize) -> BudgetedContext {
		let BudgetResult {
			admitted,
			tokens_counted,
			tokens_admitted,
			passages_considered,
			passages_excluded_by_budget,
		} = apply_budget(candidates, &self.tokenizer, token_limit, self.policy);

		debug!(
			model_id = %self.model_id,
			token_limit,
			tokens_counted,
			admitted = admitted.len(),
			excluded = passages_excluded_by_budget,
			"applied context budget"
		);

		let budget = BudgetMetadata {
			model_id: self.model_id.clone(),
			token_limit,
			policy: self.policy,
			tokens_counted,
			tokens_admitted,
			passages_considered,
			passages_admitted: admitted.len(),
			passages_excluded_by_budget,
		};

		BudgetedContext {
			passages: admitted,
			budget,
		}
	}
}

/// Keep the passages of `candidates` that fit under `token_limit` tokens of
/// `model_id`'s tokenizer, in their original order.
///
/// Each candidate's token count is added to the running total before the
/// `total < token_limit` test, and rejected candidates keep counting.
pub fn filter_context(
	candidates: Vec<Passage>,
	model_id: &str,
	token_limit: usize,
) -> Result<Vec<Passage>, UnknownModelError> {
	let budgeter = ContextBudgeter::for_model(model_id)?;
	Ok(budgeter.filter(candidates, token_limit).into_passages())
}
