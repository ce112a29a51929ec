use rag_context::document::{Metadata, Passage};
use rag_context::filter_context;
use rag_context::selection::{resolve_tokenizer, ContextBudgeter, TokenCounter, UnknownModelError};

fn plain(content: &str) -> Passage {
    Passage::new(content, Metadata::new())
}

#[test]
fn known_models_count_exact_bpe_tokens() {
    for model in ["gpt-4", "gpt-3.5-turbo", "gpt-4o"] {
        let tokenizer = resolve_tokenizer(model).unwrap();
        assert_eq!(tokenizer.model_id(), model);
        assert_eq!(tokenizer.count_tokens("hello world"), 2, "model {model}");
        assert_eq!(tokenizer.count_tokens(""), 0);
    }
}

#[test]
fn token_counts_are_not_word_counts() {
    let tokenizer = resolve_tokenizer("gpt-4").unwrap();
    let text = "antidisestablishmentarianism";

    assert!(tokenizer.count_tokens(text) > 1);
}

#[test]
fn repeated_resolution_reuses_the_same_encoding() {
    let first = resolve_tokenizer("gpt-4").unwrap();
    let second = resolve_tokenizer("gpt-4").unwrap();
    let text = "The quarterly report covers fiscal year 2021.";

    assert_eq!(first.count_tokens(text), second.count_tokens(text));
}

#[test]
fn unknown_model_is_an_error() {
    let err = resolve_tokenizer("not-a-real-model").unwrap_err();
    assert_eq!(
        err,
        UnknownModelError {
            model_id: "not-a-real-model".to_string()
        }
    );
    assert!(err.to_string().contains("not-a-real-model"));
}

#[test]
fn filter_context_fails_for_unknown_model_without_partial_result() {
    let candidates = vec![plain("hello world")];
    let result = filter_context(candidates, "not-a-real-model", 1_000);

    assert!(matches!(result, Err(UnknownModelError { .. })));
}

#[test]
fn filter_context_uses_model_tokenizer() {
    // "hello world" is two tokens: running totals 2, 4, 6.
    let candidates = vec![plain("hello world"), plain("hello world"), plain("hello world")];

    let filtered = filter_context(candidates.clone(), "gpt-4", 5).unwrap();
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered, candidates[..2].to_vec());

    let filtered = filter_context(candidates, "gpt-4", 0).unwrap();
    assert!(filtered.is_empty());
}

#[test]
fn budgeter_for_model_records_model_in_metadata() {
    let budgeter = ContextBudgeter::for_model("gpt-3.5-turbo").unwrap();
    let result = budgeter.filter(vec![plain("hello world")], 10);

    assert_eq!(result.budget.model_id, "gpt-3.5-turbo");
    assert_eq!(result.budget.tokens_counted, 2);
    assert_eq!(result.passages.len(), 1);
}
