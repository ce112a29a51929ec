use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tiktoken_rs::CoreBPE;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No tokenizer is known for model `{model_id}`")]
pub struct UnknownModelError {
    pub model_id: String,
}

pub trait TokenCounter {
    fn count_tokens(&self, content: &str) -> usize;
}

impl<T: TokenCounter + ?Sized> TokenCounter for &T {
    fn count_tokens(&self, content: &str) -> usize {
        (**self).count_tokens(content)
    }
}

/// Exact BPE token counts for an OpenAI model.
#[derive(Clone)]
pub struct TiktokenCounter {
    model_id: String,
    bpe: Arc<CoreBPE>,
}

impl TiktokenCounter {
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, content: &str) -> usize {
        // Plain text: special-token markers are counted as ordinary text.
        self.bpe.encode_ordinary(content).len()
    }
}

fn encoders() -> &'static Mutex<HashMap<String, Arc<CoreBPE>>> {
    static ENCODERS: OnceLock<Mutex<HashMap<String, Arc<CoreBPE>>>> = OnceLock::new();
    ENCODERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Resolve the exact tokenizer for `model_id`.
///
/// Encoders are built once per model id and shared afterwards. Unknown
/// models are an error; there is no fallback encoding.
pub fn resolve_tokenizer(model_id: &str) -> Result<TiktokenCounter, UnknownModelError> {
    let unknown = || UnknownModelError {
        model_id: model_id.to_string(),
    };

    let mut cache = encoders().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(bpe) = cache.get(model_id) {
        return Ok(TiktokenCounter {
            model_id: model_id.to_string(),
            bpe: Arc::clone(bpe),
        });
    }

    let tokenizer = tiktoken_rs::tokenizer::get_tokenizer(model_id).ok_or_else(unknown)?;
    let bpe = tiktoken_rs::get_bpe_from_tokenizer(tokenizer).map_err(|_| unknown())?;
    debug!(model_id, "resolved tokenizer");

    let bpe = Arc::new(bpe);
    cache.insert(model_id.to_string(), Arc::clone(&bpe));

    Ok(TiktokenCounter {
        model_id: model_id.to_string(),
        bpe,
    })
}
