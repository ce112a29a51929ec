use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::ingest::CollaboratorError;

pub trait Embedder {
    /// Identifier of the embedding model, recorded in the index manifest.
    fn model(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

impl<T: Embedder + ?Sized> Embedder for &T {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        (**self).embed_batch(texts)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Blocking client for an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    config: EmbeddingConfig,
    client: reqwest::blocking::Client,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        let url = format!("{}/embeddings", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CollaboratorError::Embedding(format!(
                "{url} returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json()?;
        into_vectors(parsed, input.len())
    }
}

/// Vectors in request order; the service may return items in any order.
fn into_vectors(
    mut response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, CollaboratorError> {
    if response.data.len() != expected {
        return Err(CollaboratorError::Embedding(format!(
            "requested {expected} embeddings, received {}",
            response.data.len()
        )));
    }

    response.data.sort_by_key(|item| item.index);
    Ok(response.data.into_iter().map(|item| item.embedding).collect())
}

fn in_batches<F>(
    texts: &[String],
    batch_size: usize,
    mut request: F,
) -> Result<Vec<Vec<f32>>, CollaboratorError>
where
    F: FnMut(&[String]) -> Result<Vec<Vec<f32>>, CollaboratorError>,
{
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        vectors.extend(request(batch)?);
    }
    Ok(vectors)
}

impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        let mut vectors = self.request(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| CollaboratorError::Embedding("empty embeddings response".into()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        in_batches(texts, self.config.batch_size, |batch| {
            debug!(model = %self.config.model, inputs = batch.len(), "requesting embeddings");
            self.request(batch)
        })
    }
}
