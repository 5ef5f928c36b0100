use std::sync::Arc;

use async_trait::async_trait;

use super::error::ProviderError;

#[async_trait]
/// External text embedding service.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `inputs`, returning one vector per input in the same order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

#[async_trait]
impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        (**self).embed(inputs).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
