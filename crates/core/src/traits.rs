use crate::{GenerationError, IngestError, Neighbor, RetrievalError};
use async_trait::async_trait;
use std::path::Path;

pub trait SimilarityIndex: Send + Sync {
    fn dimensions(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, RetrievalError>;
}

pub trait TextExtractor {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, IngestError>;
}

#[async_trait]
pub trait AnswerGenerator {
    async fn generate(&self, context: &str, question: &str) -> Result<String, GenerationError>;
}
