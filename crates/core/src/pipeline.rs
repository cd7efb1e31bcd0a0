use crate::chunking::chunk_paragraphs;
use crate::index::FlatL2Index;
use crate::ingest::{ingest_paths_best_effort, IngestionReport};
use crate::traits::AnswerGenerator;
use crate::vectorizer::TfidfModel;
use crate::{Answer, AskError, RetrievalError, RetrievalOptions, RetrievedChunk, UploadError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

// chunks, model and index come from the same build and are never replaced one by one
#[derive(Debug)]
pub struct RetrievalPipeline {
    chunks: Vec<String>,
    model: TfidfModel,
    index: FlatL2Index,
    options: RetrievalOptions,
}

impl RetrievalPipeline {
    pub fn build<S: AsRef<str>>(
        paragraphs: &[S],
        options: &RetrievalOptions,
    ) -> Result<Self, RetrievalError> {
        let chunks = chunk_paragraphs(paragraphs, options.chunk_size);
        let (vectors, model) = TfidfModel::fit_transform(&chunks)?;
        let index = FlatL2Index::build(vectors)?;

        info!(
            paragraphs = paragraphs.len(),
            chunks = chunks.len(),
            vocabulary = model.dimensions(),
            "retrieval pipeline built"
        );

        Ok(Self {
            chunks,
            model,
            index,
            options: *options,
        })
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let vector = self.model.transform(query);
        let neighbors = self.index.query(&vector, k)?;
        debug!(k, hits = neighbors.len(), "similarity query");

        neighbors
            .into_iter()
            .map(|neighbor| {
                let text = self.chunks.get(neighbor.chunk_id).cloned().ok_or(
                    RetrievalError::MissingChunk {
                        chunk_id: neighbor.chunk_id,
                    },
                )?;
                Ok(RetrievedChunk {
                    chunk_id: neighbor.chunk_id,
                    text,
                    distance: neighbor.distance,
                })
            })
            .collect()
    }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        Ok(self
            .search(query, k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    pub fn retrieve_default(&self, query: &str) -> Result<Vec<String>, RetrievalError> {
        self.retrieve(query, self.options.top_k)
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn model(&self) -> &TfidfModel {
        &self.model
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }
}

#[derive(Debug, Default)]
pub struct DocumentSession {
    options: RetrievalOptions,
    active: Option<Arc<RetrievalPipeline>>,
}

impl DocumentSession {
    pub fn new(options: RetrievalOptions) -> Self {
        Self {
            options,
            active: None,
        }
    }

    // A failed build leaves the session without documents.
    pub fn upload<S: AsRef<str>>(
        &mut self,
        paragraphs: &[S],
    ) -> Result<Arc<RetrievalPipeline>, RetrievalError> {
        match RetrievalPipeline::build(paragraphs, &self.options) {
            Ok(pipeline) => {
                let pipeline = Arc::new(pipeline);
                self.active = Some(Arc::clone(&pipeline));
                Ok(pipeline)
            }
            Err(error) => {
                self.active = None;
                Err(error)
            }
        }
    }

    pub fn upload_files(&mut self, paths: &[PathBuf]) -> Result<IngestionReport, UploadError> {
        let report = match ingest_paths_best_effort(paths) {
            Ok(report) => report,
            Err(error) => {
                self.clear();
                return Err(error.into());
            }
        };

        self.upload(&report.paragraphs)?;
        Ok(report)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn is_ready(&self) -> bool {
        self.active.is_some()
    }

    pub fn snapshot(&self) -> Result<Arc<RetrievalPipeline>, RetrievalError> {
        self.active.clone().ok_or(RetrievalError::EmptyIndex)
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        self.snapshot()?.search(query, k)
    }

    pub fn retrieve(&self, query: &str) -> Result<Vec<String>, RetrievalError> {
        self.snapshot()?.retrieve(query, self.options.top_k)
    }

    pub async fn ask<G>(&self, question: &str, generator: &G) -> Result<Answer, AskError>
    where
        G: AnswerGenerator + ?Sized + Sync,
    {
        let passages = self.retrieve(question)?;
        let context = passages.join("\n\n");
        let answer = generator.generate(&context, question).await?;

        Ok(Answer {
            question: question.to_string(),
            answer,
            passages,
        })
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }
}
