pub mod chunking;
pub mod error;
pub mod extractor;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod traits;
pub mod vectorizer;

pub use chunking::{
    chunk_paragraphs, chunk_with_config, split_paragraphs, ChunkingConfig, DEFAULT_CHUNK_SIZE,
};
pub use error::{AskError, GenerationError, IngestError, RetrievalError, UploadError};
pub use extractor::{
    extract_paragraphs, paragraphs_from_document_xml, DocumentFormat, DocxExtractor,
    LopdfExtractor, PlainTextExtractor,
};
pub use generation::{GeneratorConfig, HttpAnswerGenerator};
pub use index::{l2_distance, FlatL2Index, Neighbor};
pub use ingest::{
    content_checksum, discover_documents, expand_paths, fingerprint_document,
    ingest_paths_best_effort, IngestionReport, SkippedDocument,
};
pub use models::{Answer, DocumentFingerprint, RetrievalOptions, RetrievedChunk, DEFAULT_TOP_K};
pub use pipeline::{DocumentSession, RetrievalPipeline};
pub use traits::{AnswerGenerator, SimilarityIndex, TextExtractor};
pub use vectorizer::{TfidfModel, Tokenizer};
