use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("docx read error: {0}")]
    Docx(String),

    #[error("text is not valid utf-8: {0}")]
    Decode(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index is empty: no document has been indexed")]
    EmptyIndex,

    #[error("index row {chunk_id} has no chunk text")]
    MissingChunk { chunk_id: usize },

    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] regex::Error),
}

impl RetrievalError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Could not index this document.",
            Self::EmptyIndex => "Please upload a document first.",
            Self::DimensionMismatch { .. } | Self::MissingChunk { .. } | Self::Tokenizer(_) => {
                "Internal retrieval error, please upload the documents again."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("answer generator not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Error)]
pub enum AskError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("indexing failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Ingest(error) => format!("Could not read the uploaded files: {error}"),
            Self::Retrieval(error) => error.user_message().to_string(),
        }
    }
}
