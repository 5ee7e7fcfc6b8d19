use std::path::PathBuf;

use qa_agent_core::{FileRole, RequestToken, TestCase, UploadedFile};

use crate::export::PersistError;

#[derive(Debug)]
pub enum EngineEvent {
    FilesLoaded {
        role: FileRole,
        result: Result<Vec<UploadedFile>, IntakeError>,
    },
    KnowledgeBaseReady,
    TestCasesGenerated {
        token: RequestToken,
        result: Result<Vec<TestCase>, GenerationError>,
    },
    ScriptGenerated {
        token: RequestToken,
        result: Result<String, GenerationError>,
    },
    ScriptExported {
        result: Result<PathBuf, PersistError>,
    },
}

/// A selected file could not be turned into an `UploadedFile`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("{path} does not name a file")]
    NoFileName { path: String },
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// The model call failed, returned nothing, or returned something unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("invalid model endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("malformed response envelope: {0}")]
    MalformedEnvelope(String),
    #[error("model returned no text")]
    EmptyResponse,
    #[error("model output is not a valid test case list: {0}")]
    InvalidTestCases(String),
}
