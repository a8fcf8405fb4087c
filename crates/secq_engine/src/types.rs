use std::fmt;

use serde::{Deserialize, Serialize};

pub type RunId = u64;
pub type InputId = u64;

/// One question/answer record as sent by the backend and kept in the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultRecord {
    pub question: String,
    pub answer: String,
    pub source: String,
    pub citation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequestBody {
    pub ai_model: String,
    pub api_key: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Complete,
    Error,
    /// Anything else the server reports; treated as still running.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    pub status: JobState,
    #[serde(default)]
    pub results: Option<Vec<ResultRecord>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedFilesResponse {
    #[serde(default)]
    pub(crate) uploaded_pdfs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnonymizedFilesResponse {
    #[serde(default)]
    pub(crate) anonymized_files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsResponse {
    #[serde(default)]
    pub(crate) suggestions: Vec<String>,
}

/// What a fired timer was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKey {
    Suggestion { input: InputId, generation: u64 },
    Poll { run: RunId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadFinished {
        name: String,
        result: Result<(), ApiError>,
    },
    RemoveFinished {
        name: String,
        result: Result<(), ApiError>,
    },
    UploadedFilesListed(Result<Vec<String>, ApiError>),
    AnonymizedFilesListed(Result<Vec<String>, ApiError>),
    SuggestionsFetched {
        input: InputId,
        generation: u64,
        result: Result<Vec<String>, ApiError>,
    },
    SubmissionFinished {
        run: RunId,
        result: Result<(), ApiError>,
    },
    StatusChecked {
        run: RunId,
        result: Result<StatusResponse, ApiError>,
    },
    TimerFired(TimerKey),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
