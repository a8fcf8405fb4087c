use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type QuestionId = u64;
pub type RunId = u64;

/// Inputs shorter than this never trigger a suggestion lookup.
pub const MIN_SUGGESTION_CHARS: usize = 3;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// One question/answer record produced by a completed analysis job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisResult {
    pub question: String,
    pub answer: String,
    pub source: String,
    pub citation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeModel {
    pub name: &'static str,
    pub value: &'static str,
}

/// Local models the backend can run without an API key.
pub const FREE_MODELS: [FreeModel; 3] = [
    FreeModel {
        name: "MPNet",
        value: "mpnet",
    },
    FreeModel {
        name: "BART",
        value: "bart",
    },
    FreeModel {
        name: "T5",
        value: "t5",
    },
];

pub fn is_free_model(value: &str) -> bool {
    FREE_MODELS.iter().any(|model| model.value == value)
}

/// Value of the model selector. `Free` defers to the free-model dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiModel {
    #[default]
    Free,
    Claude,
    ChatGpt,
}

impl AiModel {
    pub const ALL: [AiModel; 3] = [AiModel::Free, AiModel::Claude, AiModel::ChatGpt];

    pub fn value(self) -> &'static str {
        match self {
            AiModel::Free => "free",
            AiModel::Claude => "claude",
            AiModel::ChatGpt => "chatgpt",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|model| model.value().eq_ignore_ascii_case(value.trim()))
    }

    pub fn requires_api_key(self) -> bool {
        self != AiModel::Free
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Eml,
    Msg,
    Other,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => FileKind::Pdf,
            "eml" => FileKind::Eml,
            "msg" => FileKind::Msg,
            _ => FileKind::Other,
        }
    }
}

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file offered for upload, before type filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub path: PathBuf,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            path: path.into(),
        }
    }

    /// PDF by MIME type, or e-mail by file suffix.
    pub fn is_supported(&self) -> bool {
        self.mime_type.as_deref() == Some(PDF_MIME_TYPE)
            || self.name.ends_with(".eml")
            || self.name.ends_with(".msg")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Complete(Vec<AnalysisResult>),
    Error(String),
}

/// Why a request to the backend did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    HttpStatus(u16),
    Transport(String),
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::HttpStatus(code) => write!(f, "http status {code}"),
            RequestFailure::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

/// Body submitted to start an analysis job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub ai_model: String,
    pub api_key: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Upload,
    Questions,
    Results,
}

/// Delay schedule for status checks while a job is pending.
///
/// The n-th wait (0-based) is `interval * backoff_multiplier^n`, capped at
/// `max_interval`. `max_attempts` bounds the number of pending responses
/// accepted before polling gives up; `None` polls until the job resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff_multiplier: u32,
    pub max_interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            backoff_multiplier: 1,
            max_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn delay_for(&self, wait_index: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1).saturating_pow(wait_index);
        let cap = self.max_interval.max(self.interval);
        self.interval.saturating_mul(factor).min(cap)
    }

    pub fn exhausted(&self, pending_responses: u32) -> bool {
        self.max_attempts
            .is_some_and(|max| pending_responses >= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub debounce: Duration,
    pub poll: PollPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            poll: PollPolicy::default(),
        }
    }
}
