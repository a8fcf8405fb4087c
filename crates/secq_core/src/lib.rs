//! Secq core: pure state machine and view-model helpers for the
//! document-analysis client.
mod effect;
mod model;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use model::{
    is_free_model, AiModel, AnalysisRequest, AnalysisResult, CandidateFile, FileKind, FreeModel,
    JobStatus, Page, PollPolicy, QuestionId, RequestFailure, RunId, Settings, DEFAULT_DEBOUNCE,
    DEFAULT_POLL_INTERVAL, FREE_MODELS, MIN_SUGGESTION_CHARS, PDF_MIME_TYPE,
};
pub use msg::Msg;
pub use state::AppState;
pub use update::{
    update, CLEAR_RESULTS_PROMPT, MISSING_API_KEY_ALERT, NO_QUESTIONS_ALERT, START_FAILED_ALERT,
    STATUS_FAILED_ALERT, STILL_RUNNING_ALERT, UNSUPPORTED_FILE_ALERT,
};
pub use view_model::{
    results_view, AnonymizedView, AppViewModel, ComposerView, FileRowView, QuestionRowView,
    ResultBlock, ResultsPanel, ResultsView, RunButtonView, UploadListView, ANONYMIZED_FILES_ERROR,
    NO_ANONYMIZED_FILES, NO_RESULTS_MESSAGE, NO_RESULTS_TITLE, RUN_LABEL_BUSY, RUN_LABEL_IDLE,
};
