use std::path::PathBuf;
use std::time::Duration;

use crate::{AnalysisRequest, AnalysisResult, QuestionId, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Blocking user-facing message.
    Alert { message: String },
    LoadUploadedFiles,
    LoadAnonymizedFiles,
    LoadStoredResults,
    UploadFile { name: String, path: PathBuf },
    RemoveFile { name: String },
    /// Discard local state and load the current page again.
    ReloadPage,
    ScheduleSuggestionLookup {
        question: QuestionId,
        generation: u64,
        delay: Duration,
    },
    FetchSuggestions {
        question: QuestionId,
        generation: u64,
        partial: String,
    },
    SubmitQuestions { run: RunId, request: AnalysisRequest },
    CheckStatus { run: RunId },
    SchedulePoll { run: RunId, delay: Duration },
    /// Drop every timer and request still attached to `run`.
    CancelRun { run: RunId },
    PersistResults(Vec<AnalysisResult>),
    /// Ask the user; a yes answers with `Msg::ClearResultsConfirmed`.
    ConfirmClearResults { prompt: String },
    DeleteStoredResults,
}
