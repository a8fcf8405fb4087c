use crate::{
    AiModel, AnalysisResult, CandidateFile, JobStatus, Page, QuestionId, RequestFailure, RunId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A page finished loading; triggers its initial server/store loads.
    PageLoaded(Page),
    /// The user is navigating away; abandons any active analysis run.
    PageLeft,
    /// Files picked through the file chooser.
    FilesChosen(Vec<CandidateFile>),
    /// Drag entered or moved over the drop area.
    DragEntered,
    /// Drag left the drop area without dropping.
    DragLeft,
    /// Files dropped onto the drop area.
    FilesDropped(Vec<CandidateFile>),
    UploadFinished {
        name: String,
        result: Result<(), RequestFailure>,
    },
    /// User clicked the remove icon of a listed file.
    RemoveFileClicked {
        name: String,
    },
    RemoveFinished {
        name: String,
        result: Result<(), RequestFailure>,
    },
    /// Server list of uploaded files.
    UploadedFilesLoaded(Result<Vec<String>, RequestFailure>),
    /// Server list of anonymized derivatives.
    AnonymizedFilesLoaded(Result<Vec<String>, RequestFailure>),
    /// Question inputs rendered with initial text; no input events fire for them.
    QuestionsSeeded(Vec<String>),
    AddQuestionClicked,
    DeleteQuestionClicked {
        question: QuestionId,
    },
    /// User typed into a question input.
    QuestionEdited {
        question: QuestionId,
        text: String,
    },
    ModelChanged(AiModel),
    FreeModelSelected(String),
    ApiKeyChanged(String),
    RunAnalysisClicked,
    /// Job submission answered.
    SubmissionFinished {
        run: RunId,
        result: Result<(), RequestFailure>,
    },
    /// Debounce window for a question input closed.
    SuggestionTimerElapsed {
        question: QuestionId,
        generation: u64,
    },
    SuggestionsLoaded {
        question: QuestionId,
        generation: u64,
        result: Result<Vec<String>, RequestFailure>,
    },
    /// User clicked the suggestion at `index` below a question input.
    SuggestionPicked {
        question: QuestionId,
        index: usize,
    },
    /// Wait between two status checks is over.
    PollTimerElapsed {
        run: RunId,
    },
    StatusReceived {
        run: RunId,
        result: Result<JobStatus, RequestFailure>,
    },
    /// Results restored from the local store (`None` when absent or unreadable).
    StoredResultsLoaded(Option<Vec<AnalysisResult>>),
    ClearResultsClicked,
    /// User accepted the clear-results confirmation.
    ClearResultsConfirmed,
}
