use crate::{AiModel, AnalysisResult, FileKind, FreeModel, Page, QuestionId};

pub const RUN_LABEL_IDLE: &str = "Run Analysis on Anonymised Data";
pub const RUN_LABEL_BUSY: &str = "Processing (this may take a while)...";
pub const NO_RESULTS_TITLE: &str = "No Results Found";
pub const NO_RESULTS_MESSAGE: &str =
    "No analysis results were found. Please run the analysis from the Security Questions page.";
pub const NO_ANONYMIZED_FILES: &str = "No anonymised files found.";
pub const ANONYMIZED_FILES_ERROR: &str = "Error loading anonymised files.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub page: Option<Page>,
    pub uploads: UploadListView,
    pub anonymized: AnonymizedView,
    pub composer: ComposerView,
    /// `None` when the page has no results panel to show.
    pub results: Option<ResultsView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadListView {
    pub files: Vec<FileRowView>,
    pub drop_highlight: bool,
    pub uploading: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub kind: FileKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymizedView {
    Loading,
    Files(Vec<FileRowView>),
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub questions: Vec<QuestionRowView>,
    pub model: AiModel,
    pub api_key_visible: bool,
    pub free_model_select_visible: bool,
    pub free_models: Vec<FreeModel>,
    pub selected_free_model: String,
    pub run_button: RunButtonView,
    pub spinner_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRowView {
    pub id: QuestionId,
    pub text: String,
    /// Visible suggestion list, if any.
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunButtonView {
    pub enabled: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub panel: ResultsPanel,
    pub show_clear: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPanel {
    Empty {
        title: &'static str,
        message: &'static str,
    },
    Populated {
        summary: String,
        blocks: Vec<ResultBlock>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBlock {
    pub heading: String,
    pub question: String,
    pub answer: String,
    pub source: String,
    pub citation: String,
}

/// Builds the results panel shared by the questions and results pages.
///
/// A missing or empty list renders the fixed no-results message and no
/// summary; otherwise one summary plus one block per result, in order.
pub fn results_view(results: Option<&[AnalysisResult]>, show_clear: bool) -> ResultsView {
    let panel = match results {
        Some(results) if !results.is_empty() => ResultsPanel::Populated {
            summary: format!("Total questions analysed: {}", results.len()),
            blocks: results
                .iter()
                .enumerate()
                .map(|(index, result)| ResultBlock {
                    heading: format!("Question {}", index + 1),
                    question: result.question.clone(),
                    answer: result.answer.clone(),
                    source: result.source.clone(),
                    citation: result.citation.clone(),
                })
                .collect(),
        },
        _ => ResultsPanel::Empty {
            title: NO_RESULTS_TITLE,
            message: NO_RESULTS_MESSAGE,
        },
    };
    ResultsView { panel, show_clear }
}
