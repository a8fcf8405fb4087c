use std::collections::BTreeSet;

use crate::model::FREE_MODELS;
use crate::view_model::{
    results_view, AnonymizedView, AppViewModel, ComposerView, FileRowView, QuestionRowView,
    RunButtonView, UploadListView, RUN_LABEL_BUSY, RUN_LABEL_IDLE,
};
use crate::{AiModel, AnalysisResult, FileKind, Page, QuestionId, RunId, Settings};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UploadsState {
    pub(crate) files: Vec<String>,
    pub(crate) in_flight: BTreeSet<String>,
    pub(crate) removing: BTreeSet<String>,
    pub(crate) loading: bool,
    pub(crate) drop_highlight: bool,
}

impl UploadsState {
    pub(crate) fn is_listed(&self, name: &str) -> bool {
        self.files.iter().any(|file| file == name)
    }

    /// Appends `name` unless an entry with the same name is already listed.
    pub(crate) fn add(&mut self, name: String) -> bool {
        if self.is_listed(&name) {
            return false;
        }
        self.files.push(name);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum AnonymizedFiles {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<String>),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LookupPhase {
    #[default]
    Idle,
    Waiting,
    Fetching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuestionInput {
    pub(crate) id: QuestionId,
    pub(crate) text: String,
    /// Bumped on every edit; timers and responses carry the value they were issued for.
    pub(crate) generation: u64,
    pub(crate) suggestions: Vec<String>,
    pub(crate) suggestions_visible: bool,
    pub(crate) lookup: LookupPhase,
}

impl QuestionInput {
    fn new(id: QuestionId) -> Self {
        Self {
            id,
            text: String::new(),
            generation: 0,
            suggestions: Vec::new(),
            suggestions_visible: false,
            lookup: LookupPhase::Idle,
        }
    }

    pub(crate) fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestions_visible = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComposerState {
    pub(crate) questions: Vec<QuestionInput>,
    pub(crate) next_question_id: QuestionId,
    pub(crate) model: AiModel,
    pub(crate) free_model: String,
    pub(crate) api_key: String,
}

impl Default for ComposerState {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            next_question_id: 1,
            model: AiModel::default(),
            free_model: FREE_MODELS[0].value.to_string(),
            api_key: String::new(),
        }
    }
}

impl ComposerState {
    pub(crate) fn question_mut(&mut self, id: QuestionId) -> Option<&mut QuestionInput> {
        self.questions.iter_mut().find(|question| question.id == id)
    }

    /// Trimmed, non-empty question texts in input order.
    pub(crate) fn submitted_questions(&self) -> Vec<String> {
        self.questions
            .iter()
            .map(|question| question.text.trim())
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PollStep {
    #[default]
    Checking,
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum AnalysisPhase {
    #[default]
    Idle,
    Submitting {
        run: RunId,
    },
    Polling {
        run: RunId,
        pending_responses: u32,
        step: PollStep,
    },
}

impl AnalysisPhase {
    pub(crate) fn active_run(self) -> Option<RunId> {
        match self {
            AnalysisPhase::Idle => None,
            AnalysisPhase::Submitting { run } | AnalysisPhase::Polling { run, .. } => Some(run),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) settings: Settings,
    pub(crate) page: Option<Page>,
    pub(crate) uploads: UploadsState,
    pub(crate) anonymized: AnonymizedFiles,
    pub(crate) composer: ComposerState,
    pub(crate) analysis: AnalysisPhase,
    pub(crate) next_run: RunId,
    pub(crate) results: Option<Vec<AnalysisResult>>,
    pub(crate) loading_stored: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Fresh state for a page reload. Settings and the run counter carry
    /// over so run ids are never reused.
    pub fn reloaded(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            next_run: self.next_run,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    /// Run id of the submission or poll loop in progress, if any.
    pub fn active_run(&self) -> Option<RunId> {
        self.analysis.active_run()
    }

    /// True when nothing is waiting on a request or a timer.
    pub fn is_settled(&self) -> bool {
        !self.uploads.loading
            && self.uploads.in_flight.is_empty()
            && self.uploads.removing.is_empty()
            && self.anonymized != AnonymizedFiles::Loading
            && !self.loading_stored
            && self.analysis == AnalysisPhase::Idle
            && self
                .composer
                .questions
                .iter()
                .all(|question| question.lookup == LookupPhase::Idle)
    }

    pub(crate) fn next_run_id(&mut self) -> RunId {
        self.next_run += 1;
        self.next_run
    }

    pub(crate) fn add_question(&mut self) -> QuestionId {
        let id = self.composer.next_question_id;
        self.composer.next_question_id += 1;
        self.composer.questions.push(QuestionInput::new(id));
        id
    }

    pub fn view(&self) -> AppViewModel {
        let uploads = UploadListView {
            files: self.uploads.files.iter().map(|name| file_row(name)).collect(),
            drop_highlight: self.uploads.drop_highlight,
            uploading: self.uploads.in_flight.len(),
        };

        let anonymized = match &self.anonymized {
            AnonymizedFiles::NotLoaded | AnonymizedFiles::Loading => AnonymizedView::Loading,
            AnonymizedFiles::Loaded(files) if files.is_empty() => AnonymizedView::Empty,
            AnonymizedFiles::Loaded(files) => {
                AnonymizedView::Files(files.iter().map(|name| file_row(name)).collect())
            }
            AnonymizedFiles::Failed => AnonymizedView::Failed,
        };

        let busy = self.analysis != AnalysisPhase::Idle;
        let free_mode = !self.composer.model.requires_api_key();
        let composer = ComposerView {
            questions: self
                .composer
                .questions
                .iter()
                .map(|question| QuestionRowView {
                    id: question.id,
                    text: question.text.clone(),
                    suggestions: question
                        .suggestions_visible
                        .then(|| question.suggestions.clone()),
                })
                .collect(),
            model: self.composer.model,
            api_key_visible: !free_mode,
            free_model_select_visible: free_mode,
            free_models: FREE_MODELS.to_vec(),
            selected_free_model: self.composer.free_model.clone(),
            run_button: RunButtonView {
                enabled: !busy,
                label: if busy { RUN_LABEL_BUSY } else { RUN_LABEL_IDLE },
            },
            spinner_visible: busy,
        };

        let results = match self.page {
            Some(Page::Results) => Some(results_view(self.results.as_deref(), true)),
            Some(Page::Questions) => self
                .results
                .as_deref()
                .map(|results| results_view(Some(results), false)),
            Some(Page::Upload) | None => None,
        };

        AppViewModel {
            page: self.page,
            uploads,
            anonymized,
            composer,
            results,
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn file_row(name: &str) -> FileRowView {
    FileRowView {
        name: name.to_string(),
        kind: FileKind::from_name(name),
    }
}
