use secq_logging::{secq_debug, secq_info, secq_trace, secq_warn};

use crate::model::is_free_model;
use crate::state::{AnalysisPhase, AnonymizedFiles, LookupPhase, PollStep};
use crate::{
    AnalysisRequest, AppState, CandidateFile, Effect, JobStatus, Msg, Page, QuestionId,
    RequestFailure, RunId, MIN_SUGGESTION_CHARS,
};

pub const UNSUPPORTED_FILE_ALERT: &str =
    "Unsupported file type. Please upload PDF, EML, or MSG files only.";
pub const NO_QUESTIONS_ALERT: &str = "Please enter at least one security question.";
pub const MISSING_API_KEY_ALERT: &str = "Please enter an API key for the selected AI model.";
pub const START_FAILED_ALERT: &str =
    "An error occurred while starting the analysis. Please check the logs for more details.";
pub const STATUS_FAILED_ALERT: &str =
    "An error occurred while checking the analysis status. Please check the logs for more details.";
pub const STILL_RUNNING_ALERT: &str =
    "The analysis is still running. Check the results page later.";
pub const CLEAR_RESULTS_PROMPT: &str =
    "Are you sure you want to clear all results? This action cannot be undone.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded(page) => page_loaded(&mut state, page),
        Msg::PageLeft => match state.analysis.active_run() {
            Some(run) => {
                secq_info!("Leaving page; abandoning analysis run {}", run);
                finish_run(&mut state, run)
            }
            None => Vec::new(),
        },
        Msg::FilesChosen(files) => intake_files(&mut state, files),
        Msg::DragEntered => {
            if !state.uploads.drop_highlight {
                state.uploads.drop_highlight = true;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DragLeft => {
            if state.uploads.drop_highlight {
                state.uploads.drop_highlight = false;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FilesDropped(files) => {
            state.uploads.drop_highlight = false;
            state.mark_dirty();
            intake_files(&mut state, files)
        }
        Msg::UploadFinished { name, result } => upload_finished(&mut state, name, result),
        Msg::RemoveFileClicked { name } => {
            if state.uploads.removing.insert(name.clone()) {
                vec![Effect::RemoveFile { name }]
            } else {
                secq_debug!("Removal already in progress: {}", name);
                Vec::new()
            }
        }
        Msg::RemoveFinished { name, result } => {
            state.uploads.removing.remove(&name);
            match result {
                Ok(()) => {
                    secq_info!("File removed: {}", name);
                    vec![
                        Effect::Alert {
                            message: format!("File successfully removed: {name}"),
                        },
                        Effect::ReloadPage,
                    ]
                }
                Err(RequestFailure::HttpStatus(code)) => {
                    secq_warn!("Removing {} answered with status {}", name, code);
                    vec![Effect::Alert {
                        message: format!("Failed to remove file: {name}"),
                    }]
                }
                Err(failure) => {
                    secq_warn!("Error removing file {}: {}", name, failure);
                    vec![Effect::Alert {
                        message: format!("Error removing file: {name}"),
                    }]
                }
            }
        }
        Msg::UploadedFilesLoaded(result) => {
            state.uploads.loading = false;
            match result {
                Ok(names) => {
                    state.uploads.files.clear();
                    for name in names {
                        if !state.uploads.add(name.clone()) {
                            secq_debug!("File already in list: {}", name);
                        }
                    }
                    state.mark_dirty();
                }
                Err(failure) => secq_warn!("Error loading existing files: {}", failure),
            }
            Vec::new()
        }
        Msg::AnonymizedFilesLoaded(result) => {
            state.anonymized = match result {
                Ok(files) => AnonymizedFiles::Loaded(files),
                Err(failure) => {
                    secq_warn!("Error loading anonymised files: {}", failure);
                    AnonymizedFiles::Failed
                }
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::QuestionsSeeded(texts) => {
            for text in texts {
                let id = state.add_question();
                if let Some(input) = state.composer.question_mut(id) {
                    input.text = text;
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::AddQuestionClicked => {
            let id = state.add_question();
            secq_trace!("Question input {} added", id);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeleteQuestionClicked { question } => {
            let before = state.composer.questions.len();
            state
                .composer
                .questions
                .retain(|input| input.id != question);
            if state.composer.questions.len() != before {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QuestionEdited { question, text } => question_edited(&mut state, question, text),
        Msg::ModelChanged(model) => {
            state.composer.model = model;
            state.mark_dirty();
            Vec::new()
        }
        Msg::FreeModelSelected(value) => {
            if is_free_model(&value) {
                state.composer.free_model = value;
                state.mark_dirty();
            } else {
                secq_warn!("Ignoring unknown free model {:?}", value);
            }
            Vec::new()
        }
        Msg::ApiKeyChanged(key) => {
            state.composer.api_key = key;
            Vec::new()
        }
        Msg::RunAnalysisClicked => run_analysis(&mut state),
        Msg::SubmissionFinished { run, result } => submission_finished(&mut state, run, result),
        Msg::SuggestionTimerElapsed {
            question,
            generation,
        } => match state.composer.question_mut(question) {
            Some(input) if input.generation == generation => {
                input.lookup = LookupPhase::Fetching;
                vec![Effect::FetchSuggestions {
                    question,
                    generation,
                    partial: input.text.clone(),
                }]
            }
            _ => {
                secq_trace!("Stale suggestion timer for question {}", question);
                Vec::new()
            }
        },
        Msg::SuggestionsLoaded {
            question,
            generation,
            result,
        } => {
            match state.composer.question_mut(question) {
                Some(input) if input.generation == generation => {
                    input.lookup = LookupPhase::Idle;
                    match result {
                        Ok(suggestions) => {
                            input.suggestions_visible = !suggestions.is_empty();
                            input.suggestions = suggestions;
                        }
                        Err(failure) => {
                            secq_warn!("Error fetching suggestions: {}", failure);
                            input.hide_suggestions();
                        }
                    }
                    state.mark_dirty();
                }
                _ => secq_trace!("Stale suggestions for question {}", question),
            }
            Vec::new()
        }
        Msg::SuggestionPicked { question, index } => {
            if let Some(input) = state.composer.question_mut(question) {
                if let Some(choice) = input.suggestions.get(index).cloned() {
                    input.text = choice;
                    input.generation += 1;
                    input.lookup = LookupPhase::Idle;
                    input.suggestions_visible = false;
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::PollTimerElapsed { run } => match state.analysis {
            AnalysisPhase::Polling {
                run: active,
                pending_responses,
                step: PollStep::Waiting,
            } if active == run => {
                state.analysis = AnalysisPhase::Polling {
                    run,
                    pending_responses,
                    step: PollStep::Checking,
                };
                vec![Effect::CheckStatus { run }]
            }
            _ => {
                secq_trace!("Stale poll timer for run {}", run);
                Vec::new()
            }
        },
        Msg::StatusReceived { run, result } => status_received(&mut state, run, result),
        Msg::StoredResultsLoaded(results) => {
            state.loading_stored = false;
            state.results = results;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ClearResultsClicked => vec![Effect::ConfirmClearResults {
            prompt: CLEAR_RESULTS_PROMPT.to_string(),
        }],
        Msg::ClearResultsConfirmed => {
            state.results = None;
            state.mark_dirty();
            vec![Effect::DeleteStoredResults]
        }
    };

    (state, effects)
}

fn page_loaded(state: &mut AppState, page: Page) -> Vec<Effect> {
    state.page = Some(page);
    state.mark_dirty();
    match page {
        Page::Upload => {
            state.uploads.loading = true;
            vec![Effect::LoadUploadedFiles]
        }
        Page::Questions => {
            state.anonymized = AnonymizedFiles::Loading;
            state.loading_stored = true;
            vec![Effect::LoadAnonymizedFiles, Effect::LoadStoredResults]
        }
        Page::Results => {
            state.loading_stored = true;
            vec![Effect::LoadStoredResults]
        }
    }
}

fn intake_files(state: &mut AppState, files: Vec<CandidateFile>) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(files.len());
    for file in files {
        if !file.is_supported() {
            secq_info!("Rejected unsupported file {}", file.name);
            effects.push(Effect::Alert {
                message: UNSUPPORTED_FILE_ALERT.to_string(),
            });
            continue;
        }
        // Client-side convenience only; another session may still upload the same name.
        if state.uploads.is_listed(&file.name) || state.uploads.in_flight.contains(&file.name) {
            secq_info!("File already in list: {}", file.name);
            continue;
        }
        state.uploads.in_flight.insert(file.name.clone());
        effects.push(Effect::UploadFile {
            name: file.name,
            path: file.path,
        });
    }
    if !effects.is_empty() {
        state.mark_dirty();
    }
    effects
}

fn upload_finished(
    state: &mut AppState,
    name: String,
    result: Result<(), RequestFailure>,
) -> Vec<Effect> {
    state.uploads.in_flight.remove(&name);
    state.mark_dirty();
    match result {
        Ok(()) => {
            secq_info!("File uploaded successfully: {}", name);
            state.uploads.add(name);
            Vec::new()
        }
        Err(RequestFailure::HttpStatus(code)) => {
            secq_warn!("Unexpected response status {} uploading {}", code, name);
            vec![Effect::Alert {
                message: format!("Unexpected response when uploading file: {name}"),
            }]
        }
        Err(failure) => {
            secq_warn!("Error uploading file {}: {}", name, failure);
            vec![Effect::Alert {
                message: format!(
                    "Error uploading file: {name}. Please check the logs for more details."
                ),
            }]
        }
    }
}

fn question_edited(state: &mut AppState, question: QuestionId, text: String) -> Vec<Effect> {
    let debounce = state.settings.debounce;
    let Some(input) = state.composer.question_mut(question) else {
        secq_debug!("Edit for unknown question {}", question);
        return Vec::new();
    };

    input.text = text;
    input.generation += 1;
    let effects = if input.text.chars().count() < MIN_SUGGESTION_CHARS {
        input.lookup = LookupPhase::Idle;
        input.hide_suggestions();
        Vec::new()
    } else {
        input.lookup = LookupPhase::Waiting;
        vec![Effect::ScheduleSuggestionLookup {
            question,
            generation: input.generation,
            delay: debounce,
        }]
    };
    state.mark_dirty();
    effects
}

fn run_analysis(state: &mut AppState) -> Vec<Effect> {
    if state.analysis != AnalysisPhase::Idle {
        secq_debug!("Analysis already running; ignoring click");
        return Vec::new();
    }

    let questions = state.composer.submitted_questions();
    if questions.is_empty() {
        secq_info!("Analysis blocked: no questions entered");
        return vec![Effect::Alert {
            message: NO_QUESTIONS_ALERT.to_string(),
        }];
    }

    let model = state.composer.model;
    if model.requires_api_key() && state.composer.api_key.trim().is_empty() {
        secq_info!("Analysis blocked: {} requires an API key", model.value());
        return vec![Effect::Alert {
            message: MISSING_API_KEY_ALERT.to_string(),
        }];
    }

    let request = if model.requires_api_key() {
        AnalysisRequest {
            ai_model: model.value().to_string(),
            api_key: state.composer.api_key.clone(),
            questions,
        }
    } else {
        AnalysisRequest {
            ai_model: state.composer.free_model.clone(),
            api_key: String::new(),
            questions,
        }
    };

    let run = state.next_run_id();
    secq_info!(
        "Starting analysis run {} with model {} ({} questions)",
        run,
        request.ai_model,
        request.questions.len()
    );
    state.analysis = AnalysisPhase::Submitting { run };
    state.mark_dirty();
    vec![Effect::SubmitQuestions { run, request }]
}

fn submission_finished(
    state: &mut AppState,
    run: RunId,
    result: Result<(), RequestFailure>,
) -> Vec<Effect> {
    if state.analysis != (AnalysisPhase::Submitting { run }) {
        secq_trace!("Stale submission answer for run {}", run);
        return Vec::new();
    }

    match result {
        Ok(()) => {
            secq_info!("Analysis run {} started", run);
            state.analysis = AnalysisPhase::Polling {
                run,
                pending_responses: 0,
                step: PollStep::Checking,
            };
            vec![Effect::CheckStatus { run }]
        }
        Err(failure) => {
            secq_warn!("Error starting question processing: {}", failure);
            let mut effects = vec![Effect::Alert {
                message: START_FAILED_ALERT.to_string(),
            }];
            effects.extend(finish_run(state, run));
            effects
        }
    }
}

fn status_received(
    state: &mut AppState,
    run: RunId,
    result: Result<JobStatus, RequestFailure>,
) -> Vec<Effect> {
    let pending_responses = match state.analysis {
        AnalysisPhase::Polling {
            run: active,
            pending_responses,
            step: PollStep::Checking,
        } if active == run => pending_responses,
        _ => {
            secq_trace!("Stale status for run {}", run);
            return Vec::new();
        }
    };

    match result {
        Ok(JobStatus::Pending) => {
            let pending_responses = pending_responses + 1;
            let policy = &state.settings.poll;
            if policy.exhausted(pending_responses) {
                secq_warn!(
                    "Run {} still pending after {} checks; giving up",
                    run,
                    pending_responses
                );
                let mut effects = vec![Effect::Alert {
                    message: STILL_RUNNING_ALERT.to_string(),
                }];
                effects.extend(finish_run(state, run));
                return effects;
            }
            let delay = policy.delay_for(pending_responses - 1);
            secq_debug!("Run {} pending; next check in {:?}", run, delay);
            state.analysis = AnalysisPhase::Polling {
                run,
                pending_responses,
                step: PollStep::Waiting,
            };
            vec![Effect::SchedulePoll { run, delay }]
        }
        Ok(JobStatus::Complete(results)) => {
            secq_info!("Run {} complete with {} results", run, results.len());
            state.results = Some(results.clone());
            let mut effects = vec![Effect::PersistResults(results)];
            effects.extend(finish_run(state, run));
            effects
        }
        Ok(JobStatus::Error(message)) => {
            secq_warn!("Run {} failed: {}", run, message);
            let mut effects = vec![Effect::Alert {
                message: format!("An error occurred during analysis: {message}"),
            }];
            effects.extend(finish_run(state, run));
            effects
        }
        Err(failure) => {
            secq_warn!("Error checking process status: {}", failure);
            let mut effects = vec![Effect::Alert {
                message: STATUS_FAILED_ALERT.to_string(),
            }];
            effects.extend(finish_run(state, run));
            effects
        }
    }
}

/// Returns the submission UI to idle and releases the run's engine resources.
fn finish_run(state: &mut AppState, run: RunId) -> Vec<Effect> {
    state.analysis = AnalysisPhase::Idle;
    state.mark_dirty();
    vec![Effect::CancelRun { run }]
}
