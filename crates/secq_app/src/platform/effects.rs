use std::time::Duration;

use secq_core::{AnalysisRequest, AnalysisResult, Effect, JobStatus, Msg, RequestFailure};
use secq_engine::{
    AnalysisRequestBody, ApiError, EngineEvent, EngineHandle, FailureKind, JobState, ResultRecord,
    ResultsStore, StatusResponse, TimerKey,
};
use secq_logging::{secq_error, secq_info, secq_warn};

/// Carries out I/O effects against the engine and the results store.
pub struct EffectRunner {
    engine: EngineHandle,
    store: ResultsStore,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, store: ResultsStore) -> Self {
        Self { engine, store }
    }

    /// Starts `effect`. Store reads answer at once with the returned message;
    /// everything else answers later through [`EffectRunner::next_msg`].
    pub fn run(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::LoadUploadedFiles => self.engine.list_uploaded(),
            Effect::LoadAnonymizedFiles => self.engine.list_anonymized(),
            Effect::LoadStoredResults => return Some(Msg::StoredResultsLoaded(self.load_results())),
            Effect::UploadFile { name, path } => self.engine.upload(name, path),
            Effect::RemoveFile { name } => self.engine.remove(name),
            Effect::ScheduleSuggestionLookup {
                question,
                generation,
                delay,
            } => self.engine.start_timer(
                TimerKey::Suggestion {
                    input: question,
                    generation,
                },
                delay,
            ),
            Effect::FetchSuggestions {
                question,
                generation,
                partial,
            } => self.engine.suggest(question, generation, partial),
            Effect::SubmitQuestions { run, request } => {
                self.engine.submit(run, request_body(request))
            }
            Effect::CheckStatus { run } => self.engine.check_status(run),
            Effect::SchedulePoll { run, delay } => {
                self.engine.start_timer(TimerKey::Poll { run }, delay)
            }
            Effect::CancelRun { run } => self.engine.cancel_run(run),
            Effect::PersistResults(results) => {
                let records: Vec<ResultRecord> = results.into_iter().map(to_record).collect();
                if let Err(err) = self.store.save(&records) {
                    secq_error!("Failed to persist analysis results: {}", err);
                }
            }
            Effect::DeleteStoredResults => {
                if let Err(err) = self.store.clear() {
                    secq_error!("Failed to clear analysis results: {}", err);
                }
            }
            Effect::Alert { .. } | Effect::ConfirmClearResults { .. } | Effect::ReloadPage => {
                secq_warn!("Page effect reached the effect runner: {:?}", effect);
            }
        }
        None
    }

    /// Waits up to `timeout` for the next engine answer.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    fn load_results(&self) -> Option<Vec<AnalysisResult>> {
        match self.store.load() {
            Ok(Some(records)) => Some(records.into_iter().map(to_result).collect()),
            Ok(None) => None,
            Err(err) => {
                secq_warn!("Ignoring unreadable stored results: {}", err);
                None
            }
        }
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished { name, result } => Msg::UploadFinished {
            name,
            result: result.map_err(to_failure),
        },
        EngineEvent::RemoveFinished { name, result } => Msg::RemoveFinished {
            name,
            result: result.map_err(to_failure),
        },
        EngineEvent::UploadedFilesListed(result) => {
            Msg::UploadedFilesLoaded(result.map_err(to_failure))
        }
        EngineEvent::AnonymizedFilesListed(result) => {
            Msg::AnonymizedFilesLoaded(result.map_err(to_failure))
        }
        EngineEvent::SuggestionsFetched {
            input,
            generation,
            result,
        } => Msg::SuggestionsLoaded {
            question: input,
            generation,
            result: result.map_err(to_failure),
        },
        EngineEvent::SubmissionFinished { run, result } => {
            if result.is_ok() {
                secq_info!("Submission for run {} accepted", run);
            }
            Msg::SubmissionFinished {
                run,
                result: result.map_err(to_failure),
            }
        }
        EngineEvent::StatusChecked { run, result } => Msg::StatusReceived {
            run,
            result: result.map(to_job_status).map_err(to_failure),
        },
        EngineEvent::TimerFired(TimerKey::Suggestion { input, generation }) => {
            Msg::SuggestionTimerElapsed {
                question: input,
                generation,
            }
        }
        EngineEvent::TimerFired(TimerKey::Poll { run }) => Msg::PollTimerElapsed { run },
    }
}

fn to_failure(err: ApiError) -> RequestFailure {
    match err.kind {
        FailureKind::HttpStatus(code) => RequestFailure::HttpStatus(code),
        _ => RequestFailure::Transport(err.to_string()),
    }
}

fn to_job_status(response: StatusResponse) -> JobStatus {
    match response.status {
        JobState::Complete => JobStatus::Complete(
            response
                .results
                .unwrap_or_default()
                .into_iter()
                .map(to_result)
                .collect(),
        ),
        JobState::Error => JobStatus::Error(
            response
                .message
                .unwrap_or_else(|| "unknown error".to_string()),
        ),
        JobState::Pending | JobState::Processing | JobState::Unknown => JobStatus::Pending,
    }
}

fn request_body(request: AnalysisRequest) -> AnalysisRequestBody {
    AnalysisRequestBody {
        ai_model: request.ai_model,
        api_key: request.api_key,
        questions: request.questions,
    }
}

fn to_result(record: ResultRecord) -> AnalysisResult {
    AnalysisResult {
        question: record.question,
        answer: record.answer,
        source: record.source,
        citation: record.citation,
    }
}

fn to_record(result: AnalysisResult) -> ResultRecord {
    ResultRecord {
        question: result.question,
        answer: result.answer,
        source: result.source,
        citation: result.citation,
    }
}
