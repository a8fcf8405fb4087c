use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use secq_logging::{secq_debug, secq_warn};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, BackendSettings, ReqwestBackend};
use crate::{AnalysisRequestBody, ApiError, EngineEvent, FailureKind, InputId, RunId, TimerKey};

enum EngineCommand {
    Upload { name: String, path: PathBuf },
    Remove { name: String },
    ListUploaded,
    ListAnonymized,
    Suggest {
        input: InputId,
        generation: u64,
        partial: String,
    },
    Submit {
        run: RunId,
        body: AnalysisRequestBody,
    },
    CheckStatus { run: RunId },
    StartTimer { key: TimerKey, delay: Duration },
    CancelRun { run: RunId },
}

/// Cancellation tokens for analysis runs.
///
/// Run ids only increase, so every id at or below `cancelled_through` is dead.
#[derive(Default)]
struct RunRegistry {
    active: HashMap<RunId, CancellationToken>,
    cancelled_through: RunId,
}

impl RunRegistry {
    fn token(&mut self, run: RunId) -> CancellationToken {
        if run <= self.cancelled_through {
            let token = CancellationToken::new();
            token.cancel();
            return token;
        }
        self.active.entry(run).or_default().clone()
    }

    fn cancel(&mut self, run: RunId) {
        self.cancelled_through = self.cancelled_through.max(run);
        let cancelled_through = self.cancelled_through;
        self.active.retain(|id, token| {
            if *id <= cancelled_through {
                token.cancel();
                false
            } else {
                true
            }
        });
    }
}

/// Runs backend requests and timers on a dedicated tokio runtime.
///
/// Commands are fire-and-forget; every command answers with exactly one
/// [`EngineEvent`] unless its run was cancelled first.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn Backend>) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            let mut runs = RunRegistry::default();
            while let Ok(command) = cmd_rx.recv() {
                let token = match &command {
                    EngineCommand::CancelRun { run } => {
                        runs.cancel(*run);
                        secq_debug!("Run {} cancelled", run);
                        continue;
                    }
                    EngineCommand::Submit { run, .. }
                    | EngineCommand::CheckStatus { run }
                    | EngineCommand::StartTimer {
                        key: TimerKey::Poll { run },
                        ..
                    } => Some(runs.token(*run)),
                    _ => None,
                };
                let backend = backend.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let Some(token) = token else {
                        if let Some(event) = handle_command(backend.as_ref(), command).await {
                            let _ = event_tx.send(event);
                        }
                        return;
                    };
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {}
                        event = handle_command(backend.as_ref(), command) => {
                            if let Some(event) = event {
                                let _ = event_tx.send(event);
                            }
                        }
                    }
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    /// Engine over the real HTTP backend.
    pub fn connect(settings: &BackendSettings) -> Result<Self, ApiError> {
        let backend = ReqwestBackend::new(settings)?;
        Self::new(Arc::new(backend))
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))
    }

    pub fn upload(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Upload {
            name: name.into(),
            path: path.into(),
        });
    }

    pub fn remove(&self, name: impl Into<String>) {
        self.send(EngineCommand::Remove { name: name.into() });
    }

    pub fn list_uploaded(&self) {
        self.send(EngineCommand::ListUploaded);
    }

    pub fn list_anonymized(&self) {
        self.send(EngineCommand::ListAnonymized);
    }

    pub fn suggest(&self, input: InputId, generation: u64, partial: impl Into<String>) {
        self.send(EngineCommand::Suggest {
            input,
            generation,
            partial: partial.into(),
        });
    }

    pub fn submit(&self, run: RunId, body: AnalysisRequestBody) {
        self.send(EngineCommand::Submit { run, body });
    }

    pub fn check_status(&self, run: RunId) {
        self.send(EngineCommand::CheckStatus { run });
    }

    /// Emits `EngineEvent::TimerFired(key)` after `delay`.
    pub fn start_timer(&self, key: TimerKey, delay: Duration) {
        self.send(EngineCommand::StartTimer { key, delay });
    }

    /// Drops pending timers and requests of `run`; later commands for it are no-ops.
    pub fn cancel_run(&self, run: RunId) {
        self.send(EngineCommand::CancelRun { run });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            secq_warn!("Engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(backend: &dyn Backend, command: EngineCommand) -> Option<EngineEvent> {
    let event = match command {
        EngineCommand::Upload { name, path } => {
            let result = match tokio::fs::read(&path).await {
                Ok(contents) => backend.upload_file(&name, contents).await,
                Err(err) => Err(ApiError::new(
                    FailureKind::Io,
                    format!("reading {}: {err}", path.display()),
                )),
            };
            EngineEvent::UploadFinished { name, result }
        }
        EngineCommand::Remove { name } => {
            let result = backend.remove_file(&name).await;
            EngineEvent::RemoveFinished { name, result }
        }
        EngineCommand::ListUploaded => {
            EngineEvent::UploadedFilesListed(backend.uploaded_files().await)
        }
        EngineCommand::ListAnonymized => {
            EngineEvent::AnonymizedFilesListed(backend.anonymized_files().await)
        }
        EngineCommand::Suggest {
            input,
            generation,
            partial,
        } => EngineEvent::SuggestionsFetched {
            input,
            generation,
            result: backend.suggest_questions(&partial).await,
        },
        EngineCommand::Submit { run, body } => EngineEvent::SubmissionFinished {
            run,
            result: backend.submit_questions(&body).await,
        },
        EngineCommand::CheckStatus { run } => EngineEvent::StatusChecked {
            run,
            result: backend.process_status().await,
        },
        EngineCommand::StartTimer { key, delay } => {
            tokio::time::sleep(delay).await;
            EngineEvent::TimerFired(key)
        }
        EngineCommand::CancelRun { .. } => return None,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_a_run_retires_it_and_older_runs() {
        let mut runs = RunRegistry::default();
        let first = runs.token(1);
        let second = runs.token(2);

        runs.cancel(2);
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
        assert!(runs.active.is_empty());
        assert!(runs.token(1).is_cancelled());
        assert!(runs.token(2).is_cancelled());

        let third = runs.token(3);
        assert!(!third.is_cancelled());
        assert_eq!(runs.active.len(), 1);
    }

    #[test]
    fn late_cancel_of_an_old_run_keeps_newer_ones() {
        let mut runs = RunRegistry::default();
        runs.cancel(4);
        let live = runs.token(5);

        runs.cancel(3);
        assert_eq!(runs.cancelled_through, 4);
        assert!(!live.is_cancelled());
        assert_eq!(runs.active.len(), 1);
    }
}
