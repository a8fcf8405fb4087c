//! Secq engine: HTTP backend, timers and the local results store.
mod backend;
mod engine;
mod store;
mod types;

pub use backend::{parse_base_url, Backend, BackendSettings, ReqwestBackend, DEFAULT_BASE_URL};
pub use engine::EngineHandle;
pub use store::{ensure_store_dir, LocalStore, ResultsStore, StoreError, RESULTS_KEY};
pub use types::{
    AnalysisRequestBody, ApiError, EngineEvent, FailureKind, InputId, JobState, ResultRecord,
    RunId, StatusResponse, TimerKey,
};
