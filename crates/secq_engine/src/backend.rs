use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use secq_logging::{secq_debug, secq_info};
use url::Url;

use crate::types::{AnonymizedFilesResponse, SuggestionsResponse, UploadedFilesResponse};
use crate::{AnalysisRequestBody, ApiError, FailureKind, StatusResponse};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// HTTP surface of the document-analysis server.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn upload_file(&self, name: &str, contents: Vec<u8>) -> Result<(), ApiError>;
    async fn remove_file(&self, name: &str) -> Result<(), ApiError>;
    async fn uploaded_files(&self) -> Result<Vec<String>, ApiError>;
    async fn anonymized_files(&self) -> Result<Vec<String>, ApiError>;
    async fn suggest_questions(&self, partial: &str) -> Result<Vec<String>, ApiError>;
    async fn submit_questions(&self, body: &AnalysisRequestBody) -> Result<(), ApiError>;
    async fn process_status(&self) -> Result<StatusResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, ApiError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// Parses the server root, forcing a trailing slash so relative joins keep any path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut base = Url::parse(raw.trim())
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(ApiError::new(
            FailureKind::InvalidUrl,
            format!("{raw} cannot be used as a base url"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn upload_file(&self, name: &str, contents: Vec<u8>) -> Result<(), ApiError> {
        let url = self.endpoint("upload_pdf")?;
        secq_info!("Uploading {} ({} bytes)", name, contents.len());
        let form = Form::new().part("file", Part::bytes(contents).file_name(name.to_string()));
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(|_| ())
    }

    async fn remove_file(&self, name: &str) -> Result<(), ApiError> {
        let mut url = self.endpoint("remove_pdf/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .push(name);
        secq_info!("Removing {}", name);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(|_| ())
    }

    async fn uploaded_files(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("get_uploaded_pdfs")?;
        let body: UploadedFilesResponse = get_json(&self.client, url).await?;
        Ok(body.uploaded_pdfs)
    }

    async fn anonymized_files(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("get_anonymized_files")?;
        let body: AnonymizedFilesResponse = get_json(&self.client, url).await?;
        Ok(body.anonymized_files)
    }

    async fn suggest_questions(&self, partial: &str) -> Result<Vec<String>, ApiError> {
        let mut url = self.endpoint("api/suggestions/suggest_questions")?;
        url.query_pairs_mut().append_pair("partial_input", partial);
        let body: SuggestionsResponse = get_json(&self.client, url).await?;
        secq_debug!("{} suggestions for {:?}", body.suggestions.len(), partial);
        Ok(body.suggestions)
    }

    async fn submit_questions(&self, body: &AnalysisRequestBody) -> Result<(), ApiError> {
        let url = self.endpoint("process_questions")?;
        secq_info!(
            "Submitting {} questions with model {}",
            body.questions.len(),
            body.ai_model
        );
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(|_| ())
    }

    async fn process_status(&self) -> Result<StatusResponse, ApiError> {
        let url = self.endpoint("process_status")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        // Failed jobs come back as a status document with HTTP 500.
        match serde_json::from_slice::<StatusResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )),
            Err(err) => Err(ApiError::new(FailureKind::Decode, err.to_string())),
        }
    }
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
) -> Result<T, ApiError> {
    let response = client.get(url).send().await.map_err(map_reqwest_error)?;
    ensure_success(response)?
        .json::<T>()
        .await
        .map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
