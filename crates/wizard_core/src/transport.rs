//! `reqwest` implementation of [`WizardApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::FileRole,
    protocol::{
        CacheSnapshot, LatestCacheResponse, PrepareEditorResponse, ProcessRequest,
        ProcessResponse, TestApiResponse, ValidateFileResponse, LATEST_CACHE_ROUTE,
        PREPARE_EDITOR_ROUTE, PROCESS_ROUTE, TEST_API_ROUTE, VALIDATE_FILE_ROUTE,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    api::WizardApi,
    error::{WizardError, WizardResult},
    page::UploadFile,
};

const DEFAULT_UPLOAD_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct HttpWizardApi {
    http: Client,
    base_url: Url,
}

impl HttpWizardApi {
    pub fn new(server_url: &str) -> WizardResult<Self> {
        Self::with_timeout(server_url, None)
    }

    /// The timeout is a transport setting; the controller never applies one itself.
    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> WizardResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: normalize_base_url(server_url)?,
        })
    }

    /// Absolute URL for a server route, keeping any path prefix of the base.
    pub fn endpoint(&self, route: &str) -> WizardResult<Url> {
        Ok(self.base_url.join(route.trim_start_matches('/'))?)
    }
}

fn normalize_base_url(server_url: &str) -> WizardResult<Url> {
    let mut url = Url::parse(server_url.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn file_part(file: UploadFile) -> WizardResult<Part> {
    let mime = file
        .mime
        .unwrap_or_else(|| DEFAULT_UPLOAD_MIME.to_string());
    Ok(Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(&mime)?)
}

#[async_trait]
impl WizardApi for HttpWizardApi {
    async fn validate_file(
        &self,
        file: UploadFile,
        role: FileRole,
    ) -> WizardResult<ValidateFileResponse> {
        debug!(file = %file.name, role = %role, bytes = file.bytes.len(), "uploading file for validation");
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("file_type", role.as_str());
        let response = self
            .http
            .post(self.endpoint(VALIDATE_FILE_ROUTE)?)
            .multipart(form)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    async fn prepare_editor(
        &self,
        snapshot: &CacheSnapshot,
    ) -> WizardResult<PrepareEditorResponse> {
        let response = self
            .http
            .post(self.endpoint(PREPARE_EDITOR_ROUTE)?)
            .json(snapshot)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    async fn process(&self, request: &ProcessRequest) -> WizardResult<ProcessResponse> {
        let form = Form::new()
            .text("md_path", request.md_path.clone())
            .text("csv_path", request.csv_path.clone())
            .text("llm_provider", request.llm_provider.clone());
        let response = self
            .http
            .post(self.endpoint(PROCESS_ROUTE)?)
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WizardError::Processing {
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    async fn latest_cache(&self) -> WizardResult<LatestCacheResponse> {
        let response = self
            .http
            .get(self.endpoint(LATEST_CACHE_ROUTE)?)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    async fn test_api(&self, llm_provider: &str) -> WizardResult<TestApiResponse> {
        let form = Form::new().text("llm_provider", llm_provider.to_string());
        let response = self
            .http
            .post(self.endpoint(TEST_API_ROUTE)?)
            .multipart(form)
            .send()
            .await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
