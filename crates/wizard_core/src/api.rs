use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::FileRole,
    protocol::{
        CacheSnapshot, LatestCacheResponse, PrepareEditorResponse, ProcessRequest,
        ProcessResponse, TestApiResponse, ValidateFileResponse,
    },
};

use crate::{error::WizardResult, page::UploadFile};

/// Server endpoints the wizard talks to. Each call maps to one HTTP request.
#[async_trait]
pub trait WizardApi: Send + Sync {
    async fn validate_file(
        &self,
        file: UploadFile,
        role: FileRole,
    ) -> WizardResult<ValidateFileResponse>;
    async fn prepare_editor(&self, snapshot: &CacheSnapshot)
        -> WizardResult<PrepareEditorResponse>;
    async fn process(&self, request: &ProcessRequest) -> WizardResult<ProcessResponse>;
    async fn latest_cache(&self) -> WizardResult<LatestCacheResponse>;
    async fn test_api(&self, llm_provider: &str) -> WizardResult<TestApiResponse>;
}

#[async_trait]
impl<T> WizardApi for Arc<T>
where
    T: WizardApi + ?Sized,
{
    async fn validate_file(
        &self,
        file: UploadFile,
        role: FileRole,
    ) -> WizardResult<ValidateFileResponse> {
        (**self).validate_file(file, role).await
    }

    async fn prepare_editor(
        &self,
        snapshot: &CacheSnapshot,
    ) -> WizardResult<PrepareEditorResponse> {
        (**self).prepare_editor(snapshot).await
    }

    async fn process(&self, request: &ProcessRequest) -> WizardResult<ProcessResponse> {
        (**self).process(request).await
    }

    async fn latest_cache(&self) -> WizardResult<LatestCacheResponse> {
        (**self).latest_cache().await
    }

    async fn test_api(&self, llm_provider: &str) -> WizardResult<TestApiResponse> {
        (**self).test_api(llm_provider).await
    }
}
