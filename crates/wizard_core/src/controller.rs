//! Upload wizard controller: validates the two uploads, mirrors the outcome
//! into the page, and hands the validated paths to the editor or the
//! processing endpoint.
//!
//! Every handler takes `&self` so a host can run several of them at once from
//! an `Arc`. State and page sit behind synchronous locks that are never held
//! across a request, so handlers interleave at their `.await` points and the
//! last completed write to a slot wins. When both are needed the state lock is
//! taken first and a slot's path and status change together.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use shared::{
    domain::{BehaviorMode, ElementId, FileRole},
    protocol::{
        display_file_name, CacheSnapshot, PrepareEditorResponse, ProcessRequest,
        TestApiResponse, ValidationResult, EDITOR_ROUTE,
    },
};
use tracing::{debug, error, info, warn};

use crate::{
    api::WizardApi,
    error::{WizardError, WizardResult},
    page::{BoundElements, StatusIndicator, UploadFile, WizardPage},
    state::{RolePhase, ValidatedFiles, WizardState},
};

pub const VALIDATED_TEXT: &str = "文件验证通过";
pub const VALIDATION_ERROR_TEXT: &str = "验证过程出错";
pub const NO_CACHE_TEXT: &str = "未获取到缓存数据";
pub const SUBMIT_PRECONDITION_TEXT: &str = "请先上传并验证原文和词典文件";
pub const EDITOR_PRECONDITION_TEXT: &str = "请先上传并验证原文文件";
const FALLBACK_CACHE_KEY: &str = "0";

fn structure_text(preserve_structure: bool) -> String {
    format!(
        "文档结构保留: {}",
        if preserve_structure { "是" } else { "否" }
    )
}

fn cache_loaded_text(csv_path: &str) -> String {
    format!("已加载缓存词典：{}", display_file_name(csv_path))
}

/// Shows the progress bar and hides it again when dropped, including when the
/// submit future is cancelled mid-request.
struct ProgressGuard<'a, P: WizardPage> {
    page: &'a Mutex<P>,
    id: Option<ElementId>,
}

impl<'a, P: WizardPage> ProgressGuard<'a, P> {
    fn show(page: &'a Mutex<P>, id: Option<ElementId>) -> Self {
        if let Some(id) = id {
            page.lock().set_visible(id, true);
        }
        Self { page, id }
    }
}

impl<P: WizardPage> Drop for ProgressGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.page.lock().set_visible(id, false);
        }
    }
}

pub struct WizardController<A, P> {
    api: A,
    elements: BoundElements,
    page: Mutex<P>,
    state: Mutex<WizardState>,
    startup_loaded: AtomicBool,
}

impl<A, P> WizardController<A, P>
where
    A: WizardApi,
    P: WizardPage,
{
    /// Binds the controller to `page`, failing if the page lacks an element the
    /// mode needs.
    pub fn new(api: A, mut page: P, mode: BehaviorMode) -> WizardResult<Self> {
        let elements = BoundElements::resolve(&page, mode)?;
        if mode == BehaviorMode::SubmitGated {
            page.set_enabled(elements.submit(), false);
        }
        Ok(Self {
            api,
            elements,
            page: Mutex::new(page),
            state: Mutex::new(WizardState::default()),
            startup_loaded: AtomicBool::new(false),
        })
    }

    pub fn mode(&self) -> BehaviorMode {
        self.elements.mode()
    }

    pub fn elements(&self) -> &BoundElements {
        &self.elements
    }

    pub async fn snapshot(&self) -> ValidatedFiles {
        self.state.lock().files().clone()
    }

    pub async fn phase(&self, role: FileRole) -> RolePhase {
        self.state.lock().phase(role)
    }

    pub async fn with_page<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        let page = self.page.lock();
        f(&page)
    }

    pub async fn with_page_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let mut page = self.page.lock();
        f(&mut page)
    }

    /// Validate button handler. Does nothing when no file is selected.
    pub async fn on_validate_clicked(&self, role: FileRole) -> Option<ValidationResult> {
        let selected = self.page.lock().selected_file(role);
        let Some(file) = selected else {
            debug!(role = %role, "validate clicked without a selected file");
            return None;
        };
        Some(self.validate_file(file, role).await)
    }

    /// File input change handler.
    pub async fn on_file_changed(&self, role: FileRole) {
        self.reset_role(role).await;
    }

    pub async fn on_submit_clicked(&self) -> WizardResult<String> {
        match self.mode() {
            BehaviorMode::SubmitGated => self.submit_for_processing().await,
            BehaviorMode::CachePersist => self.open_editor().await,
        }
    }

    pub async fn validate_file(&self, file: UploadFile, role: FileRole) -> ValidationResult {
        let file_name = file.name.clone();
        self.state.lock().begin_validation(role);

        let result = match self.api.validate_file(file, role).await {
            Ok(response) => ValidationResult::from(response),
            Err(err) => {
                error!(role = %role, file = %file_name, error = %err, "file validation request failed");
                ValidationResult::Failure {
                    message: VALIDATION_ERROR_TEXT.to_string(),
                }
            }
        };

        self.apply_validation(role, &result);
        if self.mode() == BehaviorMode::CachePersist {
            self.persist_to_cache().await;
        }
        result
    }

    fn apply_validation(&self, role: FileRole, result: &ValidationResult) {
        let mut state = self.state.lock();
        let mut page = self.page.lock();
        match result {
            ValidationResult::Success { path, .. } => state.record_success(role, path.clone()),
            ValidationResult::Failure { .. } => state.record_failure(role),
        }

        match result {
            ValidationResult::Success {
                preserve_structure,
                ..
            } => {
                page.set_status(
                    self.elements.status(role),
                    StatusIndicator::Success(VALIDATED_TEXT.to_string()),
                );
                if role == FileRole::Md {
                    if let (Some(flag), Some(id)) =
                        (preserve_structure, self.elements.structure_status())
                    {
                        page.set_text(id, structure_text(*flag));
                    }
                }
            }
            ValidationResult::Failure { message } => {
                page.set_status(
                    self.elements.status(role),
                    StatusIndicator::Error(message.clone()),
                );
            }
        }

        if self.mode() == BehaviorMode::SubmitGated {
            self.refresh_submit(&state, &mut *page);
        }
    }

    /// Pushes the current state to the server cache. Failures are logged and
    /// swallowed; the returned cache key is `None` in that case.
    pub async fn persist_to_cache(&self) -> Option<String> {
        match self.try_persist().await {
            Ok(response) if response.is_success() => {
                debug!(cache_key = ?response.cache_key(), "wizard state saved to cache");
                response.cache_key().map(str::to_string)
            }
            Ok(response) => {
                warn!(status = %response.status, message = ?response.message, "cache rejected wizard state");
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to save wizard state to cache");
                None
            }
        }
    }

    async fn try_persist(&self) -> WizardResult<PrepareEditorResponse> {
        let snapshot = self.cache_snapshot().await;
        self.api.prepare_editor(&snapshot).await
    }

    async fn cache_snapshot(&self) -> CacheSnapshot {
        let provider = self.selected_provider();
        self.state.lock().files().snapshot(provider)
    }

    fn selected_provider(&self) -> String {
        self.page
            .lock()
            .value(self.elements.provider())
            .unwrap_or_default()
    }

    fn refresh_submit(&self, state: &WizardState, page: &mut P) {
        page.set_enabled(self.elements.submit(), state.files().both_present());
    }

    pub async fn update_submit_availability(&self) {
        let state = self.state.lock();
        let mut page = self.page.lock();
        self.refresh_submit(&state, &mut *page);
    }

    pub async fn reset_role(&self, role: FileRole) {
        let mut state = self.state.lock();
        let mut page = self.page.lock();
        state.reset(role);
        page.set_status(self.elements.status(role), StatusIndicator::Empty);
        if self.mode() == BehaviorMode::SubmitGated {
            self.refresh_submit(&state, &mut *page);
        }
    }

    /// Submits both validated paths for processing and returns the download
    /// link. The progress bar is hidden again on every exit path.
    pub async fn submit_for_processing(&self) -> WizardResult<String> {
        let files = self.snapshot().await;
        let (Some(md_path), Some(csv_path)) = (files.md, files.csv) else {
            self.page.lock().alert(SUBMIT_PRECONDITION_TEXT.to_string());
            return Err(WizardError::PreconditionUnmet(
                SUBMIT_PRECONDITION_TEXT.to_string(),
            ));
        };

        let request = ProcessRequest {
            md_path,
            csv_path,
            llm_provider: self.selected_provider(),
        };

        let progress = ProgressGuard::show(&self.page, self.elements.progress_bar());
        let outcome = self.api.process(&request).await;
        drop(progress);

        let mut page = self.page.lock();
        match outcome {
            Ok(response) => {
                info!(output_file = %response.output_file, "processing finished");
                if let Some(id) = self.elements.result_panel() {
                    page.set_visible(id, true);
                }
                if let Some(id) = self.elements.download_link() {
                    page.set_link(id, response.output_file.clone());
                }
                Ok(response.output_file)
            }
            Err(err) => {
                error!(error = %err, "processing request failed");
                page.alert(format!("处理失败：{err}"));
                Err(err)
            }
        }
    }

    /// Saves the current state to the cache and navigates to the editor page
    /// for the returned cache key. Only the source document is required.
    pub async fn open_editor(&self) -> WizardResult<String> {
        if self.state.lock().files().md.is_none() {
            self.page.lock().alert(EDITOR_PRECONDITION_TEXT.to_string());
            return Err(WizardError::PreconditionUnmet(
                EDITOR_PRECONDITION_TEXT.to_string(),
            ));
        }

        let cache_key = self
            .persist_to_cache()
            .await
            .unwrap_or_else(|| FALLBACK_CACHE_KEY.to_string());
        let url = format!("{EDITOR_ROUTE}?cache_key={cache_key}");
        info!(url = %url, "opening editor");
        self.page.lock().navigate(url.clone());
        Ok(url)
    }

    /// Adopts the dictionary path and provider stored by an earlier session.
    /// Runs once per controller; returns `false` on repeat calls.
    pub async fn load_cached_state_on_startup(&self) -> bool {
        if self.startup_loaded.swap(true, Ordering::SeqCst) {
            debug!("cached state already loaded");
            return false;
        }

        let csv_status = self.elements.status(FileRole::Csv);
        match self.api.latest_cache().await {
            Ok(response) if response.is_success() => {
                let csv_path = response.csv_path().map(str::to_string);
                let provider = response.llm_provider().map(str::to_string);

                {
                    let mut state = self.state.lock();
                    let mut page = self.page.lock();
                    if let Some(path) = &csv_path {
                        state.adopt_cached(FileRole::Csv, path.clone());
                    }
                    match &csv_path {
                        Some(path) => page.set_status(
                            csv_status,
                            StatusIndicator::Success(cache_loaded_text(path)),
                        ),
                        None if provider.is_none() => page.set_status(
                            csv_status,
                            StatusIndicator::Warning(NO_CACHE_TEXT.to_string()),
                        ),
                        None => {}
                    }
                    if let Some(provider) = &provider {
                        page.set_value(self.elements.provider(), provider.clone());
                    }
                    if csv_path.is_some() && self.mode() == BehaviorMode::SubmitGated {
                        self.refresh_submit(&state, &mut *page);
                    }
                }

                info!(csv_path = ?csv_path, llm_provider = ?provider, "loaded cached wizard state");
            }
            Ok(response) => {
                debug!(status = %response.status, message = ?response.message, "no cached wizard state");
                self.page.lock().set_status(
                    csv_status,
                    StatusIndicator::Warning(NO_CACHE_TEXT.to_string()),
                );
            }
            Err(err) => {
                error!(error = %err, "failed to read cached wizard state");
                self.page.lock().set_status(
                    csv_status,
                    StatusIndicator::Error(format!("读取缓存失败：{err}")),
                );
            }
        }
        true
    }

    pub async fn test_api_connection(&self) -> WizardResult<TestApiResponse> {
        let provider = self.selected_provider();
        match self.api.test_api(&provider).await {
            Ok(response) if response.is_error() => {
                let detail = response.error.clone().unwrap_or_default();
                warn!(provider = %provider, error = %detail, "API test reported an error");
                self.page.lock().alert(format!("API测试失败：{detail}"));
                Ok(response)
            }
            Ok(response) => {
                debug!(provider = %provider, results = ?response.test_results, "API test finished");
                Ok(response)
            }
            Err(err) => {
                error!(provider = %provider, error = %err, "API test request failed");
                self.page.lock().alert(format!("API测试失败：{err}"));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
