//! Page surface the controller renders into, plus the element binding that is
//! checked once when a controller is built.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    path::Path,
};

use shared::domain::{BehaviorMode, ElementId, FileRole};

use crate::error::{WizardError, WizardResult};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusIndicator {
    #[default]
    Empty,
    Success(String),
    Warning(String),
    Error(String),
}

impl StatusIndicator {
    pub fn render(&self) -> String {
        match self {
            StatusIndicator::Empty => String::new(),
            StatusIndicator::Success(text) => format!("✓ {text}"),
            StatusIndicator::Warning(text) => text.clone(),
            StatusIndicator::Error(text) => format!("✗ {text}"),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StatusIndicator::Empty)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusIndicator::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusIndicator::Error(_))
    }
}

impl fmt::Display for StatusIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A file picked in one of the upload inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name).first().map(|m| m.to_string());
        Self {
            name,
            bytes: bytes.into(),
            mime,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> WizardResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path).first().map(|m| m.to_string());
        Ok(Self { name, bytes, mime })
    }
}

pub trait WizardPage: Send {
    fn has_element(&self, id: ElementId) -> bool;
    /// File currently chosen in the role's input, if any.
    fn selected_file(&self, role: FileRole) -> Option<UploadFile>;
    fn set_status(&mut self, id: ElementId, status: StatusIndicator);
    fn set_text(&mut self, id: ElementId, text: String);
    fn value(&self, id: ElementId) -> Option<String>;
    fn set_value(&mut self, id: ElementId, value: String);
    fn set_enabled(&mut self, id: ElementId, enabled: bool);
    fn set_visible(&mut self, id: ElementId, visible: bool);
    fn set_link(&mut self, id: ElementId, href: String);
    fn alert(&mut self, message: String);
    fn navigate(&mut self, url: String);
}

/// Element ids the controller writes to, resolved against the page up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundElements {
    mode: BehaviorMode,
    structure_status: Option<ElementId>,
    progress_bar: Option<ElementId>,
    result_panel: Option<ElementId>,
    download_link: Option<ElementId>,
}

impl BoundElements {
    pub fn resolve<P: WizardPage + ?Sized>(page: &P, mode: BehaviorMode) -> WizardResult<Self> {
        if let Some(missing) = mode
            .required_elements()
            .into_iter()
            .find(|id| !page.has_element(*id))
        {
            return Err(WizardError::MissingElement(missing));
        }

        // Optional elements; submit-gated pages are guaranteed to carry the
        // processing ones by the check above.
        let optional = |id: ElementId| page.has_element(id).then_some(id);

        Ok(Self {
            mode,
            structure_status: optional(ElementId::StructureStatus),
            progress_bar: optional(ElementId::ProgressBar),
            result_panel: optional(ElementId::Result),
            download_link: optional(ElementId::DownloadLink),
        })
    }

    pub fn mode(&self) -> BehaviorMode {
        self.mode
    }

    pub fn status(&self, role: FileRole) -> ElementId {
        role.status_element()
    }

    pub fn submit(&self) -> ElementId {
        self.mode.submit_element()
    }

    pub fn structure_status(&self) -> Option<ElementId> {
        self.structure_status
    }

    pub fn progress_bar(&self) -> Option<ElementId> {
        self.progress_bar
    }

    pub fn result_panel(&self) -> Option<ElementId> {
        self.result_panel
    }

    pub fn download_link(&self) -> Option<ElementId> {
        self.download_link
    }

    pub fn provider(&self) -> ElementId {
        ElementId::LlmProvider
    }
}

/// In-memory page. Records every update so hosts can render it and tests can
/// assert on it.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    elements: BTreeSet<ElementId>,
    files: HashMap<FileRole, UploadFile>,
    statuses: BTreeMap<ElementId, StatusIndicator>,
    texts: BTreeMap<ElementId, String>,
    values: BTreeMap<ElementId, String>,
    enabled: BTreeMap<ElementId, bool>,
    visible: BTreeMap<ElementId, bool>,
    links: BTreeMap<ElementId, String>,
    alerts: Vec<String>,
    navigations: Vec<String>,
}

impl MemoryPage {
    /// Page carrying every known element, with the process button disabled and
    /// the progress bar and result panel hidden.
    pub fn complete() -> Self {
        Self::with_elements(ElementId::ALL)
    }

    pub fn with_elements(ids: impl IntoIterator<Item = ElementId>) -> Self {
        let mut page = Self {
            elements: ids.into_iter().collect(),
            ..Default::default()
        };
        page.enabled.insert(ElementId::ProcessBtn, false);
        page.visible.insert(ElementId::ProgressBar, false);
        page.visible.insert(ElementId::Result, false);
        page
    }

    pub fn without(mut self, id: ElementId) -> Self {
        self.elements.remove(&id);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.values.insert(ElementId::LlmProvider, provider.into());
        self
    }

    pub fn select_file(&mut self, role: FileRole, file: UploadFile) {
        self.files.insert(role, file);
    }

    pub fn status(&self, id: ElementId) -> StatusIndicator {
        self.statuses.get(&id).cloned().unwrap_or_default()
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    pub fn is_enabled(&self, id: ElementId) -> bool {
        self.enabled.get(&id).copied().unwrap_or(true)
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.visible.get(&id).copied().unwrap_or(true)
    }

    pub fn link(&self, id: ElementId) -> Option<&str> {
        self.links.get(&id).map(String::as_str)
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

impl WizardPage for MemoryPage {
    fn has_element(&self, id: ElementId) -> bool {
        self.elements.contains(&id)
    }

    fn selected_file(&self, role: FileRole) -> Option<UploadFile> {
        self.files.get(&role).cloned()
    }

    fn set_status(&mut self, id: ElementId, status: StatusIndicator) {
        self.statuses.insert(id, status);
    }

    fn set_text(&mut self, id: ElementId, text: String) {
        self.texts.insert(id, text);
    }

    fn value(&self, id: ElementId) -> Option<String> {
        self.values.get(&id).cloned()
    }

    fn set_value(&mut self, id: ElementId, value: String) {
        self.values.insert(id, value);
    }

    fn set_enabled(&mut self, id: ElementId, enabled: bool) {
        self.enabled.insert(id, enabled);
    }

    fn set_visible(&mut self, id: ElementId, visible: bool) {
        self.visible.insert(id, visible);
    }

    fn set_link(&mut self, id: ElementId, href: String) {
        self.links.insert(id, href);
    }

    fn alert(&mut self, message: String) {
        self.alerts.push(message);
    }

    fn navigate(&mut self, url: String) {
        self.navigations.push(url);
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
