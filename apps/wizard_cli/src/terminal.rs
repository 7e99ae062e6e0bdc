//! Page surface that echoes every update to stdout.

use shared::domain::{ElementId, FileRole};
use wizard_core::{MemoryPage, StatusIndicator, UploadFile, WizardPage};

pub struct TerminalPage {
    inner: MemoryPage,
}

impl TerminalPage {
    pub fn new(inner: MemoryPage) -> Self {
        Self { inner }
    }

    pub fn select_file(&mut self, role: FileRole, file: UploadFile) {
        println!("[{}] selected {}", role.input_element(), file.name);
        self.inner.select_file(role, file);
    }

    pub fn inner(&self) -> &MemoryPage {
        &self.inner
    }
}

impl WizardPage for TerminalPage {
    fn has_element(&self, id: ElementId) -> bool {
        self.inner.has_element(id)
    }

    fn selected_file(&self, role: FileRole) -> Option<UploadFile> {
        self.inner.selected_file(role)
    }

    fn set_status(&mut self, id: ElementId, status: StatusIndicator) {
        if !status.is_empty() {
            println!("[{id}] {status}");
        }
        self.inner.set_status(id, status);
    }

    fn set_text(&mut self, id: ElementId, text: String) {
        println!("[{id}] {text}");
        self.inner.set_text(id, text);
    }

    fn value(&self, id: ElementId) -> Option<String> {
        self.inner.value(id)
    }

    fn set_value(&mut self, id: ElementId, value: String) {
        println!("[{id}] = {value}");
        self.inner.set_value(id, value);
    }

    fn set_enabled(&mut self, id: ElementId, enabled: bool) {
        self.inner.set_enabled(id, enabled);
    }

    fn set_visible(&mut self, id: ElementId, visible: bool) {
        if id == ElementId::ProgressBar && visible {
            println!("processing...");
        }
        self.inner.set_visible(id, visible);
    }

    fn set_link(&mut self, id: ElementId, href: String) {
        println!("[{id}] {href}");
        self.inner.set_link(id, href);
    }

    fn alert(&mut self, message: String) {
        eprintln!("! {message}");
        self.inner.alert(message);
    }

    fn navigate(&mut self, url: String) {
        println!("-> {url}");
        self.inner.navigate(url);
    }
}
