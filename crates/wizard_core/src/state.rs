use shared::{domain::FileRole, protocol::CacheSnapshot};

/// Server-assigned paths for each upload slot. A slot is filled only after the
/// validator accepted its file and nothing has reset it since.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFiles {
    pub md: Option<String>,
    pub csv: Option<String>,
}

impl ValidatedFiles {
    pub fn get(&self, role: FileRole) -> Option<&str> {
        match role {
            FileRole::Md => self.md.as_deref(),
            FileRole::Csv => self.csv.as_deref(),
        }
    }

    pub fn set(&mut self, role: FileRole, path: impl Into<String>) {
        *self.slot_mut(role) = Some(path.into());
    }

    pub fn clear(&mut self, role: FileRole) {
        *self.slot_mut(role) = None;
    }

    pub fn both_present(&self) -> bool {
        self.md.is_some() && self.csv.is_some()
    }

    pub fn snapshot(&self, llm_provider: impl Into<String>) -> CacheSnapshot {
        CacheSnapshot {
            md_path: self.md.clone().unwrap_or_default(),
            csv_path: self.csv.clone().unwrap_or_default(),
            llm_provider: llm_provider.into(),
        }
    }

    fn slot_mut(&mut self, role: FileRole) -> &mut Option<String> {
        match role {
            FileRole::Md => &mut self.md,
            FileRole::Csv => &mut self.csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolePhase {
    #[default]
    Unvalidated,
    Validating,
    Validated,
    Rejected,
}

/// Controller-owned state: the validated paths plus where each slot sits in its
/// validation lifecycle.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    files: ValidatedFiles,
    md_phase: RolePhase,
    csv_phase: RolePhase,
}

impl WizardState {
    pub fn files(&self) -> &ValidatedFiles {
        &self.files
    }

    pub fn phase(&self, role: FileRole) -> RolePhase {
        match role {
            FileRole::Md => self.md_phase,
            FileRole::Csv => self.csv_phase,
        }
    }

    pub fn begin_validation(&mut self, role: FileRole) {
        *self.phase_mut(role) = RolePhase::Validating;
    }

    // Completions apply even when a reset landed while the request was in
    // flight: the later write wins.
    pub fn record_success(&mut self, role: FileRole, path: impl Into<String>) {
        self.files.set(role, path);
        *self.phase_mut(role) = RolePhase::Validated;
    }

    pub fn record_failure(&mut self, role: FileRole) {
        self.files.clear(role);
        *self.phase_mut(role) = RolePhase::Rejected;
    }

    pub fn reset(&mut self, role: FileRole) {
        self.files.clear(role);
        *self.phase_mut(role) = RolePhase::Unvalidated;
    }

    pub fn adopt_cached(&mut self, role: FileRole, path: impl Into<String>) {
        self.files.set(role, path);
        *self.phase_mut(role) = RolePhase::Validated;
    }

    fn phase_mut(&mut self, role: FileRole) -> &mut RolePhase {
        match role {
            FileRole::Md => &mut self.md_phase,
            FileRole::Csv => &mut self.csv_phase,
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
