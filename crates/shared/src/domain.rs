use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainParseError;

/// The two upload slots of the wizard: the source document and its companion
/// terminology table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Md,
    Csv,
}

impl FileRole {
    pub const ALL: [FileRole; 2] = [FileRole::Md, FileRole::Csv];

    /// Value sent as the `file_type` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Md => "md",
            FileRole::Csv => "csv",
        }
    }

    pub fn input_element(self) -> ElementId {
        match self {
            FileRole::Md => ElementId::MdFile,
            FileRole::Csv => ElementId::CsvFile,
        }
    }

    pub fn status_element(self) -> ElementId {
        match self {
            FileRole::Md => ElementId::MdFileStatus,
            FileRole::Csv => ElementId::CsvFileStatus,
        }
    }

    pub fn validate_button(self) -> ElementId {
        match self {
            FileRole::Md => ElementId::ValidateMdBtn,
            FileRole::Csv => ElementId::ValidateCsvBtn,
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileRole {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" => Ok(FileRole::Md),
            "csv" => Ok(FileRole::Csv),
            other => Err(DomainParseError::UnknownRole(other.to_string())),
        }
    }
}

/// Which of the two page flavours the controller drives.
///
/// `CachePersist` pushes a cache snapshot to the server after every validation
/// outcome and hands off to the editor page. `SubmitGated` keeps state local,
/// gates the process button on both files being validated, and submits the
/// processing request itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BehaviorMode {
    CachePersist,
    #[default]
    SubmitGated,
}

impl BehaviorMode {
    pub fn submit_element(self) -> ElementId {
        match self {
            BehaviorMode::CachePersist => ElementId::EditorBtn,
            BehaviorMode::SubmitGated => ElementId::ProcessBtn,
        }
    }

    /// Elements the page must supply for this mode, checked once at bind time.
    pub fn required_elements(self) -> Vec<ElementId> {
        let mut ids = vec![
            ElementId::MdFile,
            ElementId::CsvFile,
            ElementId::MdFileStatus,
            ElementId::CsvFileStatus,
            ElementId::LlmProvider,
            ElementId::ValidateMdBtn,
            ElementId::ValidateCsvBtn,
            self.submit_element(),
        ];
        if self == BehaviorMode::SubmitGated {
            ids.extend([
                ElementId::ProgressBar,
                ElementId::Result,
                ElementId::DownloadLink,
            ]);
        }
        ids
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorMode::CachePersist => f.write_str("cache-persist"),
            BehaviorMode::SubmitGated => f.write_str("submit-gated"),
        }
    }
}

impl FromStr for BehaviorMode {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cache-persist" | "cache" | "editor" => Ok(BehaviorMode::CachePersist),
            "submit-gated" | "submit" | "process" => Ok(BehaviorMode::SubmitGated),
            other => Err(DomainParseError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    MdFile,
    CsvFile,
    MdFileStatus,
    CsvFileStatus,
    StructureStatus,
    LlmProvider,
    ValidateMdBtn,
    ValidateCsvBtn,
    EditorBtn,
    ProcessBtn,
    ProgressBar,
    Result,
    DownloadLink,
}

impl ElementId {
    pub const ALL: [ElementId; 13] = [
        ElementId::MdFile,
        ElementId::CsvFile,
        ElementId::MdFileStatus,
        ElementId::CsvFileStatus,
        ElementId::StructureStatus,
        ElementId::LlmProvider,
        ElementId::ValidateMdBtn,
        ElementId::ValidateCsvBtn,
        ElementId::EditorBtn,
        ElementId::ProcessBtn,
        ElementId::ProgressBar,
        ElementId::Result,
        ElementId::DownloadLink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::MdFile => "mdFile",
            ElementId::CsvFile => "csvFile",
            ElementId::MdFileStatus => "mdFileStatus",
            ElementId::CsvFileStatus => "csvFileStatus",
            ElementId::StructureStatus => "structureStatus",
            ElementId::LlmProvider => "llmProvider",
            ElementId::ValidateMdBtn => "validateMdBtn",
            ElementId::ValidateCsvBtn => "validateCsvBtn",
            ElementId::EditorBtn => "editorBtn",
            ElementId::ProcessBtn => "processBtn",
            ElementId::ProgressBar => "progressBar",
            ElementId::Result => "result",
            ElementId::DownloadLink => "downloadLink",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
