use serde::{Deserialize, Deserializer, Serialize};

pub const VALIDATE_FILE_ROUTE: &str = "/validate-file";
pub const PREPARE_EDITOR_ROUTE: &str = "/prepare-editor";
pub const PROCESS_ROUTE: &str = "/process";
pub const LATEST_CACHE_ROUTE: &str = "/get-latest-cache";
pub const TEST_API_ROUTE: &str = "/test-api";
pub const EDITOR_ROUTE: &str = "/editor";

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Message used when the validator rejects a file without saying why.
pub const GENERIC_REJECTION_MESSAGE: &str = "验证失败";

fn is_success(status: &str) -> bool {
    status == STATUS_SUCCESS
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A flag that is present counts even when it is `null`, which reads as `false`.
/// Only a missing key stays `None`.
fn present_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|flag| Some(flag.unwrap_or(false)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateFileResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub preserve_structure: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Success {
        path: String,
        preserve_structure: Option<bool>,
    },
    Failure {
        message: String,
    },
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success { .. })
    }
}

impl From<ValidateFileResponse> for ValidationResult {
    fn from(value: ValidateFileResponse) -> Self {
        if !is_success(&value.status) {
            return ValidationResult::Failure {
                message: value
                    .message
                    .unwrap_or_else(|| GENERIC_REJECTION_MESSAGE.to_string()),
            };
        }
        match value.file_path {
            Some(path) if !path.is_empty() => ValidationResult::Success {
                path,
                preserve_structure: value.preserve_structure,
            },
            _ => ValidationResult::Failure {
                message: "validator reported success without a file path".to_string(),
            },
        }
    }
}

/// State pushed to `/prepare-editor`. Unvalidated slots are sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub md_path: String,
    pub csv_path: String,
    pub llm_provider: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepareEditorResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PrepareEditorResponse {
    pub fn is_success(&self) -> bool {
        is_success(&self.status)
    }

    pub fn cache_key(&self) -> Option<&str> {
        non_empty(&self.cache_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub md_path: String,
    pub csv_path: String,
    pub llm_provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub output_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestCacheResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LatestCacheResponse {
    pub fn is_success(&self) -> bool {
        is_success(&self.status)
    }

    pub fn csv_path(&self) -> Option<&str> {
        non_empty(&self.csv_path)
    }

    pub fn llm_provider(&self) -> Option<&str> {
        non_empty(&self.llm_provider)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<serde_json::Value>,
}

impl TestApiResponse {
    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }
}

/// Final path component of a server-side path, accepting either separator.
pub fn display_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
