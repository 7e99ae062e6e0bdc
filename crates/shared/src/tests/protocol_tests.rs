use super::*;

#[test]
fn success_response_carries_path_and_structure_flag() {
    let response: ValidateFileResponse = serde_json::from_str(
        r#"{"status":"success","message":"文件验证通过","file_path":"/tmp/a.md","preserve_structure":true}"#,
    )
    .expect("decode");

    assert_eq!(
        ValidationResult::from(response),
        ValidationResult::Success {
            path: "/tmp/a.md".to_string(),
            preserve_structure: Some(true),
        }
    );
}

#[test]
fn null_structure_flag_counts_as_present_and_false() {
    let null_flag: ValidateFileResponse = serde_json::from_str(
        r#"{"status":"success","file_path":"/tmp/a.md","preserve_structure":null}"#,
    )
    .expect("decode");
    assert_eq!(null_flag.preserve_structure, Some(false));

    let missing_flag: ValidateFileResponse =
        serde_json::from_str(r#"{"status":"success","file_path":"/tmp/a.md"}"#).expect("decode");
    assert_eq!(missing_flag.preserve_structure, None);
}

#[test]
fn error_response_keeps_server_message() {
    let response: ValidateFileResponse =
        serde_json::from_str(r#"{"status":"error","message":"bad header"}"#).expect("decode");

    assert_eq!(
        ValidationResult::from(response),
        ValidationResult::Failure {
            message: "bad header".to_string()
        }
    );
}

#[test]
fn success_without_path_is_a_failure() {
    let response = ValidateFileResponse {
        status: STATUS_SUCCESS.to_string(),
        ..Default::default()
    };
    assert!(!ValidationResult::from(response).is_success());
}

#[test]
fn unknown_status_without_message_uses_generic_text() {
    let response = ValidateFileResponse {
        status: "pending".to_string(),
        ..Default::default()
    };
    assert_eq!(
        ValidationResult::from(response),
        ValidationResult::Failure {
            message: GENERIC_REJECTION_MESSAGE.to_string()
        }
    );
}

#[test]
fn latest_cache_treats_empty_strings_as_absent() {
    let response: LatestCacheResponse = serde_json::from_str(
        r#"{"status":"success","md_path":"","csv_path":"","llm_provider":"","cache_key":""}"#,
    )
    .expect("decode");

    assert!(response.is_success());
    assert_eq!(response.csv_path(), None);
    assert_eq!(response.llm_provider(), None);
}

#[test]
fn cache_snapshot_serializes_all_fields() {
    let snapshot = CacheSnapshot {
        md_path: "/tmp/a.md".to_string(),
        csv_path: String::new(),
        llm_provider: "deepseek".to_string(),
    };
    let value = serde_json::to_value(&snapshot).expect("encode");
    assert_eq!(
        value,
        serde_json::json!({"md_path": "/tmp/a.md", "csv_path": "", "llm_provider": "deepseek"})
    );
}

#[test]
fn display_file_name_handles_both_separators() {
    assert_eq!(display_file_name("/tmp/dict.csv"), "dict.csv");
    assert_eq!(display_file_name("C:\\uploads\\dict.csv"), "dict.csv");
    assert_eq!(display_file_name("dict.csv"), "dict.csv");
}
