//! Machine-readable result record: explicit schema version constant,
//! status-first field ordering, `skip_serializing_if` on every optional
//! field.

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    pub schema_version: String,
    pub timestamp: String,
    pub success: bool,
    pub total_conflicts: u32,
    pub resolved_count: u32,
    pub files: Vec<FileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub file: String,
    pub conflict_count: u32,
    pub resolved_count: u32,
    pub all_auto_merged: bool,
    pub has_markers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl MergeResult {
    pub fn new(files: Vec<FileResult>) -> Self {
        let total_conflicts = files.iter().map(|f| f.conflict_count).sum();
        let resolved_count = files.iter().map(|f| f.resolved_count).sum();
        let success = files.iter().all(|f| f.all_auto_merged && f.error.is_none());
        MergeResult {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            success,
            total_conflicts,
            resolved_count,
            files,
            error: None,
        }
    }

    pub fn fatal(error: ErrorPayload) -> Self {
        MergeResult {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            success: false,
            total_conflicts: 0,
            resolved_count: 0,
            files: Vec::new(),
            error: Some(error),
        }
    }

    /// Exit-code contract (§6): `0` all resolved, `1` conflicts remain.
    /// Fatal (invocation-level) errors carry their own code via `error`.
    pub fn exit_code(&self) -> i32 {
        if let Some(err) = &self.error {
            return err.code;
        }
        if self.files.iter().any(|f| f.has_markers) {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_every_file_auto_merged() {
        let files = vec![
            FileResult { file: "a.py".into(), conflict_count: 1, resolved_count: 1, all_auto_merged: true, has_markers: false, error: None },
            FileResult { file: "b.py".into(), conflict_count: 1, resolved_count: 0, all_auto_merged: false, has_markers: true, error: None },
        ];
        let result = MergeResult::new(files);
        assert!(!result.success);
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.total_conflicts, 2);
    }

    #[test]
    fn fatal_error_reports_its_own_code() {
        let result = MergeResult::fatal(ErrorPayload { code: 128, message: "not a repository".into(), details: None });
        assert_eq!(result.exit_code(), 128);
    }
}
