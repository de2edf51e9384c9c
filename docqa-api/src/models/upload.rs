use serde::{Deserialize, Serialize};

/// Upload endpoint response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Human-readable summary from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether processing progress will be pushed over the real-time channel
    #[serde(default)]
    pub supports_progress: bool,
    /// Number of files the server accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_count: Option<u32>,
}

/// Error payload returned with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let resp: UploadResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, UploadResponse::default());
        assert!(!resp.supports_progress);
    }

    #[test]
    fn camel_case_fields() {
        let resp: UploadResponse = serde_json::from_str(
            r#"{"message":"ok","supportsProgress":true,"filesCount":2}"#,
        )
        .unwrap();
        assert_eq!(resp.message.as_deref(), Some("ok"));
        assert!(resp.supports_progress);
        assert_eq!(resp.files_count, Some(2));
    }
}
