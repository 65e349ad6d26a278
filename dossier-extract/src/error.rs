//! Error taxonomy for the extraction client.
//!
//! The retry engine branches on error class: transient failures (quota,
//! overload) are worth retrying on the same model, everything else advances
//! to the next candidate immediately.

use thiserror::Error;

/// Body signatures the provider uses for quota and overload failures.
const TRANSIENT_SIGNATURES: [&str; 4] = ["RESOURCE_EXHAUSTED", "UNAVAILABLE", "quota", "overloaded"];

/// Longest slice of a provider body kept in an error detail.
const DETAIL_LIMIT: usize = 300;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Missing credential. Fatal, detected before any network attempt.
    #[error("GEMINI_API_KEY chưa được cấu hình; thiết lập biến môi trường rồi chạy lại")]
    MissingApiKey,

    /// Quota exhaustion or server overload; retrying may resolve it.
    #[error("model {model} tạm thời quá tải: {detail}")]
    Transient { model: String, detail: String },

    /// Any other provider-side rejection; the same model will not do better.
    #[error("model {model} từ chối yêu cầu (HTTP {status}): {detail}")]
    Provider {
        model: String,
        status: u16,
        detail: String,
    },

    /// Transport failure before a provider answer arrived.
    #[error("không gọi được dịch vụ AI: {0}")]
    Http(#[from] reqwest::Error),

    /// The model answered with an empty body.
    #[error("model {model} trả về nội dung rỗng")]
    EmptyResponse { model: String },

    /// The response body did not match the requested JSON shape.
    #[error("không đọc được kết quả JSON từ model {model}: {detail}")]
    Parse { model: String, detail: String },

    /// Every model and retry failed without a captured error.
    #[error("tất cả model AI đều quá tải, vui lòng thử lại sau")]
    Exhausted,
}

impl ExtractError {
    /// Whether retrying the same model can help.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractError::Transient { .. })
    }
}

/// Classify a non-success provider response by status code and body
/// signatures.
pub fn classify_provider_error(model: &str, status: u16, body: &str) -> ExtractError {
    let transient_status = status == 429 || status == 503;
    let transient_body = TRANSIENT_SIGNATURES.iter().any(|sig| body.contains(sig));
    let detail = truncate_detail(body);
    if transient_status || transient_body {
        ExtractError::Transient {
            model: model.to_string(),
            detail: format!("HTTP {status}: {detail}"),
        }
    } else {
        ExtractError::Provider {
            model: model.to_string(),
            status,
            detail,
        }
    }
}

fn truncate_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= DETAIL_LIMIT {
        return trimmed.to_string();
    }
    let mut end = DETAIL_LIMIT;
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_status_is_transient() {
        let err = classify_provider_error("gemini-2.0-flash", 429, "{\"error\":{}}");
        assert!(err.is_transient());
    }

    #[test]
    fn test_overload_status_is_transient() {
        let err = classify_provider_error("gemini-2.0-flash", 503, "");
        assert!(err.is_transient());
    }

    #[test]
    fn test_quota_signature_is_transient_despite_status() {
        let body = r#"{"error":{"status":"RESOURCE_EXHAUSTED","message":"quota exceeded"}}"#;
        let err = classify_provider_error("gemini-3-pro-preview", 400, body);
        assert!(err.is_transient());
    }

    #[test]
    fn test_bad_request_is_not_transient() {
        let err = classify_provider_error("gemini-2.0-flash", 400, "invalid argument");
        assert!(!err.is_transient());
        match err {
            ExtractError::Provider { status, .. } => assert_eq!(status, 400),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_auth_failure_is_not_transient() {
        let err = classify_provider_error("gemini-2.0-flash", 403, "API key not valid");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_detail_is_truncated_on_char_boundary() {
        let body = "lỗi ".repeat(200);
        let err = classify_provider_error("m", 400, &body);
        let text = err.to_string();
        assert!(text.len() < body.len());
        assert!(text.contains('…'));
    }
}
