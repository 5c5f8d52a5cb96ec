use serde_json::Value as JsonValue;
use std::time::Duration;

/// Failure of a forwarded generation call.
///
/// Keeps the upstream's message for diagnostics and, when the upstream
/// answered with a structured JSON body (provider-side validation), that body
/// as well.
#[derive(Debug)]
pub struct FalError {
    pub status: Option<u16>,
    pub message: String,
    pub body: Option<JsonValue>,
}

impl FalError {
    fn transport(e: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: e.to_string(),
            body: None,
        }
    }
}

impl std::fmt::Display for FalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(s) => write!(f, "fal HTTP {s}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for FalError {}

/// Client for the fal.ai synchronous inference endpoint.
///
/// Each capability is addressed by a model identifier appended to the base
/// URL; the input object is posted as-is and the output object is returned
/// as-is. Pure pass-through: no retry, no polling, no streaming.
#[derive(Debug, Clone)]
pub struct FalClient {
    pub base: String,
    pub key: String,
}

impl FalClient {
    #[must_use]
    pub const fn new(base: String, key: String) -> Self {
        Self { base, key }
    }

    /// # Errors
    ///
    /// Will return err if the request fails, the upstream rejects it, or the
    /// response is not valid JSON.
    pub async fn run(
        &self,
        http: &reqwest::Client,
        model: &str,
        input: &JsonValue,
        timeout: Duration,
    ) -> Result<JsonValue, FalError> {
        let url = format!("{}/{model}", self.base.trim_end_matches('/'));

        let mut req = http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(input);

        if !self.key.trim().is_empty() {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Key {}", self.key));
        }

        let resp = req.send().await.map_err(|e| FalError::transport(&e))?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let body: Option<JsonValue> = serde_json::from_str(&text).ok();
            // Prefer the provider's own detail message when it sent one.
            let message = body
                .as_ref()
                .and_then(extract_detail)
                .unwrap_or_else(|| text.chars().take(500).collect());
            return Err(FalError {
                status: Some(status.as_u16()),
                message,
                body,
            });
        }

        serde_json::from_str(&text).map_err(|e| FalError {
            status: Some(status.as_u16()),
            message: format!("invalid JSON from upstream: {e}"),
            body: None,
        })
    }
}

/// Pull a human-readable message out of a fal error body.
/// Handles both `{"detail": "..."}` and `{"detail": [{"msg": "..."}]}`.
fn extract_detail(body: &JsonValue) -> Option<String> {
    match body.get("detail")? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(JsonValue::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_string() {
        let body = json!({"detail": "quota exceeded"});
        assert_eq!(extract_detail(&body).as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn detail_list_of_validation_errors() {
        let body = json!({"detail": [
            {"loc": ["body", "image_urls"], "msg": "too many items"},
            {"loc": ["body", "prompt"], "msg": "field required"}
        ]});
        assert_eq!(
            extract_detail(&body).as_deref(),
            Some("too many items; field required")
        );
    }

    #[test]
    fn detail_missing() {
        assert_eq!(extract_detail(&json!({"error": "nope"})), None);
        assert_eq!(extract_detail(&json!({"detail": 42})), None);
    }
}
