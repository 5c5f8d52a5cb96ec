use serde_json::{Value as JsonValue, json};

/// Options forwarded with a mix request. Defaults mirror the server's own
/// defaults (720p, audio on).
#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub resolution: String,
    pub generate_audio: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            resolution: "720p".to_string(),
            generate_audio: true,
        }
    }
}

/// Typed client over the three mixlab endpoints, used by the wizard.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(base: String) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &JsonValue) -> anyhow::Result<JsonValue> {
        let url = format!("{}{path}", self.base.trim_end_matches('/'));
        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        let body: JsonValue = resp.json().await?;

        if !status.is_success() {
            let msg = body
                .get("error")
                .and_then(JsonValue::as_str)
                .unwrap_or("request failed");
            anyhow::bail!("{msg}");
        }
        Ok(body)
    }

    fn field(body: &JsonValue, name: &str) -> anyhow::Result<String> {
        body.get(name)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("response missing {name}"))
    }

    /// # Errors
    ///
    /// Err if the request fails or the endpoint reports an error.
    pub async fn generate_image(&self, prompt: &str) -> anyhow::Result<String> {
        let body = self
            .post("/api/generate-image", &json!({ "prompt": prompt }))
            .await?;
        Self::field(&body, "imageUrl")
    }

    /// # Errors
    ///
    /// Err if the request fails or the endpoint reports an error.
    pub async fn generate_video(
        &self,
        image_urls: &[String],
        prompt: &str,
        options: &VideoOptions,
    ) -> anyhow::Result<String> {
        let body = self
            .post(
                "/api/generate-video",
                &json!({
                    "imageUrls": image_urls,
                    "prompt": prompt,
                    "resolution": options.resolution,
                    "generateAudio": options.generate_audio,
                }),
            )
            .await?;
        Self::field(&body, "videoUrl")
    }

    /// # Errors
    ///
    /// Err if the request fails or the endpoint reports an error.
    pub async fn enhance_prompt(&self, prompt: &str) -> anyhow::Result<String> {
        let body = self
            .post("/api/enhance-video-prompt", &json!({ "prompt": prompt }))
            .await?;
        Self::field(&body, "enhancedPrompt")
    }
}
