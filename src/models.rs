use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::fal::FalClient;

/* ---------- App state ---------- */
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub fal: FalClient,
    pub config: Config,
}

/* ---------- API models ---------- */

/// Fields are optional so missing input is reported as a 400 with a short
/// message rather than a deserialization rejection.
#[derive(Deserialize, Debug)]
pub struct GenerateImageRequest {
    pub prompt: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct GenerateImageResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub success: bool,
}

#[derive(Deserialize, Debug)]
pub struct GenerateVideoRequest {
    #[serde(rename = "imageUrls")]
    pub image_urls: Option<Vec<String>>,
    pub prompt: Option<String>,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(rename = "generateAudio", default = "default_generate_audio")]
    pub generate_audio: bool,
}

fn default_resolution() -> String {
    "720p".to_string()
}

const fn default_generate_audio() -> bool {
    true
}

#[derive(Serialize, Debug)]
pub struct GenerateVideoResponse {
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    pub success: bool,
}

#[derive(Deserialize, Debug)]
pub struct EnhancePromptRequest {
    pub prompt: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct EnhancePromptResponse {
    #[serde(rename = "enhancedPrompt")]
    pub enhanced_prompt: String,
    pub success: bool,
}
