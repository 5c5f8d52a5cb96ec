use clap::{ArgAction, Parser};
use std::{net::SocketAddr, path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mixlab", version, about = "HTTP API server for Visual Recipe Lab")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
}

/// Mixlab server configuration.
///
/// Loaded once at startup and injected into every handler through the app
/// state; read-only for the lifetime of the process.
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (-q, -qq, -qqq)
    #[arg(short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Address to bind the HTTP server to
    #[arg(long, env = "MIXLAB_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Optional log file path (logs are written to stdout + this file)
    #[arg(long, env = "MIXLAB_LOG_FILE", default_value = "mixlab.logs")]
    pub log_file: PathBuf,

    /// CORS allowed origin (e.g., <https://mixlab.yourdomain.com>)
    /// If not set, allows all origins (⚠️ insecure for production!)
    #[arg(long, env = "MIXLAB_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// fal.ai API key (required for actual generation)
    #[arg(long, env = "FAL_KEY")]
    pub fal_api_key: Option<String>,

    /// fal.ai API base URL
    #[arg(long, env = "MIXLAB_FAL_API_URL", default_value = "https://fal.run")]
    pub fal_api_url: String,

    /// Text-to-image model
    #[arg(
        long,
        env = "MIXLAB_IMAGE_MODEL",
        default_value = "fal-ai/bytedance/seedream/v4/text-to-image"
    )]
    pub image_model: String,

    /// Image(s)-to-video model
    #[arg(
        long,
        env = "MIXLAB_VIDEO_MODEL",
        default_value = "fal-ai/veo3.1/reference-to-video"
    )]
    pub video_model: String,

    /// Video prompt rewriting model
    #[arg(
        long,
        env = "MIXLAB_PROMPT_MODEL",
        default_value = "fal-ai/video-prompt-generator"
    )]
    pub prompt_model: String,
}

impl Config {
    #[must_use]
    pub fn verbosity_delta(&self) -> i16 {
        i16::from(self.verbose) - i16::from(self.quiet)
    }
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_delta() {
            d if d <= -2 => "error",
            -1 => "warn",
            0 => "info,mixlab=info,axum=info,tower_http=info",
            1 => "debug,mixlab=debug,axum=info,tower_http=info,reqwest=warn",
            2 => "trace,mixlab=trace,axum=debug,tower_http=trace,reqwest=info,hyper=info",
            _ => "trace,mixlab=trace,axum=trace,tower_http=trace,reqwest=debug,hyper=debug",
        }
    }
}
