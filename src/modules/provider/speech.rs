/// Speech synthesis collaborator.
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` to an audio file and return its path.
    async fn synthesize(&self, text: &str) -> AppResult<PathBuf>;
}

/// HTTP text-to-speech client writing mp3 files under the system temp dir.
pub struct HttpTtsClient {
    client: Client,
    base_url: String,
}

impl HttpTtsClient {
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: env::var("TTS_BASE_URL").unwrap_or_else(|_| DEFAULT_TTS_URL.into()),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpTtsClient {
    async fn synthesize(&self, text: &str) -> AppResult<PathBuf> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", "en"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Speech synthesis failed with HTTP {}",
                status
            )));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(AppError::ExternalServiceError(
                "Speech synthesis returned no audio".to_string(),
            ));
        }

        let path = std::env::temp_dir().join(format!("narration-{}.mp3", Uuid::new_v4()));
        tokio::fs::write(&path, &audio).await?;

        Ok(path)
    }
}
