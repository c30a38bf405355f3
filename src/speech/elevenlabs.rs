//! ElevenLabs text-to-speech client.

use super::SpeechSynthesizer;
use crate::error::{QuizcastError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Sentence spoken by [`ElevenLabsClient::connection_test`].
pub const CONNECTION_TEST_TEXT: &str = "This is a test of the ElevenLabs API connection.";

/// A voice available to the account.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<Voice>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs API client bound to one voice and model.
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsClient {
    /// Create a client with a custom base URL and timeout.
    pub fn with_config(
        api_key: &str,
        voice_id: &str,
        model_id: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            voice_id: voice_id.to_string(),
            model_id: model_id.to_string(),
        })
    }

    /// List the voices available to the account.
    #[instrument(skip(self))]
    pub async fn list_voices(&self) -> Result<Vec<Voice>> {
        let response = self
            .http
            .get(format!("{}/v1/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuizcastError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: VoicesResponse = response.json().await?;
        debug!("Account has {} voices", parsed.voices.len());
        Ok(parsed.voices)
    }

    /// Synthesize a short test sentence with the configured voice and write it
    /// to `path`. Returns the number of bytes written.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn connection_test(&self, path: &Path) -> Result<usize> {
        let audio = self.synthesize(CONNECTION_TEST_TEXT).await?;
        tokio::fs::write(path, &audio).await?;
        info!("Wrote {} bytes of test audio", audio.len());
        Ok(audio.len())
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    #[instrument(skip(self, text), fields(voice = %self.voice_id, chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id))
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QuizcastError::Synthesis(format!(
                "API returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(QuizcastError::Synthesis("Empty audio response".to_string()));
        }

        debug!("Received {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> ElevenLabsClient {
        ElevenLabsClient::with_config(
            "xi-test",
            "voice-1",
            "eleven_monolingual_v1",
            url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/text-to-speech/voice-1")
            .match_header("xi-api-key", "xi-test")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "text": "Hello there",
                "model_id": "eleven_monolingual_v1"
            })))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(b"ID3fake-mp3")
            .create_async()
            .await;

        let audio = client(&server.url()).synthesize("Hello there").await.unwrap();
        assert_eq!(audio, b"ID3fake-mp3");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_synthesize_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/text-to-speech/voice-1")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let err = client(&server.url()).synthesize("Hi").await.unwrap_err();
        assert!(matches!(err, QuizcastError::Synthesis(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_connection_test_writes_audio_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/text-to-speech/voice-1")
            .match_header("xi-api-key", "xi-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "text": CONNECTION_TEST_TEXT
            })))
            .with_status(200)
            .with_body(b"ID3test")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audio.mp3");

        let written = client(&server.url()).connection_test(&path).await.unwrap();
        assert_eq!(written, 7);
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3test");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_test_failure_writes_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/text-to-speech/voice-1")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audio.mp3");

        assert!(client(&server.url()).connection_test(&path).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_list_voices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/voices")
            .match_header("xi-api-key", "xi-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"voices":[{"voice_id":"abc","name":"Rachel","category":"premade"}]}"#)
            .create_async()
            .await;

        let voices = client(&server.url()).list_voices().await.unwrap();
        assert_eq!(
            voices,
            vec![Voice {
                voice_id: "abc".into(),
                name: "Rachel".into()
            }]
        );
    }
}
