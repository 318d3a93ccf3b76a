//! AI gateway client for transcript generation and summarization.
//!
//! The gateway is an opaque external service with nondeterministic latency;
//! this module provides the provider abstraction plus the HTTP implementation
//! against its JSON API.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use async_trait::async_trait;
use entity::{summaries, transcripts};
use log::*;
use serde::Serialize;
use std::time::Duration;

/// Abstraction over the two operations the pipeline needs from the AI
/// service. Implementations must treat both as fallible and possibly slow;
/// callers never rely on timing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Turn raw transcript text into a speaker-attributed detailed transcript.
    async fn generate_detailed_transcript(
        &self,
        raw_transcript: &str,
    ) -> Result<transcripts::Model, Error>;

    /// Produce a structured summary from approved transcript text.
    async fn summarize(&self, transcript_text: &str) -> Result<summaries::Model, Error>;
}

/// Request to generate a detailed transcript
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTranscriptRequest<'a> {
    raw_transcript: &'a str,
}

/// Request to summarize approved transcript text
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    transcript: &'a str,
}

/// HTTP client for the AI gateway
pub struct HttpAiGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAiGateway {
    /// Create a new gateway client against the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!("Failed to reach AI gateway at {url}: {e:?}");
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| {
                warn!("Failed to parse AI gateway response from {url}: {e:?}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Gateway(
                        "Invalid response from AI gateway".to_string(),
                    )),
                }
            })
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("AI gateway {url} returned {status}: {error_text}");
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Gateway(format!(
                    "{status}: {error_text}"
                ))),
            })
        }
    }
}

#[async_trait]
impl AiGateway for HttpAiGateway {
    async fn generate_detailed_transcript(
        &self,
        raw_transcript: &str,
    ) -> Result<transcripts::Model, Error> {
        debug!(
            "Requesting detailed transcript for {} byte(s) of raw text",
            raw_transcript.len()
        );

        let transcript: transcripts::Model = self
            .post_json(
                "/generate-detailed-transcript",
                &GenerateTranscriptRequest {
                    raw_transcript,
                },
            )
            .await?;

        // An empty or incoherent transcript is a gateway failure, not a
        // reviewable result.
        if transcript.dialogue.is_empty() {
            return Err(Error::gateway("gateway returned an empty transcript"));
        }
        if !transcript.confidence_score.is_finite()
            || !(0.0..=1.0).contains(&transcript.confidence_score)
        {
            return Err(Error::gateway(format!(
                "gateway returned confidence score {} outside [0, 1]",
                transcript.confidence_score
            )));
        }

        Ok(transcript)
    }

    async fn summarize(&self, transcript_text: &str) -> Result<summaries::Model, Error> {
        debug!(
            "Requesting summary for {} byte(s) of transcript text",
            transcript_text.len()
        );

        let summary: summaries::Model = self
            .post_json(
                "/analyze",
                &AnalyzeRequest {
                    transcript: transcript_text,
                },
            )
            .await?;

        if !summary.is_wellformed() {
            return Err(Error::gateway("gateway returned a summary without a problem statement"));
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gateway(base_url: &str) -> HttpAiGateway {
        HttpAiGateway::new(base_url, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn generate_detailed_transcript_parses_success_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate-detailed-transcript")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(
                json!({
                    "confidenceScore": 0.9,
                    "dialogue": [
                        {"speaker": "agent", "timestamp": "00:01", "text": "hi"},
                        {"speaker": "customer", "timestamp": "00:04", "text": "my modem is broken"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let transcript = gateway(&server.url())
            .generate_detailed_transcript("Agent: hi. Customer: my modem is broken.")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(transcript.confidence_score, 0.9);
        assert_eq!(transcript.dialogue.len(), 2);
    }

    #[tokio::test]
    async fn generate_detailed_transcript_rejects_empty_dialogue() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/generate-detailed-transcript")
            .with_status(200)
            .with_body(json!({"confidenceScore": 0.5, "dialogue": []}).to_string())
            .create_async()
            .await;

        let result = gateway(&server.url())
            .generate_detailed_transcript("hello")
            .await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::External(ExternalErrorKind::Gateway(_))
        ));
    }

    #[tokio::test]
    async fn non_2xx_surfaces_as_gateway_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(503)
            .with_body("model unavailable")
            .create_async()
            .await;

        let result = gateway(&server.url()).summarize("Agent: hi").await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::External(ExternalErrorKind::Gateway(_))
        ));
    }

    #[tokio::test]
    async fn summarize_rejects_summary_missing_problem() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body(
                json!({
                    "customerProfile": {"name": "Dana", "accountNumber": "AC-100"},
                    "productInformation": "modem",
                    "problem": "",
                    "solution": "replaced modem",
                    "resolution": "resolved"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = gateway(&server.url()).summarize("Agent: hi").await;
        assert!(result.is_err());
    }
}
