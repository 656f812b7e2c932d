use super::traits::MessagingTransport;
use crate::error::TransmissionError;
use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    parts: &'a [String],
}

/// SMS delivery through an HTTP gateway.
///
/// Each message is one `POST {endpoint}` carrying `{"to", "parts"}`. A 4xx
/// answer is a carrier or gateway rejection; anything else non-2xx is a
/// transport failure.
pub struct HttpSmsGateway {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpSmsGateway {
    pub fn new(endpoint: &str, api_key: Option<&str>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.map(ToString::to_string),
            client: Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn rejected(&self, message: String) -> TransmissionError {
        TransmissionError::Rejected {
            transport: self.name().to_string(),
            message,
        }
    }

    fn failed(&self, cause: anyhow::Error) -> TransmissionError {
        TransmissionError::Failed {
            transport: self.name().to_string(),
            cause,
        }
    }

    async fn deliver(&self, to: &str, parts: &[String]) -> Result<(), TransmissionError> {
        let mut request = self.client.post(&self.endpoint).json(&SendRequest { to, parts });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| self.failed(anyhow::Error::new(e).context("gateway request failed")))?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(%status, parts = parts.len(), "Gateway accepted message");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let detail = error_detail(&body).unwrap_or_else(|| status.to_string());
        tracing::warn!(%status, detail = %detail, "Gateway refused message");
        if status.is_client_error() {
            Err(self.rejected(detail))
        } else {
            Err(self.failed(anyhow::anyhow!("gateway returned {status}: {detail}")))
        }
    }
}

/// Pull a human-readable reason out of a gateway error body.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["error", "message", "detail"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return Some(text.to_string());
            }
        }
    }
    Some(trimmed.to_string())
}

impl MessagingTransport for HttpSmsGateway {
    fn name(&self) -> &str {
        "http"
    }

    fn send<'a>(
        &'a self,
        destination: &'a str,
        segments: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { Ok(self.deliver(destination, segments).await?) })
    }
}
