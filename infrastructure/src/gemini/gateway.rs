//! Gemini model gateway implementation

use super::types::{GenerateContentRequest, GenerateContentResponse, classify_error};
use async_trait::async_trait;
use bca_application::ports::model_gateway::{GatewayError, GenerationRequest, ModelGateway};
use bca_domain::Model;
use serde_json::Value;
use tracing::{debug, info};

/// Gateway to the Gemini `generateContent` REST endpoint
pub struct GeminiGateway {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: Model,
}

impl GeminiGateway {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: Model,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bca-assist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let api_base = api_base.into().trim_end_matches('/').to_string();
        info!("GeminiGateway initialized for {} at {}", model, api_base);

        Ok(Self {
            client,
            api_base,
            api_key: api_key.into(),
            model,
        })
    }

    /// Full URL of the generation endpoint for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base,
            self.model.as_str()
        )
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ConnectionError(error.to_string())
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GatewayError> {
        debug!(flow = %request.flow, model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_generation(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "generateContent returned an error");
            return Err(classify_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(format!("malformed response: {e}")))?;
        parsed.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_model_id() {
        let gateway = GeminiGateway::new(
            "https://generativelanguage.googleapis.com/",
            "key",
            Model::Gemini20Flash,
        )
        .unwrap();

        assert_eq!(
            gateway.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(gateway.model(), &Model::Gemini20Flash);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let gateway = GeminiGateway::new("http://127.0.0.1:1", "key", Model::Gemini20Flash).unwrap();
        let request = GenerationRequest::new(
            bca_domain::FlowName::AnswerQuery,
            "prompt",
            serde_json::json!({}),
        );

        let err = gateway.generate(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(_)));
    }
}
