//! Wire types for the `generateContent` endpoint
//!
//! Requests carry the rendered prompt as a single user turn and ask the
//! model for JSON matching the flow's response schema. Responses are
//! reduced to the JSON value the model produced.

use bca_application::ports::model_gateway::{GatewayError, GenerationRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_generation(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.output_schema,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Extract the structured output of the first candidate
    pub fn into_output(self) -> Result<Value, GatewayError> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("no candidates returned".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(GatewayError::InvalidResponse(format!(
                "empty candidate (finish reason: {reason})"
            )));
        }

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| GatewayError::InvalidResponse(format!("output is not JSON: {e}")))
    }
}

/// Remove a surrounding ```json fence if the model added one
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Map a non-success HTTP response to a gateway error
///
/// An error without a message is unclassified and fatal, whatever its status.
pub fn classify_error(status: u16, body: &str) -> GatewayError {
    let (message, unavailable_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            Some(envelope.error.message).filter(|m| !m.trim().is_empty()),
            envelope.error.status.as_deref() == Some("UNAVAILABLE"),
        ),
        Err(_) => {
            let raw = body.trim();
            ((!raw.is_empty()).then(|| raw.to_string()), false)
        }
    };

    let Some(message) = message else {
        return GatewayError::Unclassified;
    };

    if status == 503 || unavailable_status {
        return GatewayError::ServiceUnavailable(message);
    }

    match status {
        429 => GatewayError::RateLimited(message),
        401 | 403 => GatewayError::AuthenticationFailed(message),
        _ => GatewayError::RequestFailed { status, message },
    }
}
