//! Gemini `generateContent` backend.
//!
//! One blocking HTTPS request per image: the image travels inline as base64
//! next to a fixed instruction, and the response is constrained to the
//! `ClassificationResult` shape via `responseSchema`. The schema is a request
//! to the upstream service, not a guarantee, so the returned text is parsed
//! and validated like any untrusted input.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::classify::backend::ClassifierBackend;
use crate::classify::error::ClassificationFailed;
use crate::classify::result::ClassificationResult;
use crate::config::{ApiKey, ClassifierConfig};
use crate::payload::ImagePayload;

pub const CLASSIFY_INSTRUCTION: &str = "Analyze this food image for a food sharing app. \
Identify the food, suggest a title, short description, category (e.g., Rice, Pasta, Bakery, Fruit, Veg, Meat), \
determine if it looks vegetarian/halal based on visual ingredients, \
estimate a freshness score (1-10), check if it looks safe to eat (no mold/rot), \
and provide 3 tags.";

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Response shape constraint sent with every request.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "category": { "type": "STRING" },
            "isHalal": { "type": "BOOLEAN" },
            "isVeg": { "type": "BOOLEAN" },
            "freshnessScore": { "type": "NUMBER" },
            "safetyCheck": { "type": "BOOLEAN" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "title", "description", "category", "isHalal",
            "isVeg", "freshnessScore", "safetyCheck", "tags"
        ]
    })
}

pub struct GeminiBackend {
    agent: ureq::Agent,
    url: Url,
    api_key: ApiKey,
}

impl GeminiBackend {
    pub fn new(config: &ClassifierConfig, api_key: ApiKey) -> anyhow::Result<Self> {
        let url = generate_content_url(&config.endpoint, &config.model)?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self {
            agent,
            url,
            api_key,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn request_body(image: &ImagePayload) -> Result<String, ClassificationFailed> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Inline {
                        inline_data: InlineData {
                            mime_type: image.mime_type(),
                            data: image.to_base64(),
                        },
                    },
                    RequestPart::Text {
                        text: CLASSIFY_INSTRUCTION,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };
        serde_json::to_string(&request).map_err(request_encoding_failed)
    }
}

impl ClassifierBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn classify(&self, image: &ImagePayload) -> Result<ClassificationResult, ClassificationFailed> {
        let body = Self::request_body(image)?;
        log::debug!(
            "gemini classify: {} bytes ({}), sha256={}",
            image.len(),
            image.mime_type(),
            image.digest_hex()
        );

        let response = self
            .agent
            .post(self.url.as_str())
            .set(API_KEY_HEADER, self.api_key.expose())
            .set("Content-Type", "application/json")
            .send_string(&body);

        let raw = match response {
            Ok(response) => response
                .into_string()
                .map_err(|e| ClassificationFailed::Transport(format!("read body: {}", e)))?,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(ClassificationFailed::Status {
                    code,
                    body: truncate(&body, MAX_ERROR_BODY_CHARS),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ClassificationFailed::Transport(transport.to_string()));
            }
        };

        parse_generate_content(&raw)
    }
}

/// Build `{endpoint}/models/{model}:generateContent`.
pub fn generate_content_url(endpoint: &str, model: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| anyhow::anyhow!("invalid classifier endpoint '{}': {}", endpoint, e))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("classifier endpoint '{}' cannot be a base", endpoint))?
        .pop_if_empty()
        .push("models")
        .push(&format!("{}:generateContent", model));
    Ok(url)
}

/// Extract the candidate text from a `generateContent` body and parse it.
pub fn parse_generate_content(raw: &str) -> Result<ClassificationResult, ClassificationFailed> {
    if raw.trim().is_empty() {
        return Err(ClassificationFailed::EmptyResponse);
    }
    let envelope: GenerateContentResponse = serde_json::from_str(raw)
        .map_err(|e| ClassificationFailed::MalformedResponse(e.to_string()))?;

    let text: String = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    ClassificationResult::from_model_json(&text)
}

/// Serialization failed before anything was sent.
fn request_encoding_failed(err: serde_json::Error) -> ClassificationFailed {
    ClassificationFailed::Transport(format!("encode request: {}", err))
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_generate_content_url() {
        let url = generate_content_url("https://example.com/v1beta", "gemini-2.5-flash").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let url = generate_content_url("http://127.0.0.1:8080/", "m").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/models/m:generateContent");
    }

    #[test]
    fn request_body_carries_image_prompt_and_schema() {
        let image = ImagePayload::from_bytes(b"hello".to_vec());
        let body = GeminiBackend::request_body(&image).unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();

        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "aGVsbG8=");
        assert_eq!(parts[1]["text"], CLASSIFY_INSTRUCTION);

        let config = &value["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert_eq!(
            config["responseSchema"]["properties"]["tags"]["items"]["type"],
            "STRING"
        );
        assert_eq!(
            config["responseSchema"]["required"].as_array().unwrap().len(),
            8
        );
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"parts":[
            {"text":"{\"title\":\"Rice\",\"description\":\"\",\"category\":\"Rice\","},
            {"text":"\"isHalal\":true,\"isVeg\":true,\"freshnessScore\":6,\"safetyCheck\":true,\"tags\":[]}"}
        ]}}]}"#;
        let result = parse_generate_content(raw).expect("parse");
        assert_eq!(result.title, "Rice");
        assert_eq!(result.freshness_score, 6.0);
    }

    #[test]
    fn no_candidates_is_empty_response() {
        let err = parse_generate_content(r#"{"candidates":[]}"#).unwrap_err();
        assert_eq!(err, ClassificationFailed::EmptyResponse);

        let err = parse_generate_content(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .unwrap_err();
        assert_eq!(err, ClassificationFailed::EmptyResponse);
    }

    #[test]
    fn request_encoding_failure_is_not_blamed_on_upstream() {
        let err = serde_json::from_str::<Value>("{").unwrap_err();
        let failure = request_encoding_failed(err);
        assert!(matches!(failure, ClassificationFailed::Transport(_)));
        assert!(failure.to_string().contains("encode request"));
    }

    #[test]
    fn non_json_envelope_is_malformed() {
        let err = parse_generate_content("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ClassificationFailed::MalformedResponse(_)));
    }
}
