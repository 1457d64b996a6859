use crate::config::Settings;
use crate::domain::contract::{MAX_BATCH, MIN_BATCH};
use crate::domain::product::Product;
use crate::llm::error::{DiagnosticStage, LlmDiagnosticsError};
use crate::llm::json;
use crate::llm::{RecommendationClient, RecommendationRequest};
use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> anyhow::Result<(serde_json::Value, GenerateContentResponse)> {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(&self.api_key)?);

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(req)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Gemini response body")?;
        self.decode_response(status, text)
    }

    fn diagnostics(
        &self,
        stage: DiagnosticStage,
        detail: String,
        raw_output: Option<String>,
        raw_response_json: Option<serde_json::Value>,
    ) -> LlmDiagnosticsError {
        LlmDiagnosticsError {
            model: self.model.clone(),
            stage,
            detail,
            raw_output,
            raw_response_json,
        }
    }

    fn decode_response(
        &self,
        status: StatusCode,
        text: String,
    ) -> anyhow::Result<(serde_json::Value, GenerateContentResponse)> {
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(self
                .diagnostics(
                    DiagnosticStage::Http,
                    format!("status={status}"),
                    Some(text),
                    raw_response_json,
                )
                .into());
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("failed to parse Gemini response JSON: {text}"))?;
        let parsed = serde_json::from_value::<GenerateContentResponse>(raw_json.clone())
            .context("failed to decode Gemini response into GenerateContentResponse")?;
        Ok((raw_json, parsed))
    }

    fn prompt(request: &RecommendationRequest) -> String {
        format!(
            "Generate a list of {MIN_BATCH}-{MAX_BATCH} distinct product recommendations based on this user request: \"{}\".\n\
Focus on variety and relevance. Provide estimated prices in {}. Return valid JSON.",
            request.query, request.currency
        )
    }

    fn response_schema(currency: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "name": {"type": "STRING", "description": "Name of the product"},
                    "description": {"type": "STRING", "description": "Short description of the product features"},
                    "estimatedPrice": {"type": "NUMBER", "description": format!("Estimated price in {currency}")},
                    "category": {"type": "STRING", "description": "Product category"},
                    "reason": {"type": "STRING", "description": "Why this product fits the user's request"}
                },
                "required": ["name", "description", "estimatedPrice", "category", "reason"]
            }
        })
    }

    fn build_request(request: &RecommendationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: Self::prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Self::response_schema(&request.currency),
            },
        }
    }

    fn response_text(res: &GenerateContentResponse) -> String {
        let Some(content) = res.candidates.first().and_then(|c| c.content.as_ref()) else {
            return String::new();
        };

        let mut out = String::new();
        for part in &content.parts {
            if part.thought {
                continue;
            }
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        out
    }

    fn finish_reason(res: &GenerateContentResponse) -> Option<&str> {
        res.candidates.first()?.finish_reason.as_deref()
    }

    /// Turns a decoded reply into products, tagging failures with the stage
    /// they happened at.
    fn products_from_response(
        &self,
        raw_json: serde_json::Value,
        res: &GenerateContentResponse,
        request: &RecommendationRequest,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Product>> {
        let text = Self::response_text(res);
        if text.trim().is_empty() {
            let detail = format!(
                "no text in response (finish_reason={})",
                Self::finish_reason(res).unwrap_or("unknown")
            );
            return Err(self
                .diagnostics(DiagnosticStage::EmptyResponse, detail, None, Some(raw_json))
                .into());
        }

        match json::parse_products(&text, &request.currency, issued_at) {
            Ok(products) => Ok(products),
            Err(err) => Err(self
                .diagnostics(
                    DiagnosticStage::Parse,
                    format!("{err:#}"),
                    Some(text),
                    Some(raw_json),
                )
                .into()),
        }
    }
}

#[async_trait::async_trait]
impl RecommendationClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_recommendations(
        &self,
        request: RecommendationRequest,
    ) -> anyhow::Result<Vec<Product>> {
        let started = Instant::now();
        let (raw_json, res) = self.generate_content(&Self::build_request(&request)).await?;
        let products = self.products_from_response(raw_json, &res, &request, Utc::now())?;

        tracing::info!(
            model = %self.model,
            currency = %request.currency,
            count = products.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Gemini recommendations received"
        );
        Ok(products)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> RecommendationRequest {
        RecommendationRequest::try_new("gaming laptop under 1000 USD", "USD").unwrap()
    }

    #[test]
    fn request_body_embeds_query_currency_and_schema() {
        let body = serde_json::to_value(GeminiClient::build_request(&request())).unwrap();

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"gaming laptop under 1000 USD\""));
        assert!(prompt.contains("Provide estimated prices in USD."));
        assert!(prompt.contains("6-8 distinct product recommendations"));

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "ARRAY");
        assert_eq!(
            config["responseSchema"]["items"]["required"],
            json!(["name", "description", "estimatedPrice", "category", "reason"])
        );
        assert_eq!(
            config["responseSchema"]["items"]["properties"]["estimatedPrice"]["type"],
            "NUMBER"
        );
    }

    #[test]
    fn response_text_joins_parts_and_skips_thoughts() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "[{\"name\":"},
                        {"text": "\"x\"}]"}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(GeminiClient::response_text(&res), "[{\"name\":\"x\"}]");
        assert_eq!(GeminiClient::finish_reason(&res), Some("STOP"));
    }

    #[test]
    fn response_text_is_empty_without_candidates() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert!(GeminiClient::response_text(&res).is_empty());
        assert_eq!(GeminiClient::finish_reason(&res), None);
    }

    fn client() -> GeminiClient {
        GeminiClient {
            http: reqwest::Client::new(),
            api_key: "k".to_string(),
            base_url: "https://example.test/".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }

    fn decoded(body: serde_json::Value) -> (serde_json::Value, GenerateContentResponse) {
        client()
            .decode_response(StatusCode::OK, body.to_string())
            .unwrap()
    }

    fn stage_of(err: &anyhow::Error) -> DiagnosticStage {
        err.downcast_ref::<LlmDiagnosticsError>().unwrap().stage
    }

    #[test]
    fn url_targets_generate_content() {
        let client = client();
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn non_success_status_is_http_failure_with_body() {
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;
        let err = client()
            .decode_response(StatusCode::TOO_MANY_REQUESTS, body.to_string())
            .unwrap_err();

        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.stage, DiagnosticStage::Http);
        assert_eq!(diag.model, "gemini-2.5-flash");
        assert!(diag.detail.contains("429"));
        assert_eq!(diag.raw_output.as_deref(), Some(body));
        assert_eq!(
            diag.raw_response_json.as_ref().unwrap()["error"]["status"],
            "RESOURCE_EXHAUSTED"
        );
    }

    #[test]
    fn non_json_success_body_is_a_plain_error() {
        let err = client()
            .decode_response(StatusCode::OK, "<html>".to_string())
            .unwrap_err();
        assert!(err.downcast_ref::<LlmDiagnosticsError>().is_none());
    }

    #[test]
    fn no_candidates_is_empty_response() {
        let (raw, res) = decoded(json!({"candidates": []}));
        let err = client()
            .products_from_response(raw, &res, &request(), Utc::now())
            .unwrap_err();

        assert_eq!(stage_of(&err), DiagnosticStage::EmptyResponse);
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert!(diag.detail.contains("finish_reason=unknown"));
        assert!(diag.raw_output.is_none());
        assert_eq!(diag.raw_response_json, Some(json!({"candidates": []})));
    }

    #[test]
    fn thought_only_reply_is_empty_response() {
        let (raw, res) = decoded(json!({
            "candidates": [{
                "content": {"parts": [{"text": "let me think", "thought": true}]},
                "finishReason": "MAX_TOKENS"
            }]
        }));
        let err = client()
            .products_from_response(raw, &res, &request(), Utc::now())
            .unwrap_err();

        assert_eq!(stage_of(&err), DiagnosticStage::EmptyResponse);
        assert!(err.to_string().contains("finish_reason=MAX_TOKENS"));
    }

    #[test]
    fn unparseable_text_is_parse_failure_with_raw_output() {
        let (raw, res) = decoded(json!({
            "candidates": [{"content": {"parts": [{"text": "not json"}]}}]
        }));
        let err = client()
            .products_from_response(raw, &res, &request(), Utc::now())
            .unwrap_err();

        assert_eq!(stage_of(&err), DiagnosticStage::Parse);
        let diag = err.downcast_ref::<LlmDiagnosticsError>().unwrap();
        assert_eq!(diag.raw_output.as_deref(), Some("not json"));
        assert!(diag.raw_response_json.is_some());
    }

    #[test]
    fn valid_reply_yields_products_in_request_currency() {
        let items = json!([
            {
                "name": "Keyboard",
                "description": "Mechanical, hot-swap",
                "estimatedPrice": 89.0,
                "category": "Electronics",
                "reason": "Fits the budget"
            },
            {
                "name": "Mouse",
                "description": "Wireless",
                "estimatedPrice": 39.5,
                "category": "Electronics",
                "reason": "Pairs with the keyboard"
            }
        ]);
        let (raw, res) = decoded(json!({
            "candidates": [{"content": {"parts": [{"text": items.to_string()}]}}]
        }));
        let request = RecommendationRequest::try_new("desk setup", "eur").unwrap();

        let products = client()
            .products_from_response(raw, &res, &request, Utc::now())
            .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Keyboard");
        assert!(products.iter().all(|p| p.currency == "EUR"));
    }
}
