//! Blocking fal.ai client: one POST per invocation, no retries.

use std::env;
use std::path::Path;
use std::time::Duration;

use gen_contracts::request::{GenerationRequest, GenerationResult};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::error::{GenError, Result};
use crate::output::download_image;

pub const DEFAULT_API_BASE: &str = "https://fal.run";
pub const API_BASE_VAR: &str = "FAL_API_BASE";

/// Image synthesis is slow; this bounds the whole call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub struct FalClient {
    api_base: String,
    api_key: String,
    http: HttpClient,
}

impl FalClient {
    /// Uses `FAL_API_BASE` when set, otherwise `https://fal.run`.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_base = env::var(API_BASE_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::with_api_base(api_key, api_base)
    }

    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn endpoint_url(&self, model_path: &str) -> String {
        format!("{}/{}", self.api_base, model_path.trim_start_matches('/'))
    }

    pub fn submit(&self, model_path: &str, request: &GenerationRequest) -> Result<GenerationResult> {
        let url = self.endpoint_url(model_path);
        tracing::debug!(url = %url, "submitting generation request");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Key {}", self.api_key))
            .json(request)
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        tracing::debug!(status, bytes = body.len(), "received response");

        parse_response(status, &body)
    }

    /// Fetches a result image into `path` with the same timeout-bound client.
    pub fn download(&self, url: &str, path: &Path) -> Result<()> {
        download_image(&self.http, url, path)
    }
}

#[derive(Debug, Deserialize)]
struct ValidationErrorBody {
    detail: Vec<ValidationErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ValidationErrorItem {
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
struct DetailErrorBody {
    detail: String,
}

/// Maps a raw response onto a result, or onto `Api`/`EmptyResult`/`Decode`.
pub fn parse_response(status: u16, body: &str) -> Result<GenerationResult> {
    if !(200..300).contains(&status) {
        return Err(GenError::Api {
            status,
            message: parse_error_message(body),
        });
    }
    let result: GenerationResult = serde_json::from_str(body)?;
    if result.images.is_empty() {
        return Err(GenError::EmptyResult);
    }
    Ok(result)
}

/// Tries a validation-error list, then a flat `detail` string, then the raw body.
pub fn parse_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ValidationErrorBody>(body) {
        if let Some(first) = parsed.detail.into_iter().next() {
            return first.msg;
        }
    }
    if let Ok(parsed) = serde_json::from_str::<DetailErrorBody>(body) {
        if !parsed.detail.is_empty() {
            return parsed.detail;
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use gen_contracts::request::{GenerationRequest, OutputFormat};

    use super::{parse_error_message, parse_response, FalClient};
    use crate::error::GenError;
    use crate::test_support::serve_once;

    #[test]
    fn validation_error_list_uses_first_message() {
        let body = r#"{"detail":[{"loc":["body","prompt"],"msg":"bad prompt","type":"value_error"},{"msg":"second"}]}"#;
        assert_eq!(parse_error_message(body), "bad prompt");
    }

    #[test]
    fn validation_entry_without_msg_yields_empty_message() {
        let body = r#"{"detail":[{"loc":["body"],"type":"missing"}]}"#;
        assert_eq!(parse_error_message(body), "");
    }

    #[test]
    fn flat_detail_string_is_used_when_not_a_list() {
        assert_eq!(parse_error_message(r#"{"detail":"bad prompt"}"#), "bad prompt");
    }

    #[test]
    fn unrecognized_bodies_fall_back_to_raw_text() {
        assert_eq!(parse_error_message("upstream timeout"), "upstream timeout");
        assert_eq!(parse_error_message(r#"{"detail":[]}"#), r#"{"detail":[]}"#);
        assert_eq!(parse_error_message(r#"{"detail":""}"#), r#"{"detail":""}"#);
        assert_eq!(parse_error_message(r#"{"error":"nope"}"#), r#"{"error":"nope"}"#);
    }

    #[test]
    fn non_success_status_becomes_api_error() {
        let err = parse_response(422, r#"{"detail":[{"msg":"bad prompt"}]}"#).unwrap_err();
        match err {
            GenError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "bad prompt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_image_list_is_a_failure() {
        let err = parse_response(200, r#"{"images":[],"seed":7}"#).unwrap_err();
        assert!(matches!(err, GenError::EmptyResult));
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let err = parse_response(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, GenError::Decode(_)));
    }

    #[test]
    fn success_body_yields_images_and_seed() -> anyhow::Result<()> {
        let result = parse_response(
            200,
            r#"{"images":[{"url":"https://cdn.example/a.png","width":1024,"height":768,"content_type":"image/png"}],"seed":1234}"#,
        )?;
        assert_eq!(result.seed, 1234);
        assert_eq!(result.images[0].width, 1024);
        assert_eq!(result.images[0].content_type, "image/png");
        Ok(())
    }

    #[test]
    fn endpoint_url_joins_base_and_model_path() -> anyhow::Result<()> {
        let client = FalClient::with_api_base("key", "https://fal.run/")?;
        assert_eq!(
            client.endpoint_url("fal-ai/flux-2-pro/edit"),
            "https://fal.run/fal-ai/flux-2-pro/edit"
        );
        Ok(())
    }

    #[test]
    fn submit_posts_json_with_key_authorization() -> anyhow::Result<()> {
        let body = br#"{"images":[{"url":"https://cdn.example/a.png","width":8,"height":6}],"seed":99}"#;
        let (base, server) = serve_once("200 OK", "application/json", body)?;
        let client = FalClient::with_api_base("secret-key", base)?;

        let mut request = GenerationRequest::new("a cat in space", OutputFormat::Png);
        request.image_size = Some("landscape_4_3".to_string());
        let result = client.submit("fal-ai/z-image/turbo", &request)?;
        assert_eq!(result.seed, 99);
        assert_eq!(result.images.len(), 1);

        let raw = server.join().unwrap_or_default();
        assert!(raw.starts_with("POST /fal-ai/z-image/turbo HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("authorization: key secret-key"));
        assert!(raw.contains(r#""image_size":"landscape_4_3""#));
        assert!(!raw.contains(r#""seed""#));
        Ok(())
    }

    #[test]
    fn submit_surfaces_api_errors() -> anyhow::Result<()> {
        let (base, server) = serve_once(
            "422 Unprocessable Entity",
            "application/json",
            br#"{"detail":"bad prompt"}"#,
        )?;
        let client = FalClient::with_api_base("secret-key", base)?;
        let request = GenerationRequest::new("", OutputFormat::Png);

        let err = client.submit("fal-ai/qwen-image", &request).unwrap_err();
        let _ = server.join();
        assert_eq!(err.to_string(), "API error (422): bad prompt");
        Ok(())
    }
}
