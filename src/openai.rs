//! OpenAI calls for the two-stage pipeline: chat completion to rewrite
//! the prompt, then image generation to render it.

use crate::prompts::{fallback_prompt, OPTIMIZER_SYSTEM_PROMPT};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const IMAGE_GENERATIONS_URL: &str = "https://api.openai.com/v1/images/generations";

const OPTIMIZER_MODEL: &str = "gpt-4";
const OPTIMIZER_MAX_TOKENS: u32 = 200;
const OPTIMIZER_TEMPERATURE: f64 = 0.7;

const IMAGE_MODEL: &str = "dall-e-3";
/// 16:9 landscape output
const IMAGE_SIZE: &str = "1792x1024";
const IMAGE_QUALITY: &str = "hd";
const IMAGE_STYLE: &str = "vivid";

/// Errors from the image-generation stage. Unlike optimization failures
/// these propagate to the caller and end up in the conversation view.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Non-success response carrying a structured error body
    #[error("HTTP error {status}: {message}")]
    Api { status: u16, message: String },
    /// Non-success response without a parsable error message
    #[error("HTTP error {0}")]
    Status(u16),
    /// The request could not be sent or the response could not be read
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Success response that contained no image URL
    #[error("no image was returned")]
    MissingImage,
}

impl GenerateError {
    /// True when the failure happened before any HTTP status arrived
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Network(e) if !e.is_decode())
    }

    /// Maps a non-success response to an error, keeping the HTTP status
    /// even when the body is not the expected error shape.
    fn from_error_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(v) => match v["error"]["message"].as_str() {
                Some(message) if !message.is_empty() => Self::Api {
                    status,
                    message: message.to_string(),
                },
                _ => Self::Status(status),
            },
            Err(_) => Self::Status(status),
        }
    }
}

/// User-facing error line for a failed generation
pub fn user_error_message(err: &GenerateError) -> String {
    if err.is_connectivity() {
        "Error: the request could not be sent. Check your internet connection and try again."
            .to_string()
    } else if matches!(err, GenerateError::MissingImage) {
        "No image was returned.".to_string()
    } else {
        format!("Error: {}", err)
    }
}

/// Stage one: rewrite the raw prompt with the completion model.
///
/// This call cannot fail outward. Any non-success response or network
/// failure falls back to a deterministic local enhancement, so stage two
/// always receives a usable prompt.
pub async fn optimize_prompt(raw_prompt: &str, api_key: &str) -> String {
    match request_optimized_prompt(raw_prompt, api_key).await {
        Ok(optimized) => {
            info!("[optimize] original: {}", raw_prompt);
            info!("[optimize] optimized: {}", optimized);
            optimized
        }
        Err(e) => {
            warn!("[optimize] falling back to local enhancement: {}", e);
            fallback_prompt(raw_prompt)
        }
    }
}

async fn request_optimized_prompt(raw_prompt: &str, api_key: &str) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(CHAT_COMPLETIONS_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&json!({
            "model": OPTIMIZER_MODEL,
            "messages": [
                { "role": "system", "content": OPTIMIZER_SYSTEM_PROMPT },
                { "role": "user", "content": raw_prompt }
            ],
            "max_tokens": OPTIMIZER_MAX_TOKENS,
            "temperature": OPTIMIZER_TEMPERATURE
        }))
        .send()
        .await
        .map_err(|e| format!("optimization request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!(
            "optimization failed with status {}",
            response.status()
        ));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("failed to parse optimization response: {}", e))?;

    body["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| "optimization response contained no text".to_string())
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
    response_format: &'a str,
}

impl<'a> ImageRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            model: IMAGE_MODEL,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            style: IMAGE_STYLE,
            response_format: "url",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// Stage two: render the enhanced prompt and return the hosted image URL.
pub async fn generate_image(prompt: &str, api_key: &str) -> Result<String, GenerateError> {
    let client = reqwest::Client::new();
    let response = client
        .post(IMAGE_GENERATIONS_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&ImageRequest::new(prompt))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GenerateError::from_error_body(status.as_u16(), &body));
    }

    let image_response: ImageResponse = response.json().await?;
    let first = image_response
        .data
        .into_iter()
        .next()
        .ok_or(GenerateError::MissingImage)?;

    if let Some(revised) = &first.revised_prompt {
        info!("[generate] revised prompt: {}", revised);
    }

    first.url.ok_or(GenerateError::MissingImage)
}
