use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;
use crate::request::{AvatarRequest, RequestMeta, DEFAULT_MIME_TYPE};
use crate::sanitize::preview;

pub const DEFAULT_UPSTREAM_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    /// `data:<mime>;base64,<data>`
    pub avatar: String,
    pub meta: RequestMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

/// Client for the image-generation API.
#[derive(Clone, Debug)]
pub struct Upstream {
    client: Client,
    base: Url,
}

impl Upstream {
    pub fn new(base: Url, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub async fn forward(
        &self,
        api_key: &str,
        request: &AvatarRequest,
    ) -> Result<AvatarResponse, ApiError> {
        let endpoint = request.endpoint(&self.base);
        let body = request.upstream_body();
        let mut meta = request.meta(&endpoint, &body);
        let transport = |err: reqwest::Error, meta: &RequestMeta| {
            warn!(endpoint = %meta.endpoint, error = %err, "upstream request failed");
            ApiError::Transport {
                message: err.to_string(),
                meta: Box::new(meta.clone()),
            }
        };

        let response = self
            .client
            .post(endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|err| transport(err, &meta))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.map_err(|err| transport(err, &meta))?;
            let details = serde_json::from_str(&text).unwrap_or(Value::String(text));
            warn!(status, endpoint = %meta.endpoint, %details, "upstream rejected request");
            return Err(ApiError::Upstream {
                status,
                details,
                meta: Box::new(meta),
            });
        }

        let payload: Value = response.json().await.map_err(|err| transport(err, &meta))?;
        let Some(avatar) = extract_avatar(&payload) else {
            warn!(endpoint = %meta.endpoint, "upstream response carried no image");
            return Err(ApiError::UnreadableResponse {
                details: json!({ "payload": preview(&payload) }),
                meta: Box::new(meta),
            });
        };

        meta.google_status = Some(status);
        info!(
            model = %meta.model,
            mode = meta.mode.as_str(),
            status,
            avatar_chars = avatar.len(),
            "avatar generated"
        );
        Ok(AvatarResponse {
            avatar,
            raw: request.include_raw.then_some(payload),
            meta,
        })
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null() && *value != &Value::Bool(false))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|text| !text.is_empty())
}

/// Pull the generated image out of either API family's response as a data URI.
pub fn extract_avatar(payload: &Value) -> Option<String> {
    let inline = present(payload.pointer("/images/0/inlineData"))
        .or_else(|| present(payload.pointer("/data/0/image/inlineData")))
        .or_else(|| {
            payload
                .pointer("/candidates/0/content/parts")?
                .as_array()?
                .iter()
                .find_map(|part| present(part.get("inlineData")))
        });

    if let Some(data) = inline.and_then(|inline| non_empty_str(inline.get("data"))) {
        let mime = inline
            .and_then(|inline| non_empty_str(inline.get("mimeType")))
            .unwrap_or(DEFAULT_MIME_TYPE);
        return Some(format!("data:{mime};base64,{data}"));
    }
    non_empty_str(payload.pointer("/images/0/base64Image"))
        .map(|data| format!("data:{DEFAULT_MIME_TYPE};base64,{data}"))
}
