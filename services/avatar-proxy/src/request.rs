//! Normalisation of client payloads into upstream requests.

use serde::Serialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::ApiError;
use crate::sanitize::{bytes_from_base64, is_base64, preview, sanitize_json, sanitize_object};

pub const DEFAULT_PROMPT: &str = "crea una imagen con fondo transparente de mi busto, añademe monoculo, sombrero de copa y un gran bigote blanco clasico.";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Edit,
    Generate,
}

impl Mode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::Edit => "edit",
            Mode::Generate => "generate",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFamily {
    Gemini,
    Imagen,
}

/// Request metadata echoed back to the client on success and failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    pub endpoint: String,
    pub mode: Mode,
    pub model: String,
    pub prompt_length: usize,
    pub include_raw: bool,
    pub input_bytes: usize,
    pub api_family: ApiFamily,
    pub request_preview: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_status: Option<u16>,
}

/// A validated `POST /api/edit-avatar` body.
#[derive(Clone, Debug)]
pub struct AvatarRequest {
    pub mode: Mode,
    pub prompt: String,
    pub model: String,
    pub mime_type: String,
    pub image: String,
    pub include_raw: bool,
    fields: Map<String, Value>,
}

fn trimmed_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?.as_str()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl AvatarRequest {
    pub fn from_payload(payload: Value) -> Result<Self, ApiError> {
        let Value::Object(fields) = payload else {
            return Err(ApiError::NotAnObject);
        };
        let mode = match fields.get("mode").and_then(Value::as_str) {
            Some(mode) if mode.eq_ignore_ascii_case("generate") => Mode::Generate,
            _ => Mode::Edit,
        };
        let image = fields
            .get("image")
            .and_then(Value::as_str)
            .map(|image| image.trim().to_string())
            .unwrap_or_default();
        if mode == Mode::Edit && !is_base64(&image) {
            return Err(ApiError::MissingImage);
        }
        Ok(Self {
            mode,
            prompt: trimmed_string(&fields, "prompt").unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            model: trimmed_string(&fields, "model").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            mime_type: trimmed_string(&fields, "mimeType")
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            include_raw: fields.get("includeRaw") == Some(&Value::Bool(true)),
            image,
            fields,
        })
    }

    pub fn family(&self) -> ApiFamily {
        if self.model.to_ascii_lowercase().starts_with("gemini") {
            ApiFamily::Gemini
        } else {
            ApiFamily::Imagen
        }
    }

    /// Upstream URL for this request, without credentials.
    pub fn endpoint(&self, base: &Url) -> Url {
        let segment = match self.family() {
            ApiFamily::Gemini => format!("{}:generateContent", self.model),
            ApiFamily::Imagen => format!("imagegeneration:{}", self.mode.as_str()),
        };
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&segment);
        }
        url
    }

    fn inline_image(&self) -> Option<Value> {
        (self.mode == Mode::Edit && !self.image.is_empty()).then(|| {
            json!({ "inlineData": { "mimeType": self.mime_type, "data": self.image } })
        })
    }

    /// JSON body sent upstream.
    pub fn upstream_body(&self) -> Value {
        let mut body = match self.family() {
            ApiFamily::Gemini => self.gemini_body(),
            ApiFamily::Imagen => self.imagen_body(),
        };
        if let Some(safety) = self.fields.get("safetySettings").and_then(sanitize_json) {
            body.insert("safetySettings".to_string(), safety);
        }
        if let Some(response) = self.fields.get("responseConfig").and_then(sanitize_json) {
            body.insert("responseConfig".to_string(), response);
        }
        if let Some(extra) = sanitize_object(self.fields.get("extra")) {
            body.extend(extra);
        }
        Value::Object(body)
    }

    fn gemini_body(&self) -> Map<String, Value> {
        let mut parts: Vec<Value> = self.inline_image().into_iter().collect();
        parts.push(json!({ "text": self.prompt }));

        let mut body = Map::new();
        body.insert(
            "contents".to_string(),
            json!([{ "role": "user", "parts": parts }]),
        );
        if let Some(config) = sanitize_object(self.fields.get("generationConfig")) {
            body.insert("generationConfig".to_string(), Value::Object(config));
        }
        body
    }

    fn imagen_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("model".to_string(), json!(self.model));
        body.insert("prompt".to_string(), json!({ "text": self.prompt }));
        match self.mode {
            Mode::Edit => {
                if let Some(image) = self.inline_image() {
                    body.insert("image".to_string(), image);
                }
                if let Some(mask) = trimmed_string(&self.fields, "mask") {
                    let mime = trimmed_string(&self.fields, "maskMimeType")
                        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
                    body.insert(
                        "mask".to_string(),
                        json!({ "inlineData": { "mimeType": mime, "data": mask } }),
                    );
                }
                if let Some(config) = sanitize_object(self.fields.get("editConfig")) {
                    body.insert("editConfig".to_string(), Value::Object(config));
                }
            }
            Mode::Generate => {
                if let Some(config) = sanitize_object(self.fields.get("imageConfig")) {
                    body.insert("image".to_string(), Value::Object(config));
                }
                if let Some(config) = sanitize_object(self.fields.get("generationConfig")) {
                    body.insert("generationConfig".to_string(), Value::Object(config));
                }
            }
        }
        body
    }

    pub fn meta(&self, endpoint: &Url, body: &Value) -> RequestMeta {
        RequestMeta {
            endpoint: endpoint.to_string(),
            mode: self.mode,
            model: self.model.clone(),
            prompt_length: self.prompt.encode_utf16().count(),
            include_raw: self.include_raw,
            input_bytes: bytes_from_base64(&self.image),
            api_family: self.family(),
            request_preview: preview(body),
            google_status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

    fn base() -> Url {
        Url::parse(BASE).unwrap()
    }

    #[test]
    fn test_defaults_and_mode_normalisation() {
        let request = AvatarRequest::from_payload(json!({ "image": " AAAA ", "mode": "EDIT" })).unwrap();
        assert_eq!(request.mode, Mode::Edit);
        assert_eq!(request.prompt, DEFAULT_PROMPT);
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(request.image, "AAAA");
        assert!(!request.include_raw);

        let request = AvatarRequest::from_payload(
            json!({ "mode": "Generate", "prompt": "  a cat  ", "includeRaw": "true" }),
        )
        .unwrap();
        assert_eq!(request.mode, Mode::Generate);
        assert_eq!(request.prompt, "a cat");
        assert!(!request.include_raw);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            AvatarRequest::from_payload(json!([1, 2])),
            Err(ApiError::NotAnObject)
        ));
        assert!(matches!(
            AvatarRequest::from_payload(json!({ "mode": "edit" })),
            Err(ApiError::MissingImage)
        ));
        assert!(matches!(
            AvatarRequest::from_payload(json!({ "image": "not base64!" })),
            Err(ApiError::MissingImage)
        ));
        assert!(AvatarRequest::from_payload(json!({ "mode": "generate" })).is_ok());
    }

    #[test]
    fn test_gemini_body() {
        let request = AvatarRequest::from_payload(json!({
            "image": "AAAA",
            "mimeType": "image/jpeg",
            "prompt": "sombrero",
            "generationConfig": { "temperature": 0.2 },
            "safetySettings": [{ "category": "x" }],
            "extra": { "cachedContent": "c1" },
        }))
        .unwrap();
        assert_eq!(request.family(), ApiFamily::Gemini);
        assert_eq!(
            request.endpoint(&base()).as_str(),
            format!("{BASE}/gemini-2.5-flash-image:generateContent")
        );

        let body = request.upstream_body();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "sombrero");
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert_eq!(body["safetySettings"][0]["category"], "x");
        assert_eq!(body["cachedContent"], "c1");
    }

    #[test]
    fn test_gemini_generate_has_only_text() {
        let request = AvatarRequest::from_payload(
            json!({ "mode": "generate", "image": "AAAA", "generationConfig": 5 }),
        )
        .unwrap();
        let body = request.upstream_body();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], DEFAULT_PROMPT);
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_imagen_edit_body() {
        let request = AvatarRequest::from_payload(json!({
            "model": "imagen-3",
            "image": "AAAA",
            "mask": "BBBB",
            "editConfig": { "editMode": "inpaint" },
        }))
        .unwrap();
        assert_eq!(request.family(), ApiFamily::Imagen);
        assert_eq!(
            request.endpoint(&base()).as_str(),
            format!("{BASE}/imagegeneration:edit")
        );
        let body = request.upstream_body();
        assert_eq!(body["model"], "imagen-3");
        assert_eq!(body["prompt"]["text"], DEFAULT_PROMPT);
        assert_eq!(body["image"]["inlineData"]["data"], "AAAA");
        assert_eq!(body["mask"]["inlineData"]["mimeType"], "image/png");
        assert_eq!(body["mask"]["inlineData"]["data"], "BBBB");
        assert_eq!(body["editConfig"]["editMode"], "inpaint");
    }

    #[test]
    fn test_imagen_generate_body() {
        let request = AvatarRequest::from_payload(json!({
            "model": "imagen-3",
            "mode": "generate",
            "imageConfig": { "aspectRatio": "1:1" },
            "responseConfig": "plain",
        }))
        .unwrap();
        assert!(request
            .endpoint(&base())
            .as_str()
            .ends_with("/imagegeneration:generate"));
        let body = request.upstream_body();
        assert_eq!(body["image"]["aspectRatio"], "1:1");
        assert_eq!(body["responseConfig"], "plain");
        assert!(body.get("mask").is_none());
    }

    #[test]
    fn test_meta() {
        let image = "A".repeat(80);
        let request = AvatarRequest::from_payload(json!({ "image": image, "prompt": "ñu" })).unwrap();
        let endpoint = request.endpoint(&base());
        let body = request.upstream_body();
        let meta = serde_json::to_value(request.meta(&endpoint, &body)).unwrap();
        assert_eq!(meta["mode"], "edit");
        assert_eq!(meta["apiFamily"], "gemini");
        assert_eq!(meta["promptLength"], 2);
        assert_eq!(meta["inputBytes"], 60);
        assert_eq!(meta["includeRaw"], false);
        assert_eq!(
            meta["requestPreview"]["contents"][0]["parts"][0]["inlineData"]["data"],
            "<base64:80 chars>"
        );
        assert!(meta.get("googleStatus").is_none());
    }
}
