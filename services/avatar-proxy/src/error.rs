use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use crate::request::RequestMeta;

/// Failures surfaced to the client as `{ error, details?, meta? }`.
///
/// Messages are shown verbatim by the game client.
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("Método no permitido")]
    MethodNotAllowed,
    #[error("Falta GOOGLE_AI_KEY en la configuración del servidor")]
    MissingApiKey,
    #[error("El cuerpo de la petición debe ser JSON válido")]
    InvalidJson,
    #[error("El cuerpo debe ser un objeto JSON")]
    NotAnObject,
    #[error("Debes enviar el campo 'image' en base64 para usar el modo edición.")]
    MissingImage,
    #[error("La llamada a Google falló ({status})")]
    Upstream {
        status: u16,
        details: Value,
        meta: Box<RequestMeta>,
    },
    #[error("No se pudo interpretar la respuesta de la IA")]
    UnreadableResponse {
        details: Value,
        meta: Box<RequestMeta>,
    },
    #[error("No se pudo procesar la imagen: {message}")]
    Transport {
        message: String,
        meta: Box<RequestMeta>,
    },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a RequestMeta>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson | ApiError::NotAnObject | ApiError::MissingImage => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MissingApiKey | ApiError::Transport { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upstream { status: 429, .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } | ApiError::UnreadableResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Upstream { details, .. } | ApiError::UnreadableResponse { details, .. } => {
                Some(details)
            }
            _ => None,
        }
    }

    fn meta(&self) -> Option<&RequestMeta> {
        match self {
            ApiError::Upstream { meta, .. }
            | ApiError::UnreadableResponse { meta, .. }
            | ApiError::Transport { meta, .. } => Some(meta.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
            meta: self.meta(),
        };
        (self.status(), Json(body)).into_response()
    }
}
