//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Executing the round-trip is the job of a `Transport`, which keeps this
//! module deterministic and free of I/O.

use serde::de::IgnoredAny;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Envelope, TodoPage, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self, page: u32, limit: u32) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos?page={page}&limit={limit}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_toggle_todo(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Patch,
            path: format!("{}/todos/{id}/toggle", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_update_todo(&self, id: u64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/todos/{id}", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoPage, ApiError> {
        check_status(&response)?;
        let envelope: Envelope<TodoPage> =
            serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Api {
                message: envelope.message.or(envelope.error).unwrap_or_default(),
            });
        }
        envelope
            .data
            .ok_or_else(|| ApiError::DeserializationError("listing response has no data".to_string()))
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_acknowledgement(&response)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_acknowledgement(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_acknowledgement(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_acknowledgement(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Mutations only need a 2xx status. A body is optional (204 has none), but
/// if it is an envelope saying `success: false` the call still failed.
fn parse_acknowledgement(response: &HttpResponse) -> Result<(), ApiError> {
    check_status(response)?;
    if response.body.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Envelope<IgnoredAny>>(&response.body) {
        Ok(envelope) if !envelope.success => Err(ApiError::Api {
            message: envelope.message.or(envelope.error).unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant,
/// lifting the envelope's `message` when the body carries one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<Envelope<IgnoredAny>>(&response.body)
        .ok()
        .and_then(|envelope| envelope.message.or(envelope.error))
        .unwrap_or_default();
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::HttpError {
        status: response.status,
        message,
    })
}
