//! The I/O seam between the synchronizer and the network.
//!
//! The core never opens sockets. Hosts hand the synchronizer something that
//! can turn an `HttpRequest` into an `HttpResponse`: reqwest in the CLI, ureq
//! in the end-to-end tests, scripted fakes in unit tests.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request.
    ///
    /// Non-2xx statuses are returned as data, never as `Err`; only failures
    /// that produce no response at all map to `ApiError::Transport`.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}
