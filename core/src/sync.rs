//! Client-side state synchronization with optimistic updates.
//!
//! # Design
//! `TodoSynchronizer` owns the loaded page of todos and the pagination
//! cursor. Toggle and delete patch local state before the server answers;
//! every successful mutation is followed by a full re-fetch of the affected
//! page instead of an incremental merge, so the server stays authoritative.
//!
//! Rollback is deliberately asymmetric: a failed delete restores the exact
//! pre-call items, a failed toggle keeps its flip until the next successful
//! listing overwrites it.
//!
//! Operations take `&self` so several may be in flight on one task. They are
//! not sequenced against each other: whichever listing resolves last wins.
//! The state mutex is never held across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::state::{PaginationState, SyncState, PAGE_SIZE};
use crate::transport::Transport;
use crate::types::{CreateTodo, TodoPage, UpdateTodo};

const EMPTY_TITLE: &str = "title must not be empty";

pub struct TodoSynchronizer<T> {
    client: TodoClient,
    transport: T,
    state: Mutex<SyncState>,
}

impl<T: Transport> TodoSynchronizer<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self {
            client,
            transport,
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Read-only copy of the current state for rendering.
    pub fn snapshot(&self) -> SyncState {
        self.state().clone()
    }

    pub fn current_page(&self) -> u32 {
        self.state().pagination.current_page
    }

    pub fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `page` and replace the loaded items and cursor with the result.
    ///
    /// Page 0 is treated as page 1. Failures leave items and cursor alone and
    /// land in `last_error`. `loading` is reset on every exit, including when
    /// the returned future is dropped mid-flight.
    pub async fn list_page(&self, page: u32) {
        let page = page.max(1);
        {
            let mut state = self.state();
            state.loading = true;
            state.last_error = None;
        }
        let _loading = LoadingGuard { state: &self.state };

        match self.fetch_page(page).await {
            Ok(listing) => {
                let mut state = self.state();
                state.pagination = PaginationState::from_server(&listing.pagination);
                state.items = listing.items;
                info!(
                    requested = page,
                    current_page = state.pagination.current_page,
                    total_pages = state.pagination.total_pages,
                    items = state.items.len(),
                    "page reconciled"
                );
            }
            Err(err) => self.record_error("list", &err),
        }
    }

    /// Create a todo, then show page 1 where the service puts new items.
    pub async fn create_todo(&self, title: &str, description: Option<&str>) {
        self.clear_error();
        let title = title.trim();
        if title.is_empty() {
            self.record_error("create", &ApiError::Validation(EMPTY_TITLE.to_string()));
            return;
        }
        let input = CreateTodo {
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };

        match self.send_create(&input).await {
            Ok(()) => {
                let page = {
                    let mut state = self.state();
                    if state.pagination.current_page != 1 {
                        state.pagination.current_page = 1;
                    }
                    state.pagination.current_page
                };
                self.list_page(page).await;
            }
            Err(err) => self.record_error("create", &err),
        }
    }

    /// Flip `completed` locally, then ask the server to do the same.
    ///
    /// The flip is not undone on failure. An id that is not on the loaded page
    /// skips the local flip but is still sent.
    pub async fn toggle_completed(&self, id: u64) {
        self.clear_error();
        {
            let mut state = self.state();
            match state.items.iter_mut().find(|todo| todo.id == id) {
                Some(todo) => todo.completed = !todo.completed,
                None => debug!(id, "toggle target is not on the loaded page"),
            }
        }

        match self.send_toggle(id).await {
            Ok(()) => {
                let page = self.current_page();
                self.list_page(page).await;
            }
            Err(err) => self.record_error("toggle", &err),
        }
    }

    /// Remove the item locally, then delete it on the server.
    ///
    /// On failure the items go back to exactly what they were before the call.
    /// Deleting the last item of a page past the first moves back one page.
    pub async fn delete_todo(&self, id: u64) {
        self.clear_error();
        let original = {
            let mut state = self.state();
            let original = state.items.clone();
            state.items.retain(|todo| todo.id != id);
            original
        };

        match self.send_delete(id).await {
            Ok(()) => {
                let page = {
                    let mut state = self.state();
                    let current = state.pagination.current_page;
                    if original.len() == 1 && current > 1 {
                        state.pagination.current_page = current - 1;
                    }
                    state.pagination.current_page
                };
                self.list_page(page).await;
            }
            Err(err) => {
                self.state().items = original;
                self.record_error("delete", &err);
            }
        }
    }

    /// Apply `patch` on the server, then re-fetch the current page.
    ///
    /// Nothing changes locally until the server confirms. Unlike the other
    /// mutations, a failure is both recorded and returned so an open edit
    /// form can stay open.
    pub async fn update_todo(&self, id: u64, patch: UpdateTodo) -> Result<(), ApiError> {
        self.clear_error();
        let result = match normalize_patch(patch) {
            Ok(patch) => self.send_update(id, &patch).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                let page = self.current_page();
                self.list_page(page).await;
                Ok(())
            }
            Err(err) => {
                self.record_error("update", &err);
                Err(err)
            }
        }
    }

    /// Load the following page, if the cursor says there is one.
    pub async fn next_page(&self) {
        let target = {
            let state = self.state();
            state
                .pagination
                .has_next()
                .then(|| state.pagination.current_page + 1)
        };
        if let Some(page) = target {
            self.list_page(page).await;
        }
    }

    /// Load the preceding page, if there is one.
    pub async fn prev_page(&self) {
        let target = {
            let state = self.state();
            state
                .pagination
                .has_prev()
                .then(|| state.pagination.current_page - 1)
        };
        if let Some(page) = target {
            self.list_page(page).await;
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<TodoPage, ApiError> {
        let response = self.round_trip(self.client.build_list_todos(page, PAGE_SIZE)).await?;
        self.client.parse_list_todos(response)
    }

    async fn send_create(&self, input: &CreateTodo) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_create_todo(input)?).await?;
        self.client.parse_create_todo(response)
    }

    async fn send_toggle(&self, id: u64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_toggle_todo(id)).await?;
        self.client.parse_toggle_todo(response)
    }

    async fn send_update(&self, id: u64, patch: &UpdateTodo) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_update_todo(id, patch)?).await?;
        self.client.parse_update_todo(response)
    }

    async fn send_delete(&self, id: u64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    fn clear_error(&self) {
        self.state().last_error = None;
    }

    fn record_error(&self, operation: &'static str, err: &ApiError) {
        warn!(operation, error = %err, "operation failed");
        self.state().last_error = Some(err.user_message());
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct LoadingGuard<'a> {
    state: &'a Mutex<SyncState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).loading = false;
    }
}

/// Trim text fields the way the edit form does and reject a blank title.
fn normalize_patch(patch: UpdateTodo) -> Result<UpdateTodo, ApiError> {
    let title = match patch.title {
        Some(title) => {
            let title = title.trim();
            if title.is_empty() {
                return Err(ApiError::Validation(EMPTY_TITLE.to_string()));
            }
            Some(title.to_string())
        }
        None => None,
    };
    Ok(UpdateTodo {
        title,
        description: patch.description.map(|d| d.trim().to_string()),
        completed: patch.completed,
    })
}
