use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const MAX_SEARCH_CHARS: usize = 100;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    /// Empty when the todo has no description.
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub completed: Option<bool>,
    pub search: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `total_pages` never drops below 1, even for an empty listing.
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = (total.div_ceil(u64::from(limit)) as u32).max(1);
        Self {
            total,
            total_pages,
            current_page: page,
            per_page: limit,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoList {
    pub items: Vec<Todo>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> SuccessResponse<T> {
    fn new(data: Option<T>, message: Option<&str>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: message.map(str::to_string),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub tag: String,
}

impl FieldError {
    fn new(field: &str, message: &str, tag: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// Every failure the service reports, rendered as an `ErrorResponse`.
#[derive(Debug)]
pub enum ServiceError {
    InvalidJson,
    InvalidId,
    InvalidQuery,
    Validation(Vec<FieldError>),
    NotFound(u64),
    NoRoute,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error, message, code, details) = match self {
            ServiceError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                "Invalid request data format".to_string(),
                Some("INVALID_JSON"),
                None,
            ),
            ServiceError::InvalidId => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                "Invalid todo ID".to_string(),
                Some("INVALID_ID"),
                None,
            ),
            ServiceError::InvalidQuery => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                "Invalid query parameters".to_string(),
                None,
                None,
            ),
            ServiceError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation Error",
                "Request validation failed".to_string(),
                Some("VALIDATION_ERROR"),
                Some(fields),
            ),
            ServiceError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("Todo with ID {id} not found"),
                Some("TODO_NOT_FOUND"),
                None,
            ),
            ServiceError::NoRoute => (
                StatusCode::NOT_FOUND,
                "Not found",
                "The requested endpoint does not exist".to_string(),
                None,
                None,
            ),
        };
        let body = ErrorResponse {
            success: false,
            error: error.to_string(),
            message,
            code: code.map(str::to_string),
            details,
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    todos: BTreeMap<u64, Todo>,
}

impl Store {
    fn insert(&mut self, title: String, description: String) -> Todo {
        self.next_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: self.next_id,
            title,
            description,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        self.todos.insert(todo.id, todo.clone());
        todo
    }

    /// Newest first. Ids grow with creation time, so id order is enough.
    fn list(&self, query: &ListQuery, page: u32, limit: u32) -> TodoList {
        let needle = query
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());
        let matching: Vec<&Todo> = self
            .todos
            .values()
            .rev()
            .filter(|todo| query.completed.map_or(true, |c| todo.completed == c))
            .filter(|todo| {
                needle.as_deref().map_or(true, |n| {
                    todo.title.to_lowercase().contains(n) || todo.description.to_lowercase().contains(n)
                })
            })
            .collect();

        let offset = (page as usize - 1) * limit as usize;
        TodoList {
            items: matching.iter().skip(offset).take(limit as usize).map(|t| (*t).clone()).collect(),
            pagination: Pagination::new(matching.len() as u64, page, limit),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/todos/{id}/toggle", patch(toggle_todo))
        .fallback(no_route)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "time": Utc::now() }))
}

async fn no_route() -> ServiceError {
    ServiceError::NoRoute
}

async fn list_todos(
    State(db): State<Db>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse<TodoList>>, ServiceError> {
    let Query(query) = query.map_err(|_| ServiceError::InvalidQuery)?;
    let (page, limit) = validate_list_query(&query)?;
    let list = db.read().await.list(&query, page, limit);
    debug!(page, limit, returned = list.items.len(), "listed todos");
    Ok(SuccessResponse::new(Some(list), None))
}

async fn create_todo(
    State(db): State<Db>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<Todo>>), ServiceError> {
    let Json(input) = payload.map_err(|e| {
        warn!(error = %e, "failed to parse request body");
        ServiceError::InvalidJson
    })?;
    let title = validate_title(&input.title)?;
    let description = validate_description(input.description.as_deref())?;
    let todo = db.write().await.insert(title, description);
    info!(id = todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        SuccessResponse::new(Some(todo), Some("Todo created successfully")),
    ))
}

async fn get_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<SuccessResponse<Todo>>, ServiceError> {
    let id = parse_id(id)?;
    let todos = db.read().await;
    let todo = todos.todos.get(&id).cloned().ok_or(ServiceError::NotFound(id))?;
    Ok(SuccessResponse::new(Some(todo), None))
}

async fn update_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<SuccessResponse<Todo>>, ServiceError> {
    let id = parse_id(id)?;
    let Json(input) = payload.map_err(|_| ServiceError::InvalidJson)?;
    let title = input.title.as_deref().map(validate_title).transpose()?;
    let description = match input.description.as_deref() {
        Some(d) => Some(validate_description(Some(d))?),
        None => None,
    };

    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or(ServiceError::NotFound(id))?;
    if let Some(title) = title {
        todo.title = title;
    }
    if let Some(description) = description {
        todo.description = description;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    todo.updated_at = Utc::now();
    info!(id, "todo updated");
    Ok(SuccessResponse::new(Some(todo.clone()), Some("Todo updated successfully")))
}

async fn toggle_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<SuccessResponse<Todo>>, ServiceError> {
    let id = parse_id(id)?;
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or(ServiceError::NotFound(id))?;
    todo.completed = !todo.completed;
    todo.updated_at = Utc::now();
    info!(id, completed = todo.completed, "todo completion toggled");
    Ok(SuccessResponse::new(
        Some(todo.clone()),
        Some("Completion status toggled successfully"),
    ))
}

async fn delete_todo(
    State(db): State<Db>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ServiceError> {
    let id = parse_id(id)?;
    db.write()
        .await
        .todos
        .remove(&id)
        .map(|_| {
            info!(id, "todo deleted");
            StatusCode::NO_CONTENT
        })
        .ok_or(ServiceError::NotFound(id))
}

fn parse_id(id: Result<Path<u64>, PathRejection>) -> Result<u64, ServiceError> {
    match id {
        Ok(Path(id)) if id > 0 => Ok(id),
        _ => Err(ServiceError::InvalidId),
    }
}

/// Trimmed title, 1..=255 characters.
fn validate_title(title: &str) -> Result<String, ServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation(vec![FieldError::new(
            "title",
            "Title cannot be empty or contain only spaces",
            "notblank",
        )]));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ServiceError::Validation(vec![FieldError::new(
            "title",
            "Title must not exceed 255 characters",
            "max",
        )]));
    }
    Ok(title.to_string())
}

/// Trimmed description; blank clears it.
fn validate_description(description: Option<&str>) -> Result<String, ServiceError> {
    let description = description.unwrap_or_default().trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ServiceError::Validation(vec![FieldError::new(
            "description",
            "Description must not exceed 1000 characters",
            "max",
        )]));
    }
    Ok(description.to_string())
}

fn validate_list_query(query: &ListQuery) -> Result<(u32, u32), ServiceError> {
    let mut errors = Vec::new();
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if page < 1 {
        errors.push(FieldError::new("page", "Page number must be positive", "min"));
    }
    if limit == 0 || limit > MAX_LIMIT {
        errors.push(FieldError::new("limit", "Limit must be between 1 and 100", "range"));
    }
    if query.search.as_deref().is_some_and(|s| s.chars().count() > MAX_SEARCH_CHARS) {
        errors.push(FieldError::new(
            "search",
            "Search query is too long (max 100 characters)",
            "max",
        ));
    }
    if errors.is_empty() {
        Ok((page, limit))
    } else {
        Err(ServiceError::Validation(errors))
    }
}
