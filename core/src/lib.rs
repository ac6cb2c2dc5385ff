//! Todo list client core: wire codec plus optimistic state synchronizer.
//!
//! # Overview
//! `TodoClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `TodoSynchronizer`
//! drives it through a host-supplied `Transport`, owns the loaded page of
//! todos and the pagination cursor, and applies optimistic patches that are
//! reconciled by re-fetching the page after each successful mutation.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the codec is testable against fixed vectors.
//! - The view layer never mutates state; it calls operations and reads
//!   `SyncState` snapshots.
//! - DTOs are defined independently from the mock-server crate; end-to-end
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod state;
pub mod sync;
pub mod transport;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use state::{PaginationState, SyncState, PAGE_SIZE};
pub use sync::TodoSynchronizer;
pub use transport::Transport;
pub use types::{CreateTodo, Envelope, PaginationInfo, Todo, TodoPage, UpdateTodo};
