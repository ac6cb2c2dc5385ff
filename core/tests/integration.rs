//! Full synchronizer lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own runtime thread, then
//! drives every synchronizer operation over real HTTP. Requests are executed
//! host-side with ureq, the same way a non-Rust host would execute the
//! plain-data requests the core builds.

use async_trait::async_trait;
use todo_sync::{ApiError, HttpMethod, HttpRequest, HttpResponse, TodoClient, TodoSynchronizer, Transport, UpdateTodo};

struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Disables ureq's status-code-as-error behavior so 4xx/5xx responses
    /// come back as data and the core interprets them.
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = &self.agent;
        let body = req.body.unwrap_or_default();
        let result = match req.method {
            HttpMethod::Get => agent.get(&req.path).call(),
            HttpMethod::Delete => agent.delete(&req.path).call(),
            HttpMethod::Patch => agent.patch(&req.path).send_empty(),
            HttpMethod::Post => agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            HttpMethod::Put => agent
                .put(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn titles(sync: &TodoSynchronizer<UreqTransport>) -> Vec<String> {
    sync.snapshot().items.into_iter().map(|t| t.title).collect()
}

#[tokio::test]
async fn synchronizer_lifecycle() {
    let addr = start_server();
    let sync = TodoSynchronizer::new(TodoClient::new(&format!("http://{addr}")), UreqTransport::new());

    // Step 1: empty service.
    sync.list_page(1).await;
    let state = sync.snapshot();
    assert!(state.items.is_empty());
    assert!(state.last_error.is_none(), "{:?}", state.last_error);
    assert_eq!(state.pagination.current_page, 1);

    // Step 2: blank titles never reach the server.
    sync.create_todo("   ", Some("ignored")).await;
    assert_eq!(sync.snapshot().last_error.as_deref(), Some("title must not be empty"));

    // Step 3: seven creates; newest first, five per page.
    for n in 1..=7 {
        sync.create_todo(&format!("Todo {n}"), None).await;
    }
    let state = sync.snapshot();
    assert!(state.last_error.is_none());
    assert_eq!(titles(&sync), ["Todo 7", "Todo 6", "Todo 5", "Todo 4", "Todo 3"]);
    assert_eq!(state.pagination.total_pages, 2);
    assert_eq!(state.pagination.total, 7);

    // Step 4: page forward.
    sync.next_page().await;
    assert_eq!(sync.current_page(), 2);
    assert_eq!(titles(&sync), ["Todo 2", "Todo 1"]);

    // Step 5: toggle reconciles with the server.
    sync.toggle_completed(2).await;
    let state = sync.snapshot();
    assert!(state.items[0].completed);
    assert!(!state.items[1].completed);

    // Step 6: creating from page 2 jumps back to page 1.
    sync.create_todo("Todo 8", Some("  with notes  ")).await;
    assert_eq!(sync.current_page(), 1);
    let state = sync.snapshot();
    assert_eq!(state.items[0].title, "Todo 8");
    assert_eq!(state.items[0].description, "with notes");
    assert_eq!(state.items[0].id, 8);

    // Step 7: edit.
    sync.update_todo(
        8,
        UpdateTodo {
            title: Some("Todo 8, edited".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(sync.snapshot().items[0].title, "Todo 8, edited");

    // Step 8: editing a missing todo is recorded and returned.
    let err = sync
        .update_todo(
            999,
            UpdateTodo {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(sync.snapshot().last_error.as_deref(), Some("Todo with ID 999 not found"));

    // Step 9: a failed delete leaves the page as it was.
    let before = sync.snapshot().items;
    sync.delete_todo(999).await;
    assert_eq!(sync.snapshot().items, before);
    assert_eq!(sync.snapshot().last_error.as_deref(), Some("Todo with ID 999 not found"));

    // Step 10: emptying page 2 falls back to page 1.
    sync.next_page().await;
    assert_eq!(titles(&sync), ["Todo 3", "Todo 2", "Todo 1"]);
    sync.delete_todo(3).await;
    sync.delete_todo(2).await;
    assert_eq!(titles(&sync), ["Todo 1"]);
    sync.delete_todo(1).await;
    let state = sync.snapshot();
    assert_eq!(state.pagination.current_page, 1);
    assert_eq!(state.pagination.total_pages, 1);
    assert_eq!(state.items.len(), 5);
    assert!(state.last_error.is_none());

    // Step 11: re-listing an unchanged page is stable.
    sync.list_page(sync.current_page()).await;
    let first = sync.snapshot();
    sync.list_page(sync.current_page()).await;
    let second = sync.snapshot();
    assert_eq!(first.items, second.items);
    assert_eq!(first.pagination, second.pagination);
}
