//! State owned by the synchronizer and the snapshot handed to the view.

use crate::types::{PaginationInfo, Todo};

/// Number of todos requested per page.
pub const PAGE_SIZE: u32 = 5;

/// Pagination cursor for the currently loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based; stays 1 while nothing has been loaded or nothing exists.
    pub current_page: u32,
    /// 0 means no items exist (or nothing has been loaded yet).
    pub total_pages: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            page_size: PAGE_SIZE,
            total: 0,
        }
    }
}

impl PaginationState {
    /// Adopt the server's pagination block. The server's `current_page` wins
    /// over whatever was requested.
    pub fn from_server(info: &PaginationInfo) -> Self {
        let current_page = if info.total_pages == 0 {
            1
        } else {
            info.current_page.max(1)
        };
        Self {
            current_page,
            total_pages: info.total_pages,
            page_size: PAGE_SIZE,
            total: info.total,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// Everything the view layer may read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Server order for the current page.
    pub items: Vec<Todo>,
    pub pagination: PaginationState,
    /// True only while a listing fetch is in flight.
    pub loading: bool,
    pub last_error: Option<String>,
}

impl SyncState {
    pub fn item(&self, id: u64) -> Option<&Todo> {
        self.items.iter().find(|todo| todo.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(current_page: u32, total_pages: u32) -> PaginationInfo {
        PaginationInfo {
            total: u64::from(total_pages) * u64::from(PAGE_SIZE),
            total_pages,
            current_page,
            per_page: PAGE_SIZE,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }

    #[test]
    fn default_cursor_is_page_one_of_nothing() {
        let state = PaginationState::default();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_pages, 0);
        assert_eq!(state.page_size, PAGE_SIZE);
        assert!(!state.has_next());
        assert!(!state.has_prev());
    }

    #[test]
    fn server_page_is_authoritative() {
        let state = PaginationState::from_server(&info(2, 4));
        assert_eq!(state.current_page, 2);
        assert!(state.has_next());
        assert!(state.has_prev());
    }

    #[test]
    fn empty_listing_resets_to_page_one() {
        let state = PaginationState::from_server(&info(3, 0));
        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_pages, 0);
    }

    #[test]
    fn zero_page_from_server_is_clamped() {
        assert_eq!(PaginationState::from_server(&info(0, 2)).current_page, 1);
    }
}
